//! Persistence sink for validated output.

use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by a [`ResultSink`].
///
/// Sink failures never invalidate an already-validated result; callers log
/// them and move on.
#[derive(Debug, Error)]
#[error("result sink failure: {0}")]
pub struct SinkError(pub String);

/// Receives validated output after a successful generation.
///
/// Invoked only with data that already passed schema validation. The sink
/// is the one collaborator shared across concurrent requests, so
/// implementations must be safe to call concurrently (append-only by
/// contract).
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Persists or logs one validated result.
    async fn save(&self, payload: &serde_json::Value) -> Result<(), SinkError>;
}
