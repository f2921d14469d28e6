//! Default result sink.

use async_trait::async_trait;
use refgen_core::{ResultSink, SinkError};

/// Sink that logs validated output through `tracing`.
///
/// Stands in for the production persistence sink; safe to share across
/// concurrent requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

#[async_trait]
impl ResultSink for TracingSink {
    async fn save(&self, payload: &serde_json::Value) -> Result<(), SinkError> {
        tracing::info!(target: "refgen::results", payload = %payload, "validated result");
        Ok(())
    }
}
