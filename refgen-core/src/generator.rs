//! The external text-generation collaborator.
//!
//! The model provider is treated as a black box behind the [`Generator`]
//! trait: it either returns one complete reply (blocking mode) or a stream
//! of [`DeltaEvent`]s terminated by [`DeltaEvent::Done`] (streaming mode).
//! Transport failures surface as [`GeneratorError`] and are always fatal to
//! the caller; validation retries are never spent on them.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::prompt::RenderedPrompt;

/// Model configuration carried on every generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Model identifier (e.g. `"gpt-5-mini"`).
    pub model: String,
    /// Reasoning-effort hint passed through to the provider
    /// (e.g. `"low"`, `"none"`).
    pub reasoning_effort: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "gpt-5-mini".to_string(),
            reasoning_effort: "low".to_string(),
        }
    }
}

impl GenerationConfig {
    /// Set the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the reasoning-effort hint.
    #[must_use]
    pub fn with_reasoning_effort(mut self, effort: impl Into<String>) -> Self {
        self.reasoning_effort = effort.into();
        self
    }
}

/// One incremental event from a streaming generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeltaEvent {
    /// A fragment of generated text.
    Delta {
        /// The text fragment.
        text: String,
    },
    /// The stream completed normally.
    Done,
    /// The provider reported a terminal failure mid-stream.
    Error {
        /// Human-readable error message.
        message: String,
    },
}

/// An ordered, finite stream of delta events bound to one generation.
pub type DeltaStream = Pin<Box<dyn Stream<Item = DeltaEvent> + Send>>;

/// Transport-level failures from the generation provider.
///
/// Every variant is fatal: the retry loop reserves its budget for
/// validation failures, not transport failures.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// The provider returned an HTTP error status.
    #[error("provider returned HTTP {status}: {message}")]
    Http {
        /// Upstream HTTP status code.
        status: u16,
        /// Upstream error body or reason phrase.
        message: String,
    },

    /// The call exceeded the caller-imposed deadline.
    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    /// Any other provider-side failure.
    #[error("provider error: {0}")]
    Provider(String),
}

/// The external model-calling service.
///
/// Implementations perform their own transport concerns (endpoints, auth,
/// timeouts); callers only see complete replies or delta streams.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Produce one complete text reply for the prompt.
    async fn generate(
        &self,
        prompt: &RenderedPrompt,
        config: &GenerationConfig,
    ) -> Result<String, GeneratorError>;

    /// Open a streaming generation for the prompt.
    ///
    /// The returned stream yields zero or more [`DeltaEvent::Delta`]s and
    /// ends with [`DeltaEvent::Done`] or a single [`DeltaEvent::Error`].
    async fn stream(
        &self,
        prompt: &RenderedPrompt,
        config: &GenerationConfig,
    ) -> Result<DeltaStream, GeneratorError>;
}
