//! Typed errors for extraction operations.

use refgen_core::GeneratorError;
use thiserror::Error;

/// Errors surfaced by the blocking-mode retry loop.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Transport failure from the generation provider. Fatal; the retry
    /// budget is never spent on these.
    #[error("generation failed: {0}")]
    Generator(#[from] GeneratorError),

    /// Every attempt up to the budget produced an invalid reply.
    #[error("validation failed after {attempts} attempts: {last_errors}")]
    RetryExhausted {
        /// Number of attempts made.
        attempts: usize,
        /// Error description from the final attempt.
        last_errors: String,
        /// The final invalid reply, for diagnostics.
        last_reply: String,
    },

    /// The target JSON schema could not be compiled.
    #[error("schema error: {0}")]
    Schema(String),
}
