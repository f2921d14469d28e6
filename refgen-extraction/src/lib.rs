#![deny(missing_docs)]
//! The two failure-handling state machines of the refgen workspace.
//!
//! - [`RetryOrchestrator`] — the blocking-mode loop: prompt, generate,
//!   validate, and re-prompt with error context until the reply is
//!   schema-valid or the retry budget is spent.
//! - [`StreamExtractor`] — the streaming-mode machine: scan delimited
//!   record frames out of an accumulating delta buffer, validate each
//!   candidate the moment its frame closes, and keep the stream alive
//!   past malformed frames.
//!
//! Shared primitives: [`SchemaValidator`] / [`ValidationOutcome`] and the
//! retry feedback builders.

/// Retry and streaming configuration.
pub mod config;

/// Typed errors for extraction operations.
pub mod error;

/// Retry feedback builders for the next prompt's error context.
pub mod feedback;

/// The blocking-mode bounded retry loop.
pub mod retry;

/// The streaming-mode frame scanner and extractor.
pub mod stream;

/// Schema validation of raw model text.
pub mod validator;

pub use config::{RetryConfig, StreamConfig};
pub use error::ExtractionError;
pub use feedback::{build_retry_feedback, RetryFeedback};
pub use retry::RetryOrchestrator;
pub use stream::{
    render_frame, FrameScanner, RecordEvent, StreamExtractor, RESOURCE_END, RESOURCE_START,
};
pub use validator::{SchemaValidator, ValidationOutcome};
