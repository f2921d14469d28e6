#![deny(missing_docs)]
//! Core building blocks for the refgen record-generation workspace.
//!
//! This crate defines the data model (referral resources, action plans),
//! the [`Generator`](generator::Generator) abstraction over the external
//! model-calling service, prompt template assembly, and the
//! [`ResultSink`](sink::ResultSink) trait for persisting validated output.
//! The retry and stream-extraction state machines that consume these types
//! live in `refgen-extraction`.

/// The external text-generation collaborator and its delta-event stream.
pub mod generator;

/// Prompt templates, variable maps, and rendering.
pub mod prompt;

/// Immutable per-call generation requests.
pub mod request;

/// Record types and their JSON schema text.
pub mod schema;

/// Persistence sink for validated output.
pub mod sink;

pub use generator::{DeltaEvent, DeltaStream, GenerationConfig, Generator, GeneratorError};
pub use prompt::{PromptMessage, PromptRole, PromptTemplate, PromptVars, RenderedPrompt};
pub use request::GenerationRequest;
pub use schema::{ActionPlan, ReferralType, Resource, ResourceList};
pub use sink::{ResultSink, SinkError};
