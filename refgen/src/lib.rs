#![deny(missing_docs)]
//! # refgen
//!
//! Generation pipelines that turn a generative text model into a source of
//! schema-valid structured records, in two modes:
//!
//! - **Blocking**: [`ReferralsPipeline::run`] / [`ActionPlanPipeline::run`]
//!   drive a bounded validate-and-retry loop and return a validated value
//!   or a terminal error.
//! - **Streaming**: [`ReferralsPipeline::stream`] extracts delimited
//!   record frames out of the model's token stream and emits each record
//!   as soon as its frame closes; [`ActionPlanPipeline::stream`] forwards
//!   markdown deltas verbatim.
//!
//! ## Example
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use refgen::prelude::*;
//! # async fn example(generator: Arc<dyn Generator>) -> Result<(), refgen::Error> {
//! let pipeline = ReferralsPipeline::new(generator);
//! let referrals = pipeline.run("food assistance near Springfield", "user@example.org", "").await?;
//! for resource in &referrals.resources {
//!     println!("{}", resource.name);
//! }
//! # Ok(())
//! # }
//! ```

/// Action plan generation pipeline.
pub mod action_plan;

/// Public error type with HTTP status mapping.
pub mod errors;

/// Commonly used types and traits.
pub mod prelude;

/// Referral resource generation pipeline.
pub mod referrals;

/// Tracing subscriber setup.
pub mod setup;

/// Default result sink.
pub mod sink;

/// Curated support-organization catalog for prompt context.
pub mod supports;

/// Versioned prompt template catalog.
pub mod templates;

pub use action_plan::ActionPlanPipeline;
pub use errors::Error;
pub use referrals::ReferralsPipeline;
pub use sink::TracingSink;
pub use supports::SupportCatalog;
pub use templates::PromptCatalog;
