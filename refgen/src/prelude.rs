//! Commonly used types and traits.
//!
//! ```no_run
//! use refgen::prelude::*;
//! ```

pub use refgen_core::{
    ActionPlan, DeltaEvent, DeltaStream, GenerationConfig, GenerationRequest, Generator,
    GeneratorError, PromptTemplate, PromptVars, ReferralType, Resource, ResourceList, ResultSink,
    SinkError,
};
pub use refgen_extraction::{
    ExtractionError, RecordEvent, RetryConfig, SchemaValidator, StreamConfig, ValidationOutcome,
};

pub use crate::action_plan::ActionPlanPipeline;
pub use crate::errors::Error;
pub use crate::referrals::ReferralsPipeline;
pub use crate::sink::TracingSink;
pub use crate::supports::SupportCatalog;
pub use crate::templates::PromptCatalog;
