//! The blocking-mode bounded retry loop.
//!
//! Each attempt walks three phases: draft the prompt (with error context
//! from the prior attempt, if any), generate a reply, validate it against
//! the target schema. Transport failures abort immediately; validation
//! failures consume one attempt and feed their error description back into
//! the next prompt. The loop never runs past the configured budget.

use refgen_core::{GenerationRequest, Generator, PromptTemplate, PromptVars, ResultSink};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::RetryConfig;
use crate::error::ExtractionError;
use crate::feedback::build_retry_feedback;
use crate::validator::{SchemaValidator, ValidationOutcome};

/// Mutable per-request accumulator carried across attempts.
#[derive(Debug)]
struct PromptState {
    vars: PromptVars,
    attempt: usize,
}

/// Drives prompt → generate → validate in a bounded loop.
#[derive(Debug, Clone, Default)]
pub struct RetryOrchestrator {
    config: RetryConfig,
}

impl RetryOrchestrator {
    /// Creates an orchestrator with the default retry budget.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an orchestrator with the given configuration.
    #[must_use]
    pub const fn with_config(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Runs the retry loop until a reply validates or the budget is spent.
    ///
    /// On success the validated value is handed to `sink` (fire-and-forget:
    /// a sink failure is logged and never invalidates the result) and
    /// returned. One attempt is strictly sequential with the next; attempt
    /// N+1 never starts before attempt N's validation completes.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::Generator`] immediately on any transport
    /// failure (retries are reserved for validation failures), or
    /// [`ExtractionError::RetryExhausted`] when every attempt up to the
    /// budget produced an invalid reply.
    pub async fn run<T>(
        &self,
        generator: &dyn Generator,
        template: &PromptTemplate,
        request: &GenerationRequest,
        validator: &SchemaValidator,
        sink: Option<&dyn ResultSink>,
    ) -> Result<T, ExtractionError>
    where
        T: DeserializeOwned + Serialize,
    {
        let mut state = PromptState {
            vars: request.vars.clone(),
            attempt: 0,
        };
        let mut last_errors = String::new();
        let mut last_reply = String::new();

        while state.attempt < self.config.max_attempts {
            state.attempt += 1;
            let attempt = state.attempt;

            tracing::debug!(attempt, phase = "drafting", template = %request.template);
            let rendered = template.render(&state.vars);
            if attempt == 1 {
                let unresolved = rendered.unresolved_placeholders();
                if !unresolved.is_empty() {
                    tracing::warn!(?unresolved, template = %request.template, "prompt has unresolved placeholders");
                }
            }

            tracing::debug!(attempt, phase = "generating", model = %request.config.model);
            let reply = generator.generate(&rendered, &request.config).await?;

            tracing::debug!(attempt, phase = "validating", reply_len = reply.len());
            match validator.validate::<T>(&reply) {
                ValidationOutcome::Valid(value) => {
                    tracing::info!(attempt, "reply validated");
                    if let Some(sink) = sink {
                        save_to_sink(sink, &value).await;
                    }
                    return Ok(value);
                }
                ValidationOutcome::Invalid { errors, raw_text } => {
                    tracing::info!(attempt, %errors, "reply failed validation");
                    if attempt < self.config.max_attempts {
                        let feedback = build_retry_feedback(
                            &errors,
                            &raw_text,
                            attempt,
                            self.config.max_attempts,
                            self.config.max_echoed_reply_chars,
                        );
                        state.vars.set("error_message", feedback.error_message);
                        state.vars.set("invalid_replies", feedback.invalid_replies);
                    }
                    last_errors = errors;
                    last_reply = raw_text;
                }
            }
        }

        Err(ExtractionError::RetryExhausted {
            attempts: self.config.max_attempts,
            last_errors,
            last_reply,
        })
    }
}

async fn save_to_sink<T: Serialize>(sink: &dyn ResultSink, value: &T) {
    match serde_json::to_value(value) {
        Ok(payload) => {
            if let Err(e) = sink.save(&payload).await {
                tracing::warn!(error = %e, "result sink failed; keeping validated result");
            }
        }
        Err(e) => tracing::warn!(error = %e, "could not serialize validated result for sink"),
    }
}
