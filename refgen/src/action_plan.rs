//! Action plan generation pipeline.

use std::fmt::Write as _;
use std::sync::Arc;

use futures::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::Instrument;

use refgen_core::schema::ACTION_PLAN_JSON;
use refgen_core::{
    ActionPlan, DeltaEvent, GenerationConfig, GenerationRequest, Generator, Resource, ResultSink,
};
use refgen_extraction::{RetryConfig, RetryOrchestrator, SchemaValidator, StreamConfig};

use crate::errors::Error;
use crate::referrals::warn_on_unresolved;
use crate::sink::TracingSink;
use crate::templates::{action_plan_stream_override, PromptCatalog};

const TEMPLATE_NAME: &str = "generate_action_plan";

/// Generates an action plan from a set of referral resources.
///
/// Blocking mode returns a validated [`ActionPlan`]; streaming mode
/// forwards the model's markdown deltas verbatim so the document renders
/// progressively on the client.
pub struct ActionPlanPipeline {
    generator: Arc<dyn Generator>,
    catalog: PromptCatalog,
    sink: Arc<dyn ResultSink>,
    retry: RetryConfig,
    stream: StreamConfig,
}

impl ActionPlanPipeline {
    /// Creates a pipeline with built-in templates and a tracing sink.
    #[must_use]
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self {
            generator,
            catalog: PromptCatalog::builtin(),
            sink: Arc::new(TracingSink),
            retry: RetryConfig::default(),
            stream: StreamConfig::default(),
        }
    }

    /// Replaces the prompt catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: PromptCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Replaces the result sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn ResultSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Overrides the retry configuration.
    #[must_use]
    pub const fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Overrides the stream configuration.
    #[must_use]
    pub const fn with_stream_config(mut self, stream: StreamConfig) -> Self {
        self.stream = stream;
        self
    }

    /// Blocking mode: generate and validate one action plan.
    ///
    /// # Errors
    ///
    /// Template lookup failures, transport failures, and retry exhaustion
    /// surface here.
    pub async fn run(
        &self,
        resources: &[Resource],
        user_query: &str,
        user_email: &str,
    ) -> Result<ActionPlan, Error> {
        let span = tracing::info_span!(
            "generate_action_plan",
            user = %user_email,
            resource_count = resources.len()
        );
        async {
            let template = self.catalog.get(TEMPLATE_NAME, "")?;
            let request = GenerationRequest::new(TEMPLATE_NAME)
                .var("user_query", user_query)
                .var("resources", format_resources(resources))
                .var("action_plan_json", ACTION_PLAN_JSON)
                .var("error_message", "")
                .var("invalid_replies", "");

            let validator = SchemaValidator::for_type::<ActionPlan>()?;
            let plan: ActionPlan = RetryOrchestrator::with_config(self.retry.clone())
                .run(
                    self.generator.as_ref(),
                    template,
                    &request,
                    &validator,
                    Some(self.sink.as_ref()),
                )
                .await?;

            tracing::info!(title = %plan.title, "generated action plan");
            Ok(plan)
        }
        .instrument(span)
        .await
    }

    /// Streaming mode: forward markdown deltas verbatim.
    ///
    /// The JSON schema instructions are dropped from the prompt and a
    /// markdown override appended, so the reply is a plain document. A
    /// terminal provider failure becomes one final `Error: ...` chunk;
    /// the stream never panics past its boundary.
    ///
    /// # Errors
    ///
    /// Only failures opening the stream surface here.
    pub async fn stream(
        &self,
        resources: &[Resource],
        user_query: &str,
        user_email: &str,
    ) -> Result<ReceiverStream<String>, Error> {
        tracing::info!(
            user = %user_email,
            resource_count = resources.len(),
            "starting action plan stream"
        );

        let template = self
            .catalog
            .get(TEMPLATE_NAME, "")?
            .clone()
            .with_message(action_plan_stream_override());
        let request = GenerationRequest::new(TEMPLATE_NAME)
            .var("user_query", user_query)
            .var("resources", format_resources(resources))
            // The markdown override supersedes the JSON schema slot.
            .var("action_plan_json", "")
            .var("error_message", "")
            .var("invalid_replies", "")
            .config(
                GenerationConfig::default()
                    .with_model("gpt-5.1")
                    .with_reasoning_effort("none"),
            );

        let rendered = template.render(&request.vars);
        warn_on_unresolved(&rendered, TEMPLATE_NAME);
        let mut deltas = self.generator.stream(&rendered, &request.config).await?;

        let (tx, rx) = tokio::sync::mpsc::channel(self.stream.channel_capacity);
        tokio::spawn(async move {
            loop {
                // Notice a departed consumer even while the upstream is
                // quiet, so the delta stream is released promptly.
                let event = tokio::select! {
                    () = tx.closed() => {
                        tracing::debug!("consumer dropped; releasing action plan stream");
                        return;
                    }
                    event = deltas.next() => match event {
                        Some(event) => event,
                        None => break,
                    },
                };
                match event {
                    DeltaEvent::Delta { text } => {
                        if tx.send(text).await.is_err() {
                            return;
                        }
                    }
                    DeltaEvent::Done => break,
                    DeltaEvent::Error { message } => {
                        tracing::error!(%message, "action plan stream failed");
                        let _ = tx.send(format!("Error: {message}")).await;
                        return;
                    }
                }
            }
            tracing::debug!("action plan stream complete");
        });

        Ok(ReceiverStream::new(rx))
    }
}

/// Formats resources into the readable block interpolated into prompts.
///
/// Empty fields are omitted so the model never sees blank labels.
#[must_use]
pub fn format_resources(resources: &[Resource]) -> String {
    let mut formatted = Vec::with_capacity(resources.len());
    for resource in resources {
        let mut block = format!("Name: {}\n", resource.name);
        if !resource.description.is_empty() {
            let _ = writeln!(block, "- Description: {}", resource.description);
        }
        if !resource.justification.is_empty() {
            let _ = writeln!(block, "- Justification: {}", resource.justification);
        }
        if !resource.addresses.is_empty() {
            let _ = writeln!(block, "- Addresses: {}", resource.addresses.join(", "));
        }
        if !resource.phones.is_empty() {
            let _ = writeln!(block, "- Phones: {}", resource.phones.join(", "));
        }
        if !resource.emails.is_empty() {
            let _ = writeln!(block, "- Emails: {}", resource.emails.join(", "));
        }
        if let Some(website) = &resource.website {
            let _ = writeln!(block, "- Website: {website}");
        }
        formatted.push(block);
    }
    formatted.join("\n")
}
