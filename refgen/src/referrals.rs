//! Referral resource generation pipeline.

use std::sync::Arc;

use tokio_stream::wrappers::ReceiverStream;
use tracing::Instrument;

use refgen_core::schema::RESOURCE_LIST_JSON;
use refgen_core::{
    GenerationConfig, GenerationRequest, Generator, Resource, ResourceList, ResultSink,
};
use refgen_extraction::{
    RecordEvent, RetryConfig, RetryOrchestrator, SchemaValidator, StreamConfig, StreamExtractor,
};

use crate::errors::Error;
use crate::sink::TracingSink;
use crate::supports::SupportCatalog;
use crate::templates::{referrals_stream_override, PromptCatalog};

const TEMPLATE_NAME: &str = "generate_referrals";

/// Generates referral resources for a user's query.
///
/// Blocking mode returns a validated [`ResourceList`] after a bounded
/// retry loop; streaming mode emits each [`Resource`] the moment its
/// frame closes in the model's token stream.
pub struct ReferralsPipeline {
    generator: Arc<dyn Generator>,
    catalog: PromptCatalog,
    supports: SupportCatalog,
    sink: Arc<dyn ResultSink>,
    retry: RetryConfig,
    stream: StreamConfig,
}

impl ReferralsPipeline {
    /// Creates a pipeline with built-in templates, built-in supports, and
    /// a tracing sink.
    #[must_use]
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self {
            generator,
            catalog: PromptCatalog::builtin(),
            supports: SupportCatalog::builtin(),
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

    /// Replaces the supports catalog.
    #[must_use]
    pub fn with_supports(mut self, supports: SupportCatalog) -> Self {
        self.supports = supports;
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

    /// Blocking mode: generate and validate a full resource list.
    ///
    /// Validation failures are retried with error feedback up to the
    /// budget; the validated list is handed to the sink before returning.
    /// `version_id` selects the prompt template version (empty = latest).
    ///
    /// # Errors
    ///
    /// Template lookup failures, transport failures, and retry exhaustion
    /// all surface here; see [`Error::status_code`] for the API mapping.
    pub async fn run(
        &self,
        query: &str,
        user_email: &str,
        version_id: &str,
    ) -> Result<ResourceList, Error> {
        let span = tracing::info_span!("generate_referrals", user = %user_email);
        async {
            let template = self.catalog.get(TEMPLATE_NAME, version_id)?;
            let request = GenerationRequest::new(TEMPLATE_NAME)
                .var("query", query)
                .var("supports", self.supports.to_prompt_json())
                .var("response_json", RESOURCE_LIST_JSON)
                .var("error_message", "")
                .var("invalid_replies", "");

            let validator = SchemaValidator::for_type::<ResourceList>()?;
            let list: ResourceList = RetryOrchestrator::with_config(self.retry.clone())
                .run(
                    self.generator.as_ref(),
                    template,
                    &request,
                    &validator,
                    Some(self.sink.as_ref()),
                )
                .await?;

            let names: Vec<&str> = list.resources.iter().map(|r| r.name.as_str()).collect();
            tracing::info!(resources = ?names, "generated referrals");
            Ok(list)
        }
        .instrument(span)
        .await
    }

    /// Streaming mode: emit each resource as its frame closes.
    ///
    /// The returned stream yields one [`RecordEvent::Record`] per
    /// validated resource in frame-close order, a single
    /// [`RecordEvent::Notice`] if the stream completes with zero records,
    /// and a [`RecordEvent::Error`] on terminal provider failure — it
    /// never errors past its boundary.
    ///
    /// # Errors
    ///
    /// Only failures *opening* the stream (template lookup, transport)
    /// surface here.
    pub async fn stream(
        &self,
        query: &str,
        user_email: &str,
    ) -> Result<ReceiverStream<RecordEvent<Resource>>, Error> {
        tracing::info!(user = %user_email, query_len = query.len(), "starting referrals stream");

        let template = self
            .catalog
            .get(TEMPLATE_NAME, "")?
            .clone()
            .with_message(referrals_stream_override());
        let request = GenerationRequest::new(TEMPLATE_NAME)
            .var("query", query)
            .var("supports", self.supports.to_prompt_json())
            .var("response_json", RESOURCE_LIST_JSON)
            .var("error_message", "")
            .var("invalid_replies", "")
            .config(GenerationConfig::default().with_model("gpt-5.1"));

        let rendered = template.render(&request.vars);
        warn_on_unresolved(&rendered, TEMPLATE_NAME);
        let deltas = self.generator.stream(&rendered, &request.config).await?;

        // Streamed frames hold bare resources, not the enclosing list.
        let validator = SchemaValidator::for_type::<Resource>()?;
        let extractor = StreamExtractor::with_config(validator, self.stream.clone());
        Ok(extractor.extract::<Resource>(deltas))
    }
}

/// Warns about placeholders still present in an already-rendered prompt.
pub(crate) fn warn_on_unresolved(rendered: &refgen_core::RenderedPrompt, template: &str) {
    let unresolved = rendered.unresolved_placeholders();
    if !unresolved.is_empty() {
        tracing::warn!(?unresolved, template = %template, "prompt has unresolved placeholders");
    }
}
