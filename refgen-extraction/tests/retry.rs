//! Retry loop behavior against a scripted generator.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use refgen_core::{
    ActionPlan, DeltaStream, GenerationConfig, GenerationRequest, Generator, GeneratorError,
    PromptMessage, PromptTemplate, RenderedPrompt, ResultSink, SinkError,
};
use refgen_extraction::{ExtractionError, RetryConfig, RetryOrchestrator, SchemaValidator};

/// Generator that replays a fixed script of replies and records every
/// prompt it was given.
struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String, GeneratorError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    fn new(replies: Vec<Result<String, GeneratorError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(
        &self,
        prompt: &RenderedPrompt,
        _config: &GenerationConfig,
    ) -> Result<String, GeneratorError> {
        self.prompts.lock().unwrap().push(prompt.flatten());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GeneratorError::Provider("script exhausted".to_string())))
    }

    async fn stream(
        &self,
        _prompt: &RenderedPrompt,
        _config: &GenerationConfig,
    ) -> Result<DeltaStream, GeneratorError> {
        Err(GeneratorError::Provider("not scripted".to_string()))
    }
}

/// Sink that records what it was given, optionally failing.
#[derive(Default)]
struct RecordingSink {
    saved: Mutex<Vec<serde_json::Value>>,
    fail: bool,
}

#[async_trait]
impl ResultSink for RecordingSink {
    async fn save(&self, payload: &serde_json::Value) -> Result<(), SinkError> {
        self.saved.lock().unwrap().push(payload.clone());
        if self.fail {
            Err(SinkError("disk full".to_string()))
        } else {
            Ok(())
        }
    }
}

fn plan_template() -> PromptTemplate {
    PromptTemplate::new(vec![
        PromptMessage::system("Produce an action plan as JSON."),
        PromptMessage::user(
            "Query: {{user_query}}\n\nSchema:\n{{action_plan_json}}\n\n\
             {{error_message}}\n{{invalid_replies}}",
        ),
    ])
}

fn plan_request() -> GenerationRequest {
    GenerationRequest::new("generate_action_plan")
        .var("user_query", "help with housing")
        .var("action_plan_json", "{...}")
        .var("error_message", "")
        .var("invalid_replies", "")
}

fn valid_plan() -> String {
    json!({"title": "Plan", "summary": "Summary", "content": "Content"}).to_string()
}

#[tokio::test]
async fn valid_first_reply_uses_exactly_one_attempt() {
    let generator = ScriptedGenerator::new(vec![Ok(valid_plan())]);
    let validator = SchemaValidator::for_type::<ActionPlan>().unwrap();
    let sink = RecordingSink::default();

    let plan: ActionPlan = RetryOrchestrator::new()
        .run(
            &generator,
            &plan_template(),
            &plan_request(),
            &validator,
            Some(&sink),
        )
        .await
        .unwrap();

    assert_eq!(plan.title, "Plan");
    assert_eq!(generator.prompts().len(), 1);
    assert_eq!(sink.saved.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn recovers_after_invalid_attempts_and_feeds_back_errors() {
    let generator = ScriptedGenerator::new(vec![
        Ok("this is not json".to_string()),
        Ok(json!({"title": "Plan"}).to_string()),
        Ok(valid_plan()),
    ]);
    let validator = SchemaValidator::for_type::<ActionPlan>().unwrap();

    let plan: ActionPlan = RetryOrchestrator::new()
        .run(&generator, &plan_template(), &plan_request(), &validator, None)
        .await
        .unwrap();

    assert_eq!(plan.summary, "Summary");
    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 3);

    // The first prompt carries no error context.
    assert!(!prompts[0].contains("failed validation"));
    // The second prompt echoes the first attempt's failure.
    assert!(prompts[1].contains("Attempt 1/3"));
    assert!(prompts[1].contains("this is not json"));
    // The third prompt echoes the second attempt's schema violation.
    assert!(prompts[2].contains("Attempt 2/3"));
    assert!(prompts[2].contains("summary"));
}

#[tokio::test]
async fn exhausted_budget_returns_terminal_error() {
    let generator = ScriptedGenerator::new(vec![
        Ok("junk one".to_string()),
        Ok("junk two".to_string()),
        Ok("junk three".to_string()),
    ]);
    let validator = SchemaValidator::for_type::<ActionPlan>().unwrap();

    let result: Result<ActionPlan, _> = RetryOrchestrator::new()
        .run(&generator, &plan_template(), &plan_request(), &validator, None)
        .await;

    match result {
        Err(ExtractionError::RetryExhausted {
            attempts,
            last_errors,
            last_reply,
        }) => {
            assert_eq!(attempts, 3);
            assert!(last_errors.contains("parse error"));
            assert_eq!(last_reply, "junk three");
        }
        other => panic!("expected RetryExhausted, got {other:?}"),
    }
    // No attempts beyond the budget.
    assert_eq!(generator.prompts().len(), 3);
}

#[tokio::test]
async fn transport_failure_is_fatal_and_never_retried() {
    let generator = ScriptedGenerator::new(vec![Err(GeneratorError::Http {
        status: 503,
        message: "upstream unavailable".to_string(),
    })]);
    let validator = SchemaValidator::for_type::<ActionPlan>().unwrap();

    let result: Result<ActionPlan, _> = RetryOrchestrator::new()
        .run(&generator, &plan_template(), &plan_request(), &validator, None)
        .await;

    assert!(matches!(
        result,
        Err(ExtractionError::Generator(GeneratorError::Http { status: 503, .. }))
    ));
    assert_eq!(generator.prompts().len(), 1);
}

#[tokio::test]
async fn timeout_is_fatal_not_a_validation_failure() {
    let generator = ScriptedGenerator::new(vec![Err(GeneratorError::Timeout(
        Duration::from_secs(30),
    ))]);
    let validator = SchemaValidator::for_type::<ActionPlan>().unwrap();

    let result: Result<ActionPlan, _> = RetryOrchestrator::new()
        .run(&generator, &plan_template(), &plan_request(), &validator, None)
        .await;

    assert!(matches!(
        result,
        Err(ExtractionError::Generator(GeneratorError::Timeout(_)))
    ));
    assert_eq!(generator.prompts().len(), 1);
}

#[tokio::test]
async fn empty_reply_consumes_one_attempt() {
    let generator = ScriptedGenerator::new(vec![Ok("   \n".to_string()), Ok(valid_plan())]);
    let validator = SchemaValidator::for_type::<ActionPlan>().unwrap();

    let plan: ActionPlan = RetryOrchestrator::new()
        .run(&generator, &plan_template(), &plan_request(), &validator, None)
        .await
        .unwrap();

    assert_eq!(plan.title, "Plan");
    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].contains("empty"));
}

#[tokio::test]
async fn sink_failure_does_not_invalidate_the_result() {
    let generator = ScriptedGenerator::new(vec![Ok(valid_plan())]);
    let validator = SchemaValidator::for_type::<ActionPlan>().unwrap();
    let sink = RecordingSink {
        fail: true,
        ..RecordingSink::default()
    };

    let plan: ActionPlan = RetryOrchestrator::new()
        .run(
            &generator,
            &plan_template(),
            &plan_request(),
            &validator,
            Some(&sink),
        )
        .await
        .unwrap();

    assert_eq!(plan.content, "Content");
}

#[tokio::test]
async fn custom_budget_is_respected() {
    let generator = ScriptedGenerator::new(vec![Ok("junk".to_string()), Ok("junk".to_string())]);
    let validator = SchemaValidator::for_type::<ActionPlan>().unwrap();
    let orchestrator = RetryOrchestrator::with_config(RetryConfig::default().with_max_attempts(2));

    let result: Result<ActionPlan, _> = orchestrator
        .run(&generator, &plan_template(), &plan_request(), &validator, None)
        .await;

    assert!(matches!(
        result,
        Err(ExtractionError::RetryExhausted { attempts: 2, .. })
    ));
}
