//! Immutable per-call generation requests.

use crate::generator::GenerationConfig;
use crate::prompt::PromptVars;

/// Everything a pipeline needs to drive one generation: which template to
/// use, the variables to render it with, and the model configuration.
///
/// Created once per incoming call and never mutated; the retry loop keeps
/// its own mutable copy of the variables for error-context injection.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Name of the prompt template.
    pub template: String,
    /// Template variables in insertion order.
    pub vars: PromptVars,
    /// Model configuration.
    pub config: GenerationConfig,
}

impl GenerationRequest {
    /// Creates a request for the named template with default configuration.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            vars: PromptVars::new(),
            config: GenerationConfig::default(),
        }
    }

    /// Sets a template variable.
    #[must_use]
    pub fn var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.set(name, value);
        self
    }

    /// Sets the model configuration.
    #[must_use]
    pub fn config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_compose_and_every_field_feeds_the_call() {
        let request = GenerationRequest::new("greeting")
            .var("who", "world")
            .config(GenerationConfig::default().with_model("gpt-5.1"));

        assert_eq!(request.template, "greeting");
        assert_eq!(request.vars.get("who"), Some("world"));
        assert_eq!(request.config.model, "gpt-5.1");
    }
}
