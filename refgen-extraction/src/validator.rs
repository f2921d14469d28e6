//! Schema validation of raw model text.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ExtractionError;

/// Result of validating one raw model reply.
///
/// Produced by [`SchemaValidator::validate`] and consumed immediately by
/// the calling state machine; never stored.
#[derive(Debug)]
pub enum ValidationOutcome<T> {
    /// The reply parsed and every schema constraint held.
    Valid(T),
    /// The reply failed to parse or violated the schema.
    Invalid {
        /// Human-readable error description, specific enough for the model
        /// to self-correct (names offending fields or parse positions).
        errors: String,
        /// The offending raw text.
        raw_text: String,
    },
}

/// Validates raw model text against a compiled JSON schema.
pub struct SchemaValidator {
    compiled: jsonschema::Validator,
}

impl SchemaValidator {
    /// Compiles a validator from a JSON Schema value.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::Schema`] if the schema does not compile.
    pub fn new(schema: &Value) -> Result<Self, ExtractionError> {
        let compiled = jsonschema::Validator::new(schema)
            .map_err(|e| ExtractionError::Schema(e.to_string()))?;
        Ok(Self { compiled })
    }

    /// Compiles a validator from the schema derived for `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::Schema`] if schema derivation or
    /// compilation fails.
    pub fn for_type<T: JsonSchema>() -> Result<Self, ExtractionError> {
        let schema = serde_json::to_value(schemars::schema_for!(T))
            .map_err(|e| ExtractionError::Schema(e.to_string()))?;
        Self::new(&schema)
    }

    /// Validates raw model text, producing a typed value on success.
    ///
    /// The pipeline is: reject empty replies, strip optional Markdown code
    /// fences, parse as JSON, evaluate every schema constraint, then
    /// deserialize into `T`. Any failure yields `Invalid` with a message
    /// naming the offending field or parse position — that message is fed
    /// back into the next prompt.
    pub fn validate<T: DeserializeOwned>(&self, raw: &str) -> ValidationOutcome<T> {
        let payload = strip_code_fences(raw);
        if payload.trim().is_empty() {
            return ValidationOutcome::Invalid {
                errors: "model reply was empty".to_string(),
                raw_text: raw.to_string(),
            };
        }

        let parsed: Value = match serde_json::from_str(payload) {
            Ok(value) => value,
            Err(e) => {
                return ValidationOutcome::Invalid {
                    errors: format!("JSON parse error: {e}"),
                    raw_text: raw.to_string(),
                };
            }
        };

        let violations: Vec<String> = self
            .compiled
            .iter_errors(&parsed)
            .map(|error| format!("at `{}`: {}", error.instance_path, error))
            .collect();
        if !violations.is_empty() {
            return ValidationOutcome::Invalid {
                errors: violations.join("\n"),
                raw_text: raw.to_string(),
            };
        }

        match serde_json::from_value::<T>(parsed) {
            Ok(value) => ValidationOutcome::Valid(value),
            Err(e) => ValidationOutcome::Invalid {
                errors: format!("deserialization failed: {e}"),
                raw_text: raw.to_string(),
            },
        }
    }
}

/// Strips a single enclosing Markdown code fence, if present.
///
/// Models frequently wrap JSON replies in ``` or ```json fences; the
/// payload inside is what gets parsed.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the optional language tag on the opening fence line.
    match body.find('\n') {
        Some(newline) => body[newline + 1..].trim(),
        None => body.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refgen_core::{Resource, ResourceList};

    fn resource_json(name: &str) -> String {
        format!(
            r#"{{
                "name": "{name}",
                "addresses": ["1 Elm St"],
                "phones": [],
                "emails": [],
                "website": null,
                "description": "desc",
                "justification": "just"
            }}"#
        )
    }

    #[test]
    fn valid_resource_list_passes() {
        let validator = SchemaValidator::for_type::<ResourceList>().unwrap();
        let raw = format!(r#"{{"resources": [{}]}}"#, resource_json("Food Bank"));

        match validator.validate::<ResourceList>(&raw) {
            ValidationOutcome::Valid(list) => {
                assert_eq!(list.resources.len(), 1);
                assert_eq!(list.resources[0].name, "Food Bank");
            }
            ValidationOutcome::Invalid { errors, .. } => panic!("unexpected: {errors}"),
        }
    }

    #[test]
    fn wrong_field_type_names_the_field() {
        let validator = SchemaValidator::for_type::<Resource>().unwrap();
        let raw = r#"{
            "name": "X",
            "addresses": "1 Elm St",
            "phones": [],
            "emails": [],
            "description": "d",
            "justification": "j"
        }"#;

        match validator.validate::<Resource>(raw) {
            ValidationOutcome::Invalid { errors, .. } => {
                assert!(errors.contains("addresses"), "got: {errors}");
            }
            ValidationOutcome::Valid(_) => panic!("expected invalid"),
        }
    }

    #[test]
    fn missing_required_field_names_the_field() {
        let validator = SchemaValidator::for_type::<Resource>().unwrap();
        let raw = r#"{
            "addresses": [],
            "phones": [],
            "emails": [],
            "description": "d",
            "justification": "j"
        }"#;

        match validator.validate::<Resource>(raw) {
            ValidationOutcome::Invalid { errors, .. } => {
                assert!(errors.contains("name"), "got: {errors}");
            }
            ValidationOutcome::Valid(_) => panic!("expected invalid"),
        }
    }

    #[test]
    fn empty_reply_is_invalid_not_a_panic() {
        let validator = SchemaValidator::for_type::<Resource>().unwrap();
        match validator.validate::<Resource>("   \n  ") {
            ValidationOutcome::Invalid { errors, .. } => {
                assert!(errors.contains("empty"));
            }
            ValidationOutcome::Valid(_) => panic!("expected invalid"),
        }
    }

    #[test]
    fn parse_error_reports_position() {
        let validator = SchemaValidator::for_type::<Resource>().unwrap();
        match validator.validate::<Resource>("{not json") {
            ValidationOutcome::Invalid { errors, raw_text } => {
                assert!(errors.contains("parse error"));
                assert_eq!(raw_text, "{not json");
            }
            ValidationOutcome::Valid(_) => panic!("expected invalid"),
        }
    }

    #[test]
    fn code_fenced_json_validates() {
        let validator = SchemaValidator::for_type::<Resource>().unwrap();
        let raw = format!("```json\n{}\n```", resource_json("Fenced"));

        match validator.validate::<Resource>(&raw) {
            ValidationOutcome::Valid(resource) => assert_eq!(resource.name, "Fenced"),
            ValidationOutcome::Invalid { errors, .. } => panic!("unexpected: {errors}"),
        }
    }
}
