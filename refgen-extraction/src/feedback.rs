//! Retry feedback builders.
//!
//! When an attempt fails validation, the next prompt is re-rendered with
//! two extra variables: `error_message` (what went wrong and how to fix
//! it) and `invalid_replies` (the offending text, truncated). The model
//! sees exactly what it did wrong.

/// Error context injected into the next attempt's prompt variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryFeedback {
    /// Goes into the `error_message` template variable.
    pub error_message: String,
    /// Goes into the `invalid_replies` template variable.
    pub invalid_replies: String,
}

/// Builds the error context for the next attempt.
///
/// The message carries the attempt counter so the model knows how much
/// budget remains, the full error list, and an instruction to resubmit.
#[must_use]
pub fn build_retry_feedback(
    errors: &str,
    raw_reply: &str,
    attempt: usize,
    max_attempts: usize,
    max_echoed_chars: usize,
) -> RetryFeedback {
    let error_message = format!(
        "Attempt {attempt}/{max_attempts}: the previous reply failed validation.\n\n\
         Errors:\n{errors}\n\n\
         Fix every error and reply with valid JSON matching the requested schema. \
         Do not repeat the schema or add commentary."
    );
    RetryFeedback {
        error_message,
        invalid_replies: truncate_chars(raw_reply, max_echoed_chars),
    }
}

/// Truncates to at most `max_chars` characters, appending an ellipsis
/// marker when anything was cut. Counts chars, not bytes, so multi-byte
/// text never splits mid-character.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{truncated}...")
}
