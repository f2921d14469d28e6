//! Prompt templates and rendering.
//!
//! A [`PromptTemplate`] is an ordered list of role/text messages whose text
//! contains Mustache-style `{{variable}}` placeholders. Rendering replaces
//! every occurrence of each provided variable; placeholders with no
//! matching variable are left in place and reported by
//! [`RenderedPrompt::unresolved_placeholders`] so callers can log the
//! correctness signal instead of silently shipping a broken prompt.

use serde::{Deserialize, Serialize};

/// Role of a single prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    /// System instruction.
    System,
    /// User turn.
    User,
    /// Assistant turn (few-shot examples).
    Assistant,
}

/// One message of a prompt template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    /// The message role.
    pub role: PromptRole,
    /// Message text, possibly containing `{{variable}}` placeholders.
    pub text: String,
}

impl PromptMessage {
    /// Creates a system message.
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: PromptRole::System,
            text: text.into(),
        }
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: PromptRole::User,
            text: text.into(),
        }
    }
}

/// An ordered variable mapping for template rendering.
///
/// Insertion order is preserved; setting an existing name overwrites its
/// value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptVars {
    entries: Vec<(String, String)>,
}

impl PromptVars {
    /// Creates an empty variable map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a variable, overwriting any existing value for the name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    /// Fluent variant of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Looks up a variable by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// A prompt template: ordered messages with named placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptTemplate {
    messages: Vec<PromptMessage>,
}

impl PromptTemplate {
    /// Creates a template from its messages.
    #[must_use]
    pub fn new(messages: Vec<PromptMessage>) -> Self {
        Self { messages }
    }

    /// Returns the template messages.
    #[must_use]
    pub fn messages(&self) -> &[PromptMessage] {
        &self.messages
    }

    /// Appends a message, returning the extended template.
    ///
    /// Used by the streaming pipelines to attach mode-override instructions
    /// without mutating the catalog's copy.
    #[must_use]
    pub fn with_message(mut self, message: PromptMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Renders the template by substituting every provided variable.
    ///
    /// Substitution is pure string replacement of `{{name}}`; a variable
    /// with an empty value erases its placeholders, which is how the error
    /// context slots stay blank on the first attempt.
    #[must_use]
    pub fn render(&self, vars: &PromptVars) -> RenderedPrompt {
        let messages = self
            .messages
            .iter()
            .map(|msg| {
                let mut text = msg.text.clone();
                for (name, value) in vars.iter() {
                    text = text.replace(&format!("{{{{{name}}}}}"), value);
                }
                PromptMessage {
                    role: msg.role,
                    text,
                }
            })
            .collect();
        RenderedPrompt { messages }
    }
}

/// A fully rendered prompt ready for the generator.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPrompt {
    messages: Vec<PromptMessage>,
}

impl RenderedPrompt {
    /// Returns the rendered messages.
    #[must_use]
    pub fn messages(&self) -> &[PromptMessage] {
        &self.messages
    }

    /// Joins all message texts into a single prompt string for providers
    /// that take one flat input.
    #[must_use]
    pub fn flatten(&self) -> String {
        self.messages
            .iter()
            .map(|m| m.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Returns the names of placeholders still present after rendering.
    ///
    /// A non-empty result means the template referenced a variable the
    /// caller never supplied; callers log this rather than ignore it.
    #[must_use]
    pub fn unresolved_placeholders(&self) -> Vec<String> {
        let mut names = Vec::new();
        for msg in &self.messages {
            let mut rest = msg.text.as_str();
            while let Some(open) = rest.find("{{") {
                let tail = &rest[open + 2..];
                let Some(close) = tail.find("}}") else { break };
                let name = tail[..close].trim();
                if !name.is_empty() && !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
                rest = &tail[close + 2..];
            }
        }
        names
    }
}
