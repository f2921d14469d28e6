//! Versioned prompt template catalog.
//!
//! Templates are looked up by name and version id; an empty version id
//! resolves to the latest registered version, an unknown one is the
//! caller's error. The built-in catalog carries the two production
//! templates; deployments can register revised versions alongside them.

use std::collections::HashMap;

use refgen_core::{PromptMessage, PromptTemplate};
use refgen_extraction::{RESOURCE_END, RESOURCE_START};

use crate::errors::Error;

struct TemplateVersion {
    id: String,
    template: PromptTemplate,
}

/// Named, versioned prompt templates.
pub struct PromptCatalog {
    entries: HashMap<String, Vec<TemplateVersion>>,
}

impl PromptCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Creates the catalog with the built-in production templates.
    #[must_use]
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.register("generate_referrals", "v1", referrals_template());
        catalog.register("generate_action_plan", "v1", action_plan_template());
        catalog
    }

    /// Registers a template version under a name. Later registrations for
    /// the same name become the latest version.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        version_id: impl Into<String>,
        template: PromptTemplate,
    ) {
        self.entries
            .entry(name.into())
            .or_default()
            .push(TemplateVersion {
                id: version_id.into(),
                template,
            });
    }

    /// Looks up a template by name and version id.
    ///
    /// An empty `version_id` resolves to the latest version.
    ///
    /// # Errors
    ///
    /// [`Error::TemplateNotFound`] for an unknown name,
    /// [`Error::TemplateVersion`] for an unknown version id.
    pub fn get(&self, name: &str, version_id: &str) -> Result<&PromptTemplate, Error> {
        let versions = self
            .entries
            .get(name)
            .ok_or_else(|| Error::TemplateNotFound {
                name: name.to_string(),
            })?;

        if version_id.is_empty() {
            return versions
                .last()
                .map(|v| &v.template)
                .ok_or_else(|| Error::TemplateNotFound {
                    name: name.to_string(),
                });
        }

        versions
            .iter()
            .find(|v| v.id == version_id)
            .map(|v| &v.template)
            .ok_or_else(|| Error::TemplateVersion {
                name: name.to_string(),
                version_id: version_id.to_string(),
            })
    }
}

impl Default for PromptCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn referrals_template() -> PromptTemplate {
    PromptTemplate::new(vec![
        PromptMessage::system(
            "You are a social-services referral assistant. Given a user's \
             situation, recommend concrete organizations that can help, \
             preferring the known support organizations provided. Every \
             recommendation needs real contact details and a justification \
             tied to the user's query.",
        ),
        PromptMessage::user(
            "User query:\n{{query}}\n\n\
             Known support organizations:\n{{supports}}\n\n\
             Reply with a single JSON object matching this schema exactly. \
             Do not repeat the schema or add commentary.\n{{response_json}}\n\n\
             {{error_message}}\n{{invalid_replies}}",
        ),
    ])
}

fn action_plan_template() -> PromptTemplate {
    PromptTemplate::new(vec![
        PromptMessage::system(
            "You write practical action plans that help a user engage the \
             referral resources they were given. Only include details that \
             are explicitly stated in the resource information; never invent \
             timelines, documents, or processes.",
        ),
        PromptMessage::user(
            "User query:\n{{user_query}}\n\n\
             Referral resources:\n{{resources}}\n\n\
             Reply with a single JSON object with `title`, `summary`, and \
             `content` keys, matching this schema exactly:\n{{action_plan_json}}\n\n\
             {{error_message}}\n{{invalid_replies}}",
        ),
    ])
}

/// Streaming override for the referrals pipeline: one delimited frame per
/// resource so each can be validated and forwarded the moment it closes.
#[must_use]
pub fn referrals_stream_override() -> PromptMessage {
    PromptMessage::user(format!(
        "STREAMING MODE OVERRIDE:\n\
         Output resources ONE AT A TIME as you generate them.\n\n\
         - Start each resource with exactly: {RESOURCE_START}\n\
         - Then output a single valid JSON object for that resource\n\
         - End each resource with exactly: {RESOURCE_END}\n\
         - Do NOT wrap the resources in an enclosing array\n\
         - Output each resource immediately as you complete it\n\n\
         Generate 5-10 resources total."
    ))
}

/// Streaming override for the action plan pipeline: pure markdown so the
/// formatted document renders progressively on the client.
#[must_use]
pub fn action_plan_stream_override() -> PromptMessage {
    PromptMessage::user(
        "STREAMING MODE OVERRIDE — this replaces all previous format \
         requirements:\n\
         Output pure markdown text only. No JSON, no curly braces, no \
         `title`/`summary`/`content` keys. Start directly with a `#` \
         heading, use `##` sections per resource, and write the plan as a \
         natural document."
            .to_string(),
    )
}
