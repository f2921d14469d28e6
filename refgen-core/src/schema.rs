//! Record types generated by the pipelines and their schema text.
//!
//! The structs here are the single source of truth for validation: the
//! extraction layer derives a JSON Schema from them via `schemars`, and the
//! `*_JSON` constants are the human-readable schema text interpolated into
//! prompts so the model knows what shape to produce.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Category of a referral resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReferralType {
    /// An external partner organization.
    External,
    /// A goodwill / charitable organization.
    Goodwill,
    /// A government agency or program.
    Government,
}

/// One referral resource recommended to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Resource {
    /// Organization or program name.
    pub name: String,
    /// Physical addresses (may be empty).
    pub addresses: Vec<String>,
    /// Contact phone numbers (may be empty).
    pub phones: Vec<String>,
    /// Contact email addresses (may be empty).
    pub emails: Vec<String>,
    /// Website URL, when one exists.
    #[serde(default)]
    pub website: Option<String>,
    /// What the resource offers.
    pub description: String,
    /// Why this resource fits the user's query.
    pub justification: String,
    /// Referral category, when known.
    #[serde(default)]
    pub referral_type: Option<ReferralType>,
}

/// The blocking-mode referrals reply: an enclosing list of resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResourceList {
    /// The recommended resources.
    pub resources: Vec<Resource>,
}

/// A generated action plan built from a set of referral resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ActionPlan {
    /// Short plan title.
    pub title: String,
    /// One-paragraph summary.
    pub summary: String,
    /// Full plan body (markdown).
    pub content: String,
}

/// Schema text for the blocking referrals reply, interpolated into prompts
/// as the `response_json` variable.
pub const RESOURCE_LIST_JSON: &str = r#"
{
    "resources": {
        "name": string;
        "addresses": string[];
        "phones": string[];
        "emails": string[];
        "website"?: string | null;
        "description": string;
        "justification": string;
        "referral_type"?: "external" | "goodwill" | "government" | null;
    }[];
}
"#;

/// Schema text for the action plan reply, interpolated into prompts as the
/// `action_plan_json` variable.
pub const ACTION_PLAN_JSON: &str = r#"
{
    "title": string,
    "summary": string,
    "content": string
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn referral_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(ReferralType::Government).unwrap(),
            json!("government")
        );
        let parsed: ReferralType = serde_json::from_value(json!("goodwill")).unwrap();
        assert_eq!(parsed, ReferralType::Goodwill);
    }

    #[test]
    fn resource_optional_fields_default() {
        let parsed: Resource = serde_json::from_value(json!({
            "name": "Community Aid",
            "addresses": [],
            "phones": ["555-1234"],
            "emails": [],
            "description": "Food bank",
            "justification": "Matches the food assistance request"
        }))
        .unwrap();

        assert!(parsed.website.is_none());
        assert!(parsed.referral_type.is_none());
    }

    #[test]
    fn resource_roundtrips_through_json() {
        let resource = Resource {
            name: "Shelter Network".to_string(),
            addresses: vec!["123 Main St".to_string()],
            phones: vec![],
            emails: vec!["help@shelter.org".to_string()],
            website: Some("https://shelter.org".to_string()),
            description: "Emergency housing".to_string(),
            justification: "User needs shelter".to_string(),
            referral_type: Some(ReferralType::External),
        };

        let text = serde_json::to_string(&resource).unwrap();
        let back: Resource = serde_json::from_str(&text).unwrap();
        assert_eq!(back, resource);
    }
}
