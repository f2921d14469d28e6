//! Curated support-organization catalog.
//!
//! The referrals prompt is grounded with a list of known support
//! organizations so the model prefers vetted contacts over invented ones.
//! The catalog ships with a built-in default set and can be loaded from a
//! JSON file at deployment time.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// One known support organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportEntry {
    /// Organization name.
    pub name: String,
    /// Services the organization offers.
    pub services: Vec<String>,
    /// Contact phone, when known.
    #[serde(default)]
    pub phone: Option<String>,
    /// Website, when known.
    #[serde(default)]
    pub website: Option<String>,
}

/// The set of known support organizations injected into prompts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportCatalog {
    entries: Vec<SupportEntry>,
}

impl SupportCatalog {
    /// Creates a catalog from explicit entries.
    #[must_use]
    pub fn new(entries: Vec<SupportEntry>) -> Self {
        Self { entries }
    }

    /// The built-in default set.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(vec![
            SupportEntry {
                name: "Community Food Bank".to_string(),
                services: vec![
                    "emergency food boxes".to_string(),
                    "meal programs".to_string(),
                ],
                phone: Some("555-0101".to_string()),
                website: Some("https://communityfoodbank.example".to_string()),
            },
            SupportEntry {
                name: "Housing Assistance Center".to_string(),
                services: vec![
                    "emergency shelter".to_string(),
                    "rental assistance".to_string(),
                ],
                phone: Some("555-0102".to_string()),
                website: None,
            },
            SupportEntry {
                name: "Workforce Development Office".to_string(),
                services: vec!["job training".to_string(), "resume help".to_string()],
                phone: None,
                website: Some("https://workforce.example".to_string()),
            },
        ])
    }

    /// Loads a catalog from a JSON file holding an array of entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SupportsIo`] if the file cannot be read or
    /// [`Error::SupportsFormat`] if it is not a valid entry array.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        let entries: Vec<SupportEntry> = serde_json::from_str(&content)?;
        Ok(Self::new(entries))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the catalog as pretty JSON for the `supports` prompt
    /// variable.
    #[must_use]
    pub fn to_prompt_json(&self) -> String {
        serde_json::to_string_pretty(&self.entries).unwrap_or_else(|_| "[]".to_string())
    }
}

impl Default for SupportCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_catalog_renders_to_prompt_json() {
        let catalog = SupportCatalog::builtin();
        assert!(!catalog.is_empty());
        let json = catalog.to_prompt_json();
        assert!(json.contains("Community Food Bank"));
        let parsed: Vec<SupportEntry> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), catalog.len());
    }

    #[test]
    fn loads_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name": "Legal Aid", "services": ["legal advice"]}}]"#
        )
        .unwrap();

        let catalog = SupportCatalog::from_json_file(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.to_prompt_json().contains("Legal Aid"));
    }

    #[test]
    fn malformed_file_is_a_format_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = SupportCatalog::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::SupportsFormat(_)));
        assert_eq!(err.status_code(), 500);
    }
}
