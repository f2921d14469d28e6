//! Public error types for refgen.

use refgen_core::GeneratorError;
use refgen_extraction::ExtractionError;
use thiserror::Error;

/// Errors surfaced at the request boundary by the pipelines.
#[derive(Debug, Error)]
pub enum Error {
    /// The named prompt template does not exist.
    #[error("prompt template '{name}' not found")]
    TemplateNotFound {
        /// The requested template name.
        name: String,
    },

    /// The requested template version could not be retrieved.
    #[error("prompt template '{name}' has no version '{version_id}'")]
    TemplateVersion {
        /// The template name.
        name: String,
        /// The requested version id.
        version_id: String,
    },

    /// Retry exhaustion or schema compilation failure from the extraction
    /// layer.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// Transport failure opening a streaming generation.
    #[error(transparent)]
    Generator(#[from] GeneratorError),

    /// The supports catalog file could not be read.
    #[error("could not read supports catalog: {0}")]
    SupportsIo(#[from] std::io::Error),

    /// The supports catalog file was not valid JSON.
    #[error("could not parse supports catalog: {0}")]
    SupportsFormat(#[from] serde_json::Error),
}

impl Error {
    /// HTTP status an API layer should answer with for this error.
    ///
    /// Template version lookups mirror the original service's contract:
    /// an unknown version is the caller's mistake (422), everything else
    /// is a server-side failure (500).
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::TemplateNotFound { .. } | Self::TemplateVersion { .. } => 422,
            Self::Extraction(_)
            | Self::Generator(_)
            | Self::SupportsIo(_)
            | Self::SupportsFormat(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_version_maps_to_422() {
        let err = Error::TemplateVersion {
            name: "generate_referrals".to_string(),
            version_id: "v99".to_string(),
        };
        assert_eq!(err.status_code(), 422);
        assert!(err.to_string().contains("v99"));
    }

    #[test]
    fn extraction_errors_map_to_500() {
        let err = Error::Extraction(ExtractionError::RetryExhausted {
            attempts: 3,
            last_errors: "bad".to_string(),
            last_reply: String::new(),
        });
        assert_eq!(err.status_code(), 500);
    }
}
