//! Error types for benchmark orchestration

use thiserror::Error;

/// Errors raised while resolving, running or persisting benchmarks
#[derive(Debug, Error)]
pub enum ScandevalError {
    /// The model cannot be evaluated on the dataset's task (e.g. its
    /// architecture cannot produce the required output shape). The run loop
    /// skips the pair and carries on.
    #[error("{model_id} cannot be benchmarked: {reason}")]
    IncompatibleModel { model_id: String, reason: String },

    /// A catalog bucket was still missing after the catalog was rebuilt
    #[error("No model list found for '{0}' in the model catalog")]
    MissingCatalogKey(String),

    /// The external model catalog could not be queried
    #[error("Model catalog query failed: {0}")]
    Catalog(String),

    /// The fine-tuning command for a dataset failed
    #[error("Benchmark on {dataset} failed: {message}")]
    Runner { dataset: String, message: String },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ScandevalError {
    /// Shorthand for constructing an incompatible-model failure
    pub fn incompatible(model_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::IncompatibleModel {
            model_id: model_id.into(),
            reason: reason.into(),
        }
    }

    /// Whether this is the recoverable "model cannot be benchmarked" failure
    pub fn is_incompatible_model(&self) -> bool {
        matches!(self, Self::IncompatibleModel { .. })
    }
}

impl From<reqwest::Error> for ScandevalError {
    fn from(err: reqwest::Error) -> Self {
        ScandevalError::Catalog(err.to_string())
    }
}

pub type ScandevalResult<T> = Result<T, ScandevalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incompatible_message() {
        let err = ScandevalError::incompatible("spacy/da_core_news_sm", "no classifier head");
        assert!(err.is_incompatible_model());
        assert_eq!(
            err.to_string(),
            "spacy/da_core_news_sm cannot be benchmarked: no classifier head"
        );
    }

    #[test]
    fn test_other_errors_are_not_incompatible() {
        let err = ScandevalError::Runner {
            dataset: "dkhate".to_string(),
            message: "exit status 1".to_string(),
        };
        assert!(!err.is_incompatible_model());
        assert!(!ScandevalError::MissingCatalogKey("da".to_string()).is_incompatible_model());
    }

    #[test]
    fn test_io_error_message_is_kept() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: ScandevalError = io.into();
        assert_eq!(err.to_string(), "read-only");
    }
}
