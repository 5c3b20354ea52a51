//! Classification error types.
//!
//! These are the operational failures of a classification request. They are
//! logged and swallowed by [`ImageClassifier::classify`](super::ImageClassifier::classify)
//! and only surface through [`ImageClassifier::predict`](super::ImageClassifier::predict).
//! Invariant violations (an image without pixels) are panics, not errors.

use thiserror::Error;

/// Failures reported by a vision backend while performing a request.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Model not loaded: {0}")]
    ModelNotLoaded(String),

    #[error("Input validation failed: {0}")]
    InputValidation(String),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Backend task aborted: {0}")]
    Aborted(String),
}

/// Operational outcome of a classification request that produced no predictions.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Vision image classification error: {0}")]
    Backend(#[from] BackendError),

    #[error("Vision request had no results")]
    NoResults,

    #[error("Vision request produced the wrong result type: {found}")]
    TypeMismatch { found: &'static str },
}

impl ClassifyError {
    /// Short outcome label used for metrics and span fields.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Backend(_) => "backend_error",
            Self::NoResults => "no_results",
            Self::TypeMismatch { .. } => "type_mismatch",
        }
    }

    /// Returns true if this error should be logged as a warning.
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::NoResults)
    }
}
