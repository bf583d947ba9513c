//! Error types for translation runs.
use crate::attribute::AttributeOwner;
use thiserror::Error;

/// Fatal errors that abort a translation run.
/// Recoverable conditions (registry capacity, malformed lane text, property
/// writes) are logged where they occur and never surface here.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// An attribute store or engine session call failed.
    #[error("store call failed: {0}")]
    Store(String),

    #[error("missing required attribute `{name}` on {owner}")]
    MissingAttribute { name: String, owner: AttributeOwner },

    #[error("attribute `{name}` has an unexpected layout: {reason}")]
    AttributeShape { name: String, reason: String },

    #[error("curve point counts sum to {counted} but the dataset has {expected} points")]
    CurveCountMismatch { counted: usize, expected: usize },

    #[error("registry I/O failed: {0}")]
    Persist(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type TranslateResult<T> = Result<T, TranslateError>;

impl TranslateError {
    pub(crate) fn shape(name: &str, reason: impl Into<String>) -> Self {
        TranslateError::AttributeShape {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
