//! Error types for model validation.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while validating or transitioning models.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid trim range: {0}")]
    InvalidTrim(String),

    #[error("Invalid job transition from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },
}

impl ModelError {
    /// Create an invalid trim error.
    pub fn invalid_trim(message: impl Into<String>) -> Self {
        Self::InvalidTrim(message.into())
    }
}
