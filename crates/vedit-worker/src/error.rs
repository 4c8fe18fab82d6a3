//! Worker error types.

use thiserror::Error;
use vedit_media::MediaError;
use vedit_models::ModelError;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Text shown on the terminal.
    pub fn user_message(&self) -> String {
        match self {
            WorkerError::Media(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vedit_media::RESTART_MESSAGE;

    #[test]
    fn test_media_failures_collapse_to_restart_prompt() {
        let err: WorkerError = MediaError::DeadlineExceeded { limit_ms: 1000 }.into();
        assert_eq!(err.user_message(), RESTART_MESSAGE);
    }

    #[test]
    fn test_config_error_message() {
        let err = WorkerError::config("VEDIT_JOB_TIMEOUT_MS must be a number");
        assert_eq!(
            err.user_message(),
            "Configuration error: VEDIT_JOB_TIMEOUT_MS must be a number"
        );
    }

    #[test]
    fn test_model_error_conversion() {
        let err: WorkerError = ModelError::UnsupportedFormat("gif".into()).into();
        assert!(matches!(err, WorkerError::Model(_)));
        assert!(err.user_message().contains("gif"));
    }
}
