//! Error types for engine and job operations.

use thiserror::Error;
use vedit_models::ModelError;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// The single message shown to the user for any job-boundary failure.
pub const RESTART_MESSAGE: &str =
    "Processing is taking too long or an error occurred. Please restart the process.";

/// Errors that can occur while driving the engine.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("Engine failed to load: {0}")]
    EngineInit(String),

    #[error("Engine is not ready (state: {0})")]
    EngineNotReady(&'static str),

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("Engine invocation failed: {message}")]
    InvocationFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("Job exceeded its deadline of {limit_ms} ms")]
    DeadlineExceeded { limit_ms: u64 },

    #[error("Another job is already running")]
    Busy,

    #[error("Engine must be restarted before another job can run")]
    RestartRequired,

    #[error("File not found in engine storage: {0}")]
    StorageFileNotFound(String),

    #[error("Invalid engine storage name: {0}")]
    InvalidStorageName(String),

    #[error("Overlay image requested but no image bytes were supplied")]
    MissingOverlayImage,

    #[error("No input has been uploaded")]
    NoInput,

    #[error("Invalid trim range: {0}")]
    InvalidTrim(String),

    #[error("Invalid job transition: {0}")]
    InvalidTransition(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ModelError> for MediaError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::UnsupportedFormat(ext) => Self::UnsupportedFormat(ext),
            ModelError::InvalidTrim(msg) => Self::InvalidTrim(msg),
            other @ ModelError::InvalidTransition { .. } => {
                Self::InvalidTransition(other.to_string())
            }
        }
    }
}

impl MediaError {
    /// Create an engine load failure error.
    pub fn engine_init(message: impl Into<String>) -> Self {
        Self::EngineInit(message.into())
    }

    /// Create an invocation failure error.
    pub fn invocation_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::InvocationFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Whether this error leaves the session needing a full engine restart.
    ///
    /// Everything that happens after the deadline is armed (engine errors
    /// and deadline expiry) poisons the session. Precondition failures
    /// raised before any invocation do not.
    pub fn requires_restart(&self) -> bool {
        matches!(
            self,
            MediaError::InvocationFailed { .. }
                | MediaError::DeadlineExceeded { .. }
                | MediaError::StorageFileNotFound(_)
                | MediaError::Io(_)
        )
    }

    /// Text presented to the user.
    ///
    /// Job-boundary failures collapse to one restart prompt; usage
    /// errors keep their own description.
    pub fn user_message(&self) -> String {
        if self.requires_restart() || matches!(self, MediaError::RestartRequired) {
            RESTART_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }
}
