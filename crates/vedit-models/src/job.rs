//! Job definitions for the bounded runner.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{ModelError, ModelResult};

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a job: `Pending -> Running -> {Completed, TimedOut, Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Job created, engine not yet invoked
    #[default]
    Pending,
    /// Deadline armed, engine working
    Running,
    /// Output read back before the deadline
    Completed,
    /// Deadline fired first; engine was torn down
    TimedOut,
    /// Engine reported an error before the deadline
    Failed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Running => "running",
            JobState::Completed => "completed",
            JobState::TimedOut => "timed_out",
            JobState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Completed | JobState::TimedOut | JobState::Failed
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single engine job.
///
/// Terminal states are final; a new submission creates a new `Job`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Job {
    /// Unique job ID
    pub id: JobId,

    /// Virtual file name of the input
    pub input_handle: String,

    /// Virtual file name of the final output
    pub output_handle: String,

    /// Wall-clock budget in milliseconds
    pub deadline_millis: u64,

    /// Current state
    pub state: JobState,

    /// When the job entered `Running`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// Absolute deadline, fixed when the job starts. Unset when the
    /// budget reaches past the last representable timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline_at: Option<DateTime<Utc>>,

    /// When the job reached a terminal state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,

    /// Failure detail (diagnostic only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl Job {
    /// Create a pending job.
    pub fn new(
        input_handle: impl Into<String>,
        output_handle: impl Into<String>,
        deadline_millis: u64,
    ) -> Self {
        Self {
            id: JobId::new(),
            input_handle: input_handle.into(),
            output_handle: output_handle.into(),
            deadline_millis,
            state: JobState::Pending,
            started_at: None,
            deadline_at: None,
            finished_at: None,
            error_message: None,
        }
    }

    /// Move to `Running` and fix the absolute deadline.
    pub fn start(&mut self) -> ModelResult<()> {
        self.transition(JobState::Pending, JobState::Running)?;
        let now = Utc::now();
        self.started_at = Some(now);
        self.deadline_at = i64::try_from(self.deadline_millis)
            .ok()
            .and_then(ChronoDuration::try_milliseconds)
            .and_then(|budget| now.checked_add_signed(budget));
        Ok(())
    }

    /// Mark job as completed.
    pub fn complete(&mut self) -> ModelResult<()> {
        self.transition(JobState::Running, JobState::Completed)?;
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    /// Mark job as timed out.
    pub fn time_out(&mut self) -> ModelResult<()> {
        self.transition(JobState::Running, JobState::TimedOut)?;
        self.finished_at = Some(Utc::now());
        self.error_message = Some(format!(
            "deadline of {} ms exceeded",
            self.deadline_millis
        ));
        Ok(())
    }

    /// Mark job as failed with an error message.
    pub fn fail(&mut self, error: impl Into<String>) -> ModelResult<()> {
        self.transition(JobState::Running, JobState::Failed)?;
        self.finished_at = Some(Utc::now());
        self.error_message = Some(error.into());
        Ok(())
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    fn transition(&mut self, expected: JobState, next: JobState) -> ModelResult<()> {
        if self.state != expected {
            return Err(ModelError::InvalidTransition {
                from: self.state.as_str(),
                to: next.as_str(),
            });
        }
        self.state = next;
        Ok(())
    }
}
