//! Structured logging for engine jobs.

use std::time::Duration;
use tracing::{error, info, warn, Span};
use vedit_models::JobId;

/// Logs job lifecycle events with the job ID and kind attached.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
    kind: &'static str,
}

impl JobLogger {
    pub fn new(job_id: &JobId, kind: &'static str) -> Self {
        Self {
            job_id: job_id.to_string(),
            kind,
        }
    }

    pub fn log_start(&self, stages: usize, limit: Duration) {
        info!(
            job_id = %self.job_id,
            kind = self.kind,
            stages,
            limit_ms = millis(limit),
            "Job started"
        );
    }

    pub fn log_stage(&self, stage: usize, stages: usize) {
        info!(
            job_id = %self.job_id,
            kind = self.kind,
            "Running stage {}/{}", stage, stages
        );
    }

    pub fn log_timeout(&self, limit: Duration) {
        warn!(
            job_id = %self.job_id,
            kind = self.kind,
            limit_ms = millis(limit),
            "Job deadline exceeded; terminating engine"
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            job_id = %self.job_id,
            kind = self.kind,
            "Job failed: {}", message
        );
    }

    pub fn log_completion(&self, bytes: usize, elapsed: Duration) {
        info!(
            job_id = %self.job_id,
            kind = self.kind,
            bytes,
            elapsed_ms = millis(elapsed),
            "Job completed"
        );
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Span covering the whole job.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("job", job_id = %self.job_id, kind = self.kind)
    }
}

/// Whole milliseconds, saturating at `u64::MAX`.
pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_logger_fields() {
        let job_id = JobId::from_string("job-42");
        let logger = JobLogger::new(&job_id, "edit");

        assert_eq!(logger.job_id(), "job-42");
        assert_eq!(logger.kind(), "edit");
    }

    #[test]
    fn test_millis_saturates() {
        assert_eq!(millis(Duration::from_millis(1500)), 1500);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }
}
