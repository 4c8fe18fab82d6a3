//! Metrics for engine jobs.
//!
//! Emitted through the `metrics` facade; a recorder is installed by the
//! host binary, if any.

use ::metrics::{counter, histogram};
use vedit_models::JobState;

/// Metric names as constants for consistency.
pub mod names {
    pub const JOBS_STARTED_TOTAL: &str = "vedit_jobs_started_total";
    pub const JOBS_FINISHED_TOTAL: &str = "vedit_jobs_finished_total";
    pub const ENGINE_INVOCATIONS_TOTAL: &str = "vedit_engine_invocations_total";
    pub const JOB_DURATION_SECONDS: &str = "vedit_job_duration_seconds";
}

/// Record a job entering `Running`.
pub fn record_job_started(kind: &str) {
    let labels = [("kind", kind.to_string())];
    counter!(names::JOBS_STARTED_TOTAL, &labels).increment(1);
}

/// Record a job reaching a terminal state.
pub fn record_job_finished(kind: &str, outcome: JobState, duration_secs: f64) {
    let labels = [
        ("kind", kind.to_string()),
        ("outcome", outcome.as_str().to_string()),
    ];
    counter!(names::JOBS_FINISHED_TOTAL, &labels).increment(1);
    histogram!(names::JOB_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record one engine invocation.
pub fn record_invocation(kind: &str, stage: usize) {
    let labels = [("kind", kind.to_string()), ("stage", stage.to_string())];
    counter!(names::ENGINE_INVOCATIONS_TOTAL, &labels).increment(1);
}
