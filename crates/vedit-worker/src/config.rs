//! Editor configuration.

use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use vedit_media::{
    EditorSession, EngineConfig, EngineHandle, FontSources, JobProgress, ProcessEngine,
    DEFAULT_TIME_LIMIT,
};

use crate::error::{WorkerError, WorkerResult};

/// Longest job budget accepted from the environment.
pub const MAX_JOB_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Editor configuration.
#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Wall-clock budget per job
    pub job_timeout: Duration,
    /// Parent directory for engine storage and preview files
    pub work_dir: PathBuf,
    /// Explicit ffmpeg binary; resolved from `PATH` when unset
    pub ffmpeg_path: Option<PathBuf>,
    /// Directory holding the bundled font files
    pub font_dir: PathBuf,
    /// Capacity of the progress channel
    pub progress_buffer: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            job_timeout: DEFAULT_TIME_LIMIT,
            work_dir: std::env::temp_dir().join("vedit"),
            ffmpeg_path: None,
            font_dir: PathBuf::from("./fonts"),
            progress_buffer: 64,
        }
    }
}

impl EditorConfig {
    /// Create config from environment variables.
    pub fn from_env() -> WorkerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from any key lookup. Unset or empty keys take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> WorkerResult<Self> {
        let defaults = Self::default();
        let value = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        let job_timeout = match value("VEDIT_JOB_TIMEOUT_MS") {
            Some(raw) => parse_job_timeout(&raw)?,
            None => defaults.job_timeout,
        };
        let progress_buffer = match value("VEDIT_PROGRESS_BUFFER") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(WorkerError::config(format!(
                        "VEDIT_PROGRESS_BUFFER must be a positive integer, got {:?}",
                        raw
                    )))
                }
            },
            None => defaults.progress_buffer,
        };

        Ok(Self {
            job_timeout,
            work_dir: value("VEDIT_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            ffmpeg_path: value("VEDIT_FFMPEG_PATH").map(PathBuf::from),
            font_dir: value("VEDIT_FONT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.font_dir),
            progress_buffer,
        })
    }

    pub fn engine_config(&self) -> EngineConfig {
        let config = EngineConfig::default().with_storage_parent(self.work_dir.join("storage"));
        match &self.ffmpeg_path {
            Some(path) => config.with_binary(path),
            None => config,
        }
    }

    pub fn font_sources(&self) -> FontSources {
        FontSources::new(&self.font_dir)
    }

    pub fn preview_dir(&self) -> PathBuf {
        self.work_dir.join("preview")
    }

    /// Editor session over an ffmpeg process engine.
    pub fn session(&self, progress: Option<mpsc::Sender<JobProgress>>) -> EditorSession {
        let engine = EngineHandle::new(Box::new(ProcessEngine::new()), self.engine_config());
        let session = EditorSession::new(engine, self.font_sources())
            .with_time_limit(self.job_timeout)
            .with_preview_dir(self.preview_dir());
        match progress {
            Some(tx) => session.with_progress(tx),
            None => session,
        }
    }
}

fn parse_job_timeout(raw: &str) -> WorkerResult<Duration> {
    let millis: u64 = raw.trim().parse().map_err(|_| {
        WorkerError::config(format!(
            "VEDIT_JOB_TIMEOUT_MS must be a number of milliseconds, got {:?}",
            raw
        ))
    })?;
    let timeout = Duration::from_millis(millis);
    if timeout.is_zero() || timeout > MAX_JOB_TIMEOUT {
        return Err(WorkerError::config(format!(
            "VEDIT_JOB_TIMEOUT_MS must be between 1 and {} ms, got {}",
            MAX_JOB_TIMEOUT.as_millis(),
            millis
        )));
    }
    Ok(timeout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EditorConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.job_timeout, Duration::from_millis(300_000));
        assert_eq!(config.font_dir, PathBuf::from("./fonts"));
        assert_eq!(config.progress_buffer, 64);
        assert!(config.ffmpeg_path.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = EditorConfig::from_lookup(lookup(&[
            ("VEDIT_JOB_TIMEOUT_MS", "1500"),
            ("VEDIT_WORK_DIR", "/var/tmp/vedit"),
            ("VEDIT_FFMPEG_PATH", "/opt/ffmpeg/bin/ffmpeg"),
            ("VEDIT_PROGRESS_BUFFER", "8"),
            ("VEDIT_FONT_DIR", ""),
        ]))
        .unwrap();

        assert_eq!(config.job_timeout, Duration::from_millis(1500));
        assert_eq!(config.preview_dir(), PathBuf::from("/var/tmp/vedit/preview"));
        assert_eq!(config.progress_buffer, 8);
        assert_eq!(config.font_dir, PathBuf::from("./fonts"));

        let engine = config.engine_config();
        assert_eq!(engine.binary, Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg")));
        assert_eq!(engine.storage_parent, PathBuf::from("/var/tmp/vedit/storage"));
    }

    #[test]
    fn test_unparseable_timeout_rejected() {
        let err = EditorConfig::from_lookup(lookup(&[("VEDIT_JOB_TIMEOUT_MS", "soon")])).unwrap_err();
        assert!(matches!(err, WorkerError::ConfigError(ref msg) if msg.contains("VEDIT_JOB_TIMEOUT_MS")));
    }

    #[test]
    fn test_out_of_range_timeout_rejected() {
        for raw in ["0", "18446744073709551615", "86400001"] {
            let err = EditorConfig::from_lookup(lookup(&[("VEDIT_JOB_TIMEOUT_MS", raw)])).unwrap_err();
            assert!(matches!(err, WorkerError::ConfigError(_)), "accepted {}", raw);
        }

        let config = EditorConfig::from_lookup(lookup(&[("VEDIT_JOB_TIMEOUT_MS", "86400000")])).unwrap();
        assert_eq!(config.job_timeout, MAX_JOB_TIMEOUT);
    }

    #[test]
    fn test_bad_progress_buffer_rejected() {
        for raw in ["0", "-3", "many"] {
            let err = EditorConfig::from_lookup(lookup(&[("VEDIT_PROGRESS_BUFFER", raw)])).unwrap_err();
            assert!(matches!(err, WorkerError::ConfigError(_)), "accepted {}", raw);
        }
    }
}
