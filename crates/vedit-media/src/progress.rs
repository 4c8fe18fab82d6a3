//! Progress reporting for engine invocations.
//!
//! Progress is observational only: the runner never branches on it.
//! Engines receive a [`ProgressSender`] per invocation; once the job
//! settles the runner closes the shared [`ProgressGate`] and any late
//! reports are dropped.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use vedit_models::JobId;

/// Progress event delivered to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobProgress {
    pub job_id: JobId,
    /// 1-based index of the running invocation
    pub stage: usize,
    /// Number of invocations in the job
    pub stages: usize,
    /// Fraction of the current invocation, 0.0 to 1.0
    pub fraction: f64,
}

impl JobProgress {
    /// Percentage of the current invocation, for display.
    pub fn percent(&self) -> u8 {
        (self.fraction.clamp(0.0, 1.0) * 100.0).floor() as u8
    }
}

/// Shared open/closed switch for a job's progress stream.
#[derive(Debug, Clone)]
pub struct ProgressGate {
    open: Arc<AtomicBool>,
}

impl Default for ProgressGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressGate {
    pub fn new() -> Self {
        Self {
            open: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

/// Per-invocation progress handle given to the engine.
#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: Option<mpsc::Sender<JobProgress>>,
    gate: ProgressGate,
    job_id: JobId,
    stage: usize,
    stages: usize,
}

impl ProgressSender {
    /// Create a new progress sender.
    pub fn new(
        tx: Option<mpsc::Sender<JobProgress>>,
        gate: ProgressGate,
        job_id: JobId,
        stage: usize,
        stages: usize,
    ) -> Self {
        Self {
            tx,
            gate,
            job_id,
            stage,
            stages,
        }
    }

    /// A sender that discards everything.
    pub fn disabled() -> Self {
        Self::new(None, ProgressGate::new(), JobId::from_string(""), 1, 1)
    }

    pub fn stage(&self) -> usize {
        self.stage
    }

    /// Report a fraction (non-blocking; dropped if the channel is full or the gate closed).
    pub fn report(&self, fraction: f64) {
        if !self.gate.is_open() {
            return;
        }
        if let Some(tx) = &self.tx {
            let _ = tx.try_send(JobProgress {
                job_id: self.job_id.clone(),
                stage: self.stage,
                stages: self.stages,
                fraction: fraction.clamp(0.0, 1.0),
            });
        }
    }
}

/// Progress information parsed from FFmpeg's `-progress` output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FfmpegProgress {
    /// Current frame number
    pub frame: u64,
    /// Current FPS
    pub fps: f64,
    /// Output time in milliseconds
    pub out_time_ms: i64,
    /// Encoding speed (e.g., 1.5 = 1.5x realtime)
    pub speed: f64,
    /// Input duration in milliseconds, from the banner
    pub duration_ms: Option<i64>,
    /// Whether encoding is complete
    pub is_complete: bool,
}

impl FfmpegProgress {
    /// Fraction of the input processed so far, if the duration is known.
    pub fn fraction(&self) -> Option<f64> {
        if self.is_complete {
            return Some(1.0);
        }
        let total = self.duration_ms.filter(|d| *d > 0)?;
        Some((self.out_time_ms as f64 / total as f64).clamp(0.0, 1.0))
    }
}

/// Parse one line of FFmpeg stderr.
///
/// Updates `current` and returns a snapshot at the end of each
/// `progress=` block.
pub fn parse_progress_line(line: &str, current: &mut FfmpegProgress) -> Option<FfmpegProgress> {
    let line = line.trim();

    if let Some(rest) = line.strip_prefix("Duration:") {
        let stamp = rest.split(',').next().unwrap_or("").trim();
        if current.duration_ms.is_none() {
            current.duration_ms = parse_timestamp_ms(stamp);
        }
        return None;
    }

    if let Some((key, value)) = line.split_once('=') {
        match key {
            "out_time_ms" | "out_time_us" => {
                // Both keys carry microseconds despite the name.
                if let Ok(us) = value.parse::<i64>() {
                    current.out_time_ms = us / 1000;
                }
            }
            "frame" => {
                if let Ok(frame) = value.parse() {
                    current.frame = frame;
                }
            }
            "fps" => {
                if let Ok(fps) = value.parse() {
                    current.fps = fps;
                }
            }
            "speed" => {
                if let Some(speed) = value.strip_suffix('x').and_then(|s| s.trim().parse().ok()) {
                    current.speed = speed;
                }
            }
            "progress" => {
                if value == "end" {
                    current.is_complete = true;
                }
                return Some(current.clone());
            }
            _ => {}
        }
    }

    None
}

/// Parse `HH:MM:SS.frac` into milliseconds.
fn parse_timestamp_ms(stamp: &str) -> Option<i64> {
    let mut parts = stamp.split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(((hours * 3600.0 + minutes * 60.0 + seconds) * 1000.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_parsing() {
        let mut progress = FfmpegProgress::default();

        parse_progress_line("  Duration: 00:00:10.00, start: 0.000000, bitrate: 1205 kb/s", &mut progress);
        assert_eq!(progress.duration_ms, Some(10_000));

        parse_progress_line("out_time_us=5000000", &mut progress);
        assert_eq!(progress.out_time_ms, 5000);

        parse_progress_line("speed=1.5x", &mut progress);
        assert!((progress.speed - 1.5).abs() < 0.01);

        let snapshot = parse_progress_line("progress=continue", &mut progress).unwrap();
        assert!((snapshot.fraction().unwrap() - 0.5).abs() < 1e-9);

        let result = parse_progress_line("progress=end", &mut progress);
        assert!(result.is_some());
        assert!(progress.is_complete);
        assert_eq!(progress.fraction(), Some(1.0));
    }

    #[test]
    fn test_fraction_unknown_without_duration() {
        let progress = FfmpegProgress {
            out_time_ms: 5000,
            ..Default::default()
        };
        assert_eq!(progress.fraction(), None);
    }

    #[test]
    fn test_speed_na_ignored() {
        let mut progress = FfmpegProgress::default();
        parse_progress_line("speed=N/A", &mut progress);
        assert_eq!(progress.speed, 0.0);
    }

    #[test]
    fn test_percent_clamped() {
        let event = JobProgress {
            job_id: JobId::from_string("j"),
            stage: 1,
            stages: 1,
            fraction: 0.456,
        };
        assert_eq!(event.percent(), 45);
    }

    #[tokio::test]
    async fn test_closed_gate_drops_reports() {
        let (tx, mut rx) = mpsc::channel(8);
        let gate = ProgressGate::new();
        let sender = ProgressSender::new(Some(tx), gate.clone(), JobId::from_string("j"), 1, 2);

        sender.report(0.25);
        gate.close();
        sender.report(0.75);
        drop(sender);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.fraction, 0.25);
        assert_eq!(first.stages, 2);
        assert!(rx.recv().await.is_none());
    }
}
