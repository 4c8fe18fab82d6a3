//! Single-flight job runner with a hard wall-clock deadline.
//!
//! A job writes its input into engine storage, runs one or two engine
//! invocations and reads the output back. The whole pipeline races a
//! deadline timer armed when the job enters `Running`:
//!
//! - pipeline first: the timer is dropped and the job completes (or
//!   fails, if the engine reported an error);
//! - deadline first: the pipeline future is dropped, the engine is
//!   terminated exactly once and the job times out.
//!
//! After a timeout or failure the runner refuses new jobs until
//! [`JobRunner::restart`] reloads the engine.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex, MutexGuard};
use tokio::time::{sleep_until, Instant};
use tracing::{warn, Instrument};
use vedit_models::{FormatTable, Job, JobId, OutputFormat, TrimRange};

use crate::artifact::{OutputArtifact, PreviewFile};
use crate::command::{plan_conversion, plan_edit, InvocationPlan, OVERLAY_IMAGE_NAME};
use crate::engine::{EngineHandle, EngineLifecycle};
use crate::error::{MediaError, MediaResult};
use crate::filters::FilterPlan;
use crate::logging::{millis, JobLogger};
use crate::metrics::{record_invocation, record_job_finished, record_job_started};
use crate::progress::{JobProgress, ProgressGate, ProgressSender};

/// Wall-clock budget for a job unless overridden.
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_millis(300_000);

/// What a job does with its input.
#[derive(Debug, Clone, PartialEq)]
pub enum JobKind {
    /// Filter/overlay/trim edit with codec selection
    Edit {
        plan: FilterPlan,
        trim: Option<TrimRange>,
        overlay_image: Option<Vec<u8>>,
    },
    /// Plain container conversion
    Convert,
}

impl JobKind {
    /// Table the requested output extension is checked against.
    pub fn table(&self) -> FormatTable {
        match self {
            JobKind::Edit { .. } => FormatTable::Editor,
            JobKind::Convert => FormatTable::Converter,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Edit { .. } => "edit",
            JobKind::Convert => "convert",
        }
    }
}

/// A job submission.
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub kind: JobKind,
    /// Storage name the input is written under
    pub input_name: String,
    pub input_bytes: Vec<u8>,
    /// Requested output extension, e.g. `mp4`
    pub output_extension: String,
    pub time_limit: Duration,
}

impl JobSpec {
    pub fn edit(
        plan: FilterPlan,
        input_name: impl Into<String>,
        input_bytes: Vec<u8>,
        output_extension: impl Into<String>,
    ) -> Self {
        Self {
            kind: JobKind::Edit {
                plan,
                trim: None,
                overlay_image: None,
            },
            input_name: input_name.into(),
            input_bytes,
            output_extension: output_extension.into(),
            time_limit: DEFAULT_TIME_LIMIT,
        }
    }

    pub fn convert(
        input_name: impl Into<String>,
        input_bytes: Vec<u8>,
        output_extension: impl Into<String>,
    ) -> Self {
        Self {
            kind: JobKind::Convert,
            input_name: input_name.into(),
            input_bytes,
            output_extension: output_extension.into(),
            time_limit: DEFAULT_TIME_LIMIT,
        }
    }

    /// Trim bounds for an edit job. Ignored for conversions.
    pub fn with_trim(mut self, range: TrimRange) -> Self {
        if let JobKind::Edit { trim, .. } = &mut self.kind {
            *trim = Some(range);
        }
        self
    }

    /// Overlay image bytes for an edit job. Ignored for conversions.
    pub fn with_overlay_image(mut self, bytes: Vec<u8>) -> Self {
        if let JobKind::Edit { overlay_image, .. } = &mut self.kind {
            *overlay_image = Some(bytes);
        }
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = limit;
        self
    }

    /// Validate the submission and plan its invocations.
    ///
    /// Runs before the job starts, so a rejected submission never
    /// touches the engine.
    fn plan(&self) -> MediaResult<(OutputFormat, InvocationPlan)> {
        let format = OutputFormat::parse(&self.output_extension, self.kind.table())?;

        let invocations = match &self.kind {
            JobKind::Edit {
                plan,
                trim,
                overlay_image,
            } => {
                if let Some(range) = trim {
                    range.validate()?;
                }
                if plan.uses_overlay_image() && overlay_image.is_none() {
                    return Err(MediaError::MissingOverlayImage);
                }
                plan_edit(&self.input_name, format, plan, trim.as_ref())
            }
            JobKind::Convert => plan_conversion(&self.input_name, format),
        };

        Ok((format, invocations))
    }

    fn overlay_bytes(&self) -> Option<&[u8]> {
        match &self.kind {
            JobKind::Edit {
                plan,
                overlay_image: Some(bytes),
                ..
            } if plan.uses_overlay_image() => Some(bytes.as_slice()),
            _ => None,
        }
    }
}

/// Runs jobs one at a time against an owned engine.
pub struct JobRunner {
    engine: Mutex<EngineHandle>,
    lifecycle: watch::Receiver<EngineLifecycle>,
    halted: AtomicBool,
    jobs: watch::Sender<Option<Job>>,
    preview: StdMutex<Option<Arc<PreviewFile>>>,
    preview_dir: Option<PathBuf>,
}

impl JobRunner {
    pub fn new(engine: EngineHandle) -> Self {
        let lifecycle = engine.subscribe();
        let (jobs, _) = watch::channel(None);
        Self {
            engine: Mutex::new(engine),
            lifecycle,
            halted: AtomicBool::new(false),
            jobs,
            preview: StdMutex::new(None),
            preview_dir: None,
        }
    }

    /// Directory for preview files (system temp dir otherwise).
    pub fn with_preview_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.preview_dir = Some(dir.into());
        self
    }

    /// Load the engine.
    pub async fn load(&self) -> MediaResult<()> {
        self.engine.lock().await.load().await
    }

    /// Tear the engine down, load it again and accept jobs again.
    pub async fn restart(&self) -> MediaResult<()> {
        let mut engine = self.engine.lock().await;
        if engine.is_ready() {
            engine.terminate().await;
        }
        engine.load().await?;
        self.halted.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// Exclusive access to the engine between jobs.
    pub async fn lock_engine(&self) -> MutexGuard<'_, EngineHandle> {
        self.engine.lock().await
    }

    /// Engine storage root, unless a job holds the engine.
    pub fn virtual_root(&self) -> MediaResult<String> {
        self.engine
            .try_lock()
            .map(|engine| engine.virtual_root())
            .map_err(|_| MediaError::Busy)
    }

    pub fn lifecycle(&self) -> EngineLifecycle {
        *self.lifecycle.borrow()
    }

    /// True after a timeout or failure, until `restart`.
    pub fn requires_restart(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }

    /// The most recent job, in its latest state.
    pub fn last_job(&self) -> Option<Job> {
        self.jobs.borrow().clone()
    }

    /// Observe job state transitions.
    pub fn subscribe_jobs(&self) -> watch::Receiver<Option<Job>> {
        self.jobs.subscribe()
    }

    /// Preview of the last completed job, if it is still current.
    pub fn preview(&self) -> Option<Arc<PreviewFile>> {
        self.preview
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run one job to a terminal state.
    ///
    /// Returns `Busy` if another job holds the engine and
    /// `RestartRequired` after an earlier timeout or failure.
    pub async fn run(
        &self,
        spec: JobSpec,
        progress: Option<mpsc::Sender<JobProgress>>,
    ) -> MediaResult<OutputArtifact> {
        let mut engine = self.engine.try_lock().map_err(|_| MediaError::Busy)?;
        if self.requires_restart() {
            return Err(MediaError::RestartRequired);
        }
        engine.ensure_ready()?;

        let (format, invocations) = spec.plan()?;
        let kind = spec.kind.as_str();
        let limit_ms = millis(spec.time_limit);

        let mut job = Job::new(&spec.input_name, format.output_file_name(), limit_ms);
        let logger = JobLogger::new(&job.id, kind);
        let span = logger.create_span();

        job.start()?;
        self.jobs.send_replace(Some(job.clone()));
        self.clear_preview();
        record_job_started(kind);
        logger.log_start(invocations.stages(), spec.time_limit);

        let started = Instant::now();
        let deadline = started
            .checked_add(spec.time_limit)
            .unwrap_or_else(|| started + Duration::from_secs(u64::from(u32::MAX)));
        let gate = ProgressGate::new();

        let outcome = {
            let pipeline = execute(
                &mut engine,
                &spec,
                &invocations,
                &job.id,
                progress,
                &gate,
                &logger,
            )
            .instrument(span.clone());

            tokio::select! {
                biased;
                _ = sleep_until(deadline) => None,
                result = pipeline => Some(result),
            }
        };
        gate.close();
        let elapsed = started.elapsed();

        let result = match outcome {
            Some(Ok(bytes)) => {
                job.complete()?;
                let artifact = OutputArtifact::new(format, bytes);
                logger.log_completion(artifact.len(), elapsed);
                self.store_preview(&artifact).await;
                Ok(artifact)
            }
            Some(Err(e)) => {
                logger.log_error(&e.to_string());
                job.fail(e.to_string())?;
                self.halted.store(true, Ordering::SeqCst);
                Err(e)
            }
            None => {
                logger.log_timeout(spec.time_limit);
                engine.terminate().instrument(span).await;
                job.time_out()?;
                self.halted.store(true, Ordering::SeqCst);
                Err(MediaError::DeadlineExceeded { limit_ms })
            }
        };

        record_job_finished(kind, job.state, elapsed.as_secs_f64());
        self.jobs.send_replace(Some(job));
        result
    }

    fn clear_preview(&self) {
        self.preview
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    async fn store_preview(&self, artifact: &OutputArtifact) {
        if !artifact.format.is_previewable() {
            return;
        }
        match PreviewFile::create(artifact, self.preview_dir.as_deref()).await {
            Ok(file) => {
                *self.preview.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(file));
            }
            Err(e) => warn!(error = %e, "Failed to write preview file"),
        }
    }
}

/// Write inputs, run every stage, read the output.
async fn execute(
    engine: &mut EngineHandle,
    spec: &JobSpec,
    invocations: &InvocationPlan,
    job_id: &JobId,
    progress: Option<mpsc::Sender<JobProgress>>,
    gate: &ProgressGate,
    logger: &JobLogger,
) -> MediaResult<Vec<u8>> {
    engine.write_file(&spec.input_name, &spec.input_bytes).await?;
    if let Some(image) = spec.overlay_bytes() {
        engine.write_file(OVERLAY_IMAGE_NAME, image).await?;
    }

    let stages = invocations.stages();
    for (index, command) in invocations.commands.iter().enumerate() {
        let stage = index + 1;
        logger.log_stage(stage, stages);
        record_invocation(logger.kind(), stage);

        let sender = ProgressSender::new(progress.clone(), gate.clone(), job_id.clone(), stage, stages);
        engine.exec(&command.build_args(), sender).await?;
    }

    let output = invocations
        .commands
        .last()
        .map(|command| command.output().to_string())
        .ok_or_else(|| MediaError::invocation_failed("no invocations planned", None, None))?;
    engine.read_file(&output).await
}
