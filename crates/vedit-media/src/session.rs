//! Editor and converter session over one engine.
//!
//! The session owns the runner, remembers the uploaded input and turns
//! editor options into jobs.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};
use vedit_models::{EditOptions, TrimRange};

use crate::artifact::{OutputArtifact, PreviewFile};
use crate::engine::{EngineHandle, EngineLifecycle};
use crate::error::{MediaError, MediaResult};
use crate::filters::FilterPlanBuilder;
use crate::fonts::{load_fonts, FontSources};
use crate::progress::JobProgress;
use crate::runner::{JobRunner, JobSpec, DEFAULT_TIME_LIMIT};

/// Input clip stored in engine storage as `input.<ext>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedInput {
    name: String,
    bytes: Vec<u8>,
}

impl UploadedInput {
    /// Name the input after a MIME type's subtype, e.g. `video/webm`.
    pub fn from_mime(mime: &str, bytes: Vec<u8>) -> Self {
        let subtype = mime
            .split(';')
            .next()
            .and_then(|essence| essence.split_once('/'))
            .map(|(_, subtype)| subtype.trim().to_ascii_lowercase())
            .unwrap_or_default();

        let extension = match subtype.as_str() {
            "quicktime" => "mov".to_string(),
            "x-msvideo" => "avi".to_string(),
            "x-matroska" => "mkv".to_string(),
            "mpeg" => "mp3".to_string(),
            other => other.to_string(),
        };
        Self::with_extension(&extension, bytes)
    }

    /// Name the input after a source file's extension.
    pub fn from_file_name(file_name: &str, bytes: Vec<u8>) -> Self {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        Self::with_extension(&extension, bytes)
    }

    fn with_extension(extension: &str, bytes: Vec<u8>) -> Self {
        let extension: String = extension
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        let extension = if extension.is_empty() { "bin".to_string() } else { extension };
        Self {
            name: format!("input.{}", extension),
            bytes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// One "apply" submission from the editor.
#[derive(Debug, Clone, Default)]
pub struct EditRequest {
    pub options: EditOptions,
    /// Requested output extension
    pub format: String,
    pub trim: Option<TrimRange>,
    pub overlay_image: Option<Vec<u8>>,
}

impl EditRequest {
    pub fn new(options: EditOptions, format: impl Into<String>) -> Self {
        Self {
            options,
            format: format.into(),
            trim: None,
            overlay_image: None,
        }
    }

    pub fn with_trim(mut self, trim: TrimRange) -> Self {
        self.trim = Some(trim);
        self
    }

    pub fn with_overlay_image(mut self, bytes: Vec<u8>) -> Self {
        self.overlay_image = Some(bytes);
        self
    }
}

/// Editor session: engine readiness, fonts, the current input and jobs.
pub struct EditorSession {
    runner: JobRunner,
    fonts: FontSources,
    time_limit: Duration,
    progress: Option<mpsc::Sender<JobProgress>>,
    input: Option<UploadedInput>,
}

impl EditorSession {
    pub fn new(engine: EngineHandle, fonts: FontSources) -> Self {
        Self {
            runner: JobRunner::new(engine),
            fonts,
            time_limit: DEFAULT_TIME_LIMIT,
            progress: None,
            input: None,
        }
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = limit;
        self
    }

    /// Deliver progress events to `tx` for every job.
    pub fn with_progress(mut self, tx: mpsc::Sender<JobProgress>) -> Self {
        self.progress = Some(tx);
        self
    }

    pub fn with_preview_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.runner = self.runner.with_preview_dir(dir);
        self
    }

    /// Load the engine, then copy fonts into its storage.
    ///
    /// A load failure leaves the session not ready; there is no retry.
    /// Returns the number of fonts stored.
    pub async fn start(&self) -> MediaResult<usize> {
        if let Err(e) = self.runner.load().await {
            error!(error = %e, "Editor unavailable: engine failed to load");
            return Err(e);
        }
        let mut engine = self.runner.lock_engine().await;
        let loaded = load_fonts(&mut engine, &self.fonts).await;
        info!(fonts = loaded, "Editor ready");
        Ok(loaded)
    }

    pub fn is_ready(&self) -> bool {
        self.runner.lifecycle() == EngineLifecycle::Ready
    }

    pub fn runner(&self) -> &JobRunner {
        &self.runner
    }

    /// Remember the clip to edit. Replaces any earlier upload.
    pub fn upload(&mut self, input: UploadedInput) {
        info!(name = input.name(), size = input.bytes().len(), "Input uploaded");
        self.input = Some(input);
    }

    pub fn input(&self) -> Option<&UploadedInput> {
        self.input.as_ref()
    }

    /// Build filters from the request and run the edit job.
    ///
    /// Returns `Ok(None)` without running anything when there is no
    /// filter, overlay, text or trim to apply.
    pub async fn apply(&self, request: EditRequest) -> MediaResult<Option<OutputArtifact>> {
        let input = self.input.as_ref().ok_or(MediaError::NoInput)?;

        let mut options = request.options;
        if request.overlay_image.is_some() {
            options.has_overlay_image = true;
        }

        let root = self.runner.virtual_root()?;
        let plan = FilterPlanBuilder::new().font_root(root).build(&options);
        if plan.is_empty() && request.trim.is_none() {
            info!("Nothing to apply");
            return Ok(None);
        }

        let mut spec = JobSpec::edit(plan, input.name(), input.bytes().to_vec(), request.format)
            .with_time_limit(self.time_limit);
        if let Some(trim) = request.trim {
            spec = spec.with_trim(trim);
        }
        if let Some(image) = request.overlay_image {
            spec = spec.with_overlay_image(image);
        }

        self.runner.run(spec, self.progress.clone()).await.map(Some)
    }

    /// Convert the uploaded input to another container.
    pub async fn convert(&self, format: &str) -> MediaResult<OutputArtifact> {
        let input = self.input.as_ref().ok_or(MediaError::NoInput)?;
        let spec = JobSpec::convert(input.name(), input.bytes().to_vec(), format)
            .with_time_limit(self.time_limit);
        self.runner.run(spec, self.progress.clone()).await
    }

    /// Reload the engine and its fonts after a timeout or failure.
    pub async fn restart(&self) -> MediaResult<usize> {
        self.runner.restart().await?;
        let mut engine = self.runner.lock_engine().await;
        Ok(load_fonts(&mut engine, &self.fonts).await)
    }

    pub fn preview(&self) -> Option<Arc<PreviewFile>> {
        self.runner.preview()
    }
}
