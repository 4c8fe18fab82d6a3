#![deny(unreachable_patterns)]
//! Filter-graph builder and bounded job runner around an FFmpeg-style engine.
//!
//! This crate provides:
//! - Pure filter-graph composition from editor options
//! - Type-safe engine argument building and two-stage invocation planning
//! - An owned engine handle with an explicit lifecycle
//! - A single-flight job runner racing the engine against a hard deadline
//! - A process-backed engine driving the `ffmpeg` CLI over a private work dir

pub mod artifact;
pub mod command;
pub mod engine;
pub mod error;
pub mod filters;
pub mod fonts;
pub mod logging;
pub mod metrics;
pub mod progress;
pub mod runner;
pub mod session;

pub use artifact::{OutputArtifact, PreviewFile};
pub use command::{plan_conversion, plan_edit, EngineCommand, InvocationPlan, OVERLAY_IMAGE_NAME};
pub use engine::{EngineConfig, EngineHandle, EngineLifecycle, MediaEngine, ProcessEngine};
pub use error::{MediaError, MediaResult, RESTART_MESSAGE};
pub use filters::{build_filter_plan, FilterPlan, FilterPlanBuilder};
pub use fonts::{load_fonts, FontSources};
pub use logging::JobLogger;
pub use progress::{FfmpegProgress, JobProgress, ProgressGate, ProgressSender};
pub use runner::{JobKind, JobRunner, JobSpec, DEFAULT_TIME_LIMIT};
pub use session::{EditRequest, EditorSession, UploadedInput};
