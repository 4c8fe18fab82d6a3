//! Shared data models for the vedit editor core.
//!
//! This crate provides Serde-serializable types for:
//! - Edit options captured from the editor form
//! - Named text positions and filter presets
//! - Output formats, codec argument sets and MIME types
//! - Trim ranges
//! - Jobs and their lifecycle

pub mod edit;
pub mod error;
pub mod font;
pub mod format;
pub mod job;
pub mod preset;
pub mod trim;

// Re-export common types
pub use edit::{EditOptions, NamedPosition, DEFAULT_TEXT_COLOR, FALLBACK_POSITION};
pub use error::{ModelError, ModelResult};
pub use font::Font;
pub use format::{FormatTable, OutputFormat};
pub use job::{Job, JobId, JobState};
pub use preset::{FilterPreset, NO_OP_FILTER};
pub use trim::TrimRange;
