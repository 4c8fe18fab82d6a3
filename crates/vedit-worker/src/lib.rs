//! Command-line front end for the vedit editor core.
//!
//! This crate provides:
//! - Environment-driven configuration
//! - Command-line argument parsing for edit and convert jobs
//! - Tracing subscriber setup shared by the binaries

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;

pub use cli::{Cli, Command, ConvertArgs, EditArgs};
pub use config::{EditorConfig, MAX_JOB_TIMEOUT};
pub use error::{WorkerError, WorkerResult};
