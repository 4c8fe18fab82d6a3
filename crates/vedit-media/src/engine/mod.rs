//! The external media engine boundary.
//!
//! The engine is an opaque command executor with a private file
//! namespace. Everything the editor does goes through the five
//! operations of [`MediaEngine`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::error::MediaResult;
use crate::progress::ProgressSender;

mod handle;
mod process;

pub use handle::EngineHandle;
pub use process::ProcessEngine;

/// Locations of the engine's runtime artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Engine binary; resolved from `PATH` when unset
    #[serde(default)]
    pub binary: Option<PathBuf>,

    /// Directory under which the engine creates its private storage
    pub storage_parent: PathBuf,

    /// Run a `-version` invocation before reporting ready
    #[serde(default = "default_probe_on_load")]
    pub probe_on_load: bool,
}

fn default_probe_on_load() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: None,
            storage_parent: std::env::temp_dir().join("vedit"),
            probe_on_load: true,
        }
    }
}

impl EngineConfig {
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = Some(binary.into());
        self
    }

    pub fn with_storage_parent(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_parent = dir.into();
        self
    }
}

/// Observable lifecycle of an engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EngineLifecycle {
    /// Never loaded
    #[default]
    Uninitialized,
    /// `load` in flight
    Loading,
    /// Accepting operations
    Ready,
    /// `load` was rejected; no automatic retry
    Failed,
    /// Torn down; must be loaded again before reuse
    Terminated,
}

impl EngineLifecycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineLifecycle::Uninitialized => "uninitialized",
            EngineLifecycle::Loading => "loading",
            EngineLifecycle::Ready => "ready",
            EngineLifecycle::Failed => "failed",
            EngineLifecycle::Terminated => "terminated",
        }
    }
}

impl fmt::Display for EngineLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Command-line style media engine with virtual storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaEngine: Send {
    /// Prepare the engine. Must succeed before any other operation.
    async fn load(&mut self, config: &EngineConfig) -> MediaResult<()>;

    /// Store bytes under `name`, replacing any existing file.
    async fn write_file(&mut self, name: &str, bytes: &[u8]) -> MediaResult<()>;

    /// Run one invocation against storage.
    ///
    /// Progress reports are for display only.
    async fn exec(&mut self, args: &[String], progress: ProgressSender) -> MediaResult<()>;

    /// Read a file previously produced by `exec` or `write_file`.
    async fn read_file(&mut self, name: &str) -> MediaResult<Vec<u8>>;

    /// Destroy the instance, abandoning any in-flight work.
    async fn terminate(&mut self);

    /// Prefix under which stored files are addressable from filter arguments.
    fn virtual_root(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_defaults_when_deserialized() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"storage_parent":"/var/tmp/vedit"}"#).unwrap();
        assert!(config.binary.is_none());
        assert!(config.probe_on_load);
        assert_eq!(config.storage_parent, PathBuf::from("/var/tmp/vedit"));
    }

    #[test]
    fn test_lifecycle_labels() {
        assert_eq!(EngineLifecycle::default(), EngineLifecycle::Uninitialized);
        assert_eq!(EngineLifecycle::Terminated.to_string(), "terminated");
        assert_eq!(
            serde_json::to_string(&EngineLifecycle::Ready).unwrap(),
            "\"ready\""
        );
    }
}
