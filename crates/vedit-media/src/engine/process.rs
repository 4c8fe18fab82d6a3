//! FFmpeg CLI engine over a private temporary directory.
//!
//! Virtual storage is a per-instance temp dir; `terminate` drops it. Each
//! `exec` spawns `ffmpeg` with `kill_on_drop`, so abandoning the future
//! (as the runner does when the deadline fires) kills the process.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use super::{EngineConfig, MediaEngine};
use crate::error::{MediaError, MediaResult};
use crate::progress::{parse_progress_line, FfmpegProgress, ProgressSender};

/// Stderr lines kept for error reports.
const STDERR_TAIL_LINES: usize = 20;

/// Flags prepended to every invocation.
const GLOBAL_ARGS: &[&str] = &["-y", "-hide_banner", "-nostdin", "-progress", "pipe:2"];

/// Engine backed by the `ffmpeg` binary.
#[derive(Debug, Default)]
pub struct ProcessEngine {
    binary: Option<PathBuf>,
    storage: Option<TempDir>,
}

impl ProcessEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory backing virtual storage, while loaded.
    pub fn storage_dir(&self) -> Option<&Path> {
        self.storage.as_ref().map(|d| d.path())
    }

    fn loaded(&self) -> MediaResult<(&Path, &Path)> {
        match (&self.binary, &self.storage) {
            (Some(binary), Some(storage)) => Ok((binary.as_path(), storage.path())),
            _ => Err(MediaError::EngineNotReady("uninitialized")),
        }
    }

    fn storage_path(&self, name: &str) -> MediaResult<PathBuf> {
        let (_, storage) = self.loaded()?;
        validate_storage_name(name)?;
        Ok(storage.join(name))
    }
}

#[async_trait]
impl MediaEngine for ProcessEngine {
    async fn load(&mut self, config: &EngineConfig) -> MediaResult<()> {
        let binary = match &config.binary {
            Some(path) if path.exists() => path.clone(),
            Some(path) => {
                return Err(MediaError::engine_init(format!(
                    "engine binary not found: {}",
                    path.display()
                )))
            }
            None => which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?,
        };

        tokio::fs::create_dir_all(&config.storage_parent).await?;
        let storage = tempfile::Builder::new()
            .prefix("vedit-")
            .tempdir_in(&config.storage_parent)?;

        if config.probe_on_load {
            let output = Command::new(&binary)
                .arg("-version")
                .stdin(Stdio::null())
                .output()
                .await
                .map_err(|e| MediaError::engine_init(format!("failed to spawn engine: {}", e)))?;

            if !output.status.success() {
                return Err(MediaError::engine_init(format!(
                    "engine probe exited with {:?}",
                    output.status.code()
                )));
            }
            let banner = String::from_utf8_lossy(&output.stdout);
            info!(
                version = banner.lines().next().unwrap_or_default(),
                "Engine probe succeeded"
            );
        }

        debug!(binary = %binary.display(), storage = %storage.path().display(), "Engine loaded");
        self.binary = Some(binary);
        self.storage = Some(storage);
        Ok(())
    }

    async fn write_file(&mut self, name: &str, bytes: &[u8]) -> MediaResult<()> {
        let path = self.storage_path(name)?;
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    async fn exec(&mut self, args: &[String], progress: ProgressSender) -> MediaResult<()> {
        let (binary, storage) = self.loaded()?;

        let mut child = Command::new(binary)
            .current_dir(storage)
            .args(GLOBAL_ARGS)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                MediaError::invocation_failed(format!("failed to spawn engine: {}", e), None, None)
            })?;

        let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);
        if let Some(stderr) = child.stderr.take() {
            let mut lines = BufReader::new(stderr).lines();
            let mut current = FfmpegProgress::default();

            while let Some(line) = lines.next_line().await? {
                if let Some(snapshot) = parse_progress_line(&line, &mut current) {
                    if let Some(fraction) = snapshot.fraction() {
                        progress.report(fraction);
                    }
                    continue;
                }
                if is_progress_key(&line) {
                    continue;
                }
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
        }

        let status = child.wait().await?;
        if status.success() {
            Ok(())
        } else {
            let stderr = Vec::from(tail).join("\n");
            Err(MediaError::invocation_failed(
                "FFmpeg exited with non-zero status",
                Some(stderr),
                status.code(),
            ))
        }
    }

    async fn read_file(&mut self, name: &str) -> MediaResult<Vec<u8>> {
        let path = self.storage_path(name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(MediaError::StorageFileNotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn terminate(&mut self) {
        // Dropping the TempDir removes every stored file.
        self.storage = None;
        self.binary = None;
    }

    fn virtual_root(&self) -> String {
        match &self.storage {
            Some(dir) => format!("{}/", dir.path().display()),
            None => "/".to_string(),
        }
    }
}

/// Storage names are flat file names; no directories or traversal.
fn validate_storage_name(name: &str) -> MediaResult<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\');
    if invalid {
        return Err(MediaError::InvalidStorageName(name.to_string()));
    }
    Ok(())
}

fn is_progress_key(line: &str) -> bool {
    matches!(
        line.split_once('=').map(|(k, _)| k),
        Some(
            "frame"
                | "fps"
                | "bitrate"
                | "total_size"
                | "out_time_us"
                | "out_time_ms"
                | "out_time"
                | "dup_frames"
                | "drop_frames"
                | "speed"
        )
    ) || line.starts_with("stream_")
}
