//! Owned engine handle with an explicit lifecycle.

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::{EngineConfig, EngineLifecycle, MediaEngine};
use crate::error::{MediaError, MediaResult};
use crate::progress::ProgressSender;

/// Owns one engine instance and gates every operation on its lifecycle.
///
/// Lifecycle changes are published on a watch channel so callers can
/// wait for readiness without polling.
pub struct EngineHandle {
    engine: Box<dyn MediaEngine>,
    config: EngineConfig,
    state: watch::Sender<EngineLifecycle>,
}

impl EngineHandle {
    pub fn new(engine: Box<dyn MediaEngine>, config: EngineConfig) -> Self {
        let (state, _) = watch::channel(EngineLifecycle::Uninitialized);
        Self {
            engine,
            config,
            state,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn lifecycle(&self) -> EngineLifecycle {
        *self.state.borrow()
    }

    /// Subscribe to lifecycle changes.
    pub fn subscribe(&self) -> watch::Receiver<EngineLifecycle> {
        self.state.subscribe()
    }

    pub fn is_ready(&self) -> bool {
        self.lifecycle() == EngineLifecycle::Ready
    }

    /// Load the engine. A no-op when already ready.
    pub async fn load(&mut self) -> MediaResult<()> {
        if self.is_ready() {
            debug!("Engine already loaded");
            return Ok(());
        }

        self.state.send_replace(EngineLifecycle::Loading);
        match self.engine.load(&self.config).await {
            Ok(()) => {
                self.state.send_replace(EngineLifecycle::Ready);
                info!(root = %self.engine.virtual_root(), "Engine ready");
                Ok(())
            }
            Err(e) => {
                self.state.send_replace(EngineLifecycle::Failed);
                error!(error = %e, "Engine initialization failed");
                Err(match e {
                    MediaError::EngineInit(_) => e,
                    other => MediaError::engine_init(other.to_string()),
                })
            }
        }
    }

    pub fn ensure_ready(&self) -> MediaResult<()> {
        match self.lifecycle() {
            EngineLifecycle::Ready => Ok(()),
            other => Err(MediaError::EngineNotReady(other.as_str())),
        }
    }

    pub fn virtual_root(&self) -> String {
        self.engine.virtual_root()
    }

    pub async fn write_file(&mut self, name: &str, bytes: &[u8]) -> MediaResult<()> {
        self.ensure_ready()?;
        debug!(name, size = bytes.len(), "Writing file to engine storage");
        self.engine.write_file(name, bytes).await
    }

    pub async fn exec(&mut self, args: &[String], progress: ProgressSender) -> MediaResult<()> {
        self.ensure_ready()?;
        debug!("Running engine: {}", args.join(" "));
        self.engine.exec(args, progress).await
    }

    pub async fn read_file(&mut self, name: &str) -> MediaResult<Vec<u8>> {
        self.ensure_ready()?;
        self.engine.read_file(name).await
    }

    /// Tear the instance down. It must be loaded again before reuse.
    pub async fn terminate(&mut self) {
        warn!(state = %self.lifecycle(), "Terminating engine instance");
        self.engine.terminate().await;
        self.state.send_replace(EngineLifecycle::Terminated);
    }
}
