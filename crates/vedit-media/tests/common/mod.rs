//! Scripted in-memory engine for runner and session tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use vedit_media::{EngineConfig, EngineHandle, MediaEngine, MediaError, MediaResult, ProgressSender};

/// How `exec` behaves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExecBehavior {
    /// Resolve immediately and write the output
    Succeed,
    /// Resolve after a delay and write the output
    Delay(Duration),
    /// Never resolve; a detached task keeps reporting progress every second
    Pending,
    /// Reject with an invocation failure
    Fail,
}

/// Everything the engine saw, plus its current behavior.
#[derive(Debug)]
pub struct Script {
    pub behavior: ExecBehavior,
    /// Time each `write_file` takes before storing the bytes
    pub write_delay: Option<Duration>,
    pub loads: usize,
    pub terminations: usize,
    pub writes: Vec<String>,
    pub execs: Vec<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct SharedScript(Arc<Mutex<Script>>);

impl SharedScript {
    pub fn lock(&self) -> MutexGuard<'_, Script> {
        self.0.lock().unwrap()
    }

    pub fn set_behavior(&self, behavior: ExecBehavior) {
        self.lock().behavior = behavior;
    }

    pub fn set_write_delay(&self, delay: Duration) {
        self.lock().write_delay = Some(delay);
    }
}

pub struct ScriptedEngine {
    script: SharedScript,
    files: HashMap<String, Vec<u8>>,
}

#[async_trait]
impl MediaEngine for ScriptedEngine {
    async fn load(&mut self, _config: &EngineConfig) -> MediaResult<()> {
        self.script.lock().loads += 1;
        Ok(())
    }

    async fn write_file(&mut self, name: &str, bytes: &[u8]) -> MediaResult<()> {
        let delay = self.script.lock().write_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.script.lock().writes.push(name.to_string());
        self.files.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn exec(&mut self, args: &[String], progress: ProgressSender) -> MediaResult<()> {
        let behavior = {
            let mut script = self.script.lock();
            script.execs.push(args.to_vec());
            script.behavior
        };

        match behavior {
            ExecBehavior::Succeed => {}
            ExecBehavior::Delay(delay) => {
                progress.report(0.5);
                tokio::time::sleep(delay).await;
                progress.report(1.0);
            }
            ExecBehavior::Pending => {
                tokio::spawn(async move {
                    let mut ticks = tokio::time::interval(Duration::from_secs(1));
                    loop {
                        ticks.tick().await;
                        progress.report(0.1);
                    }
                });
                return std::future::pending::<MediaResult<()>>().await;
            }
            ExecBehavior::Fail => {
                return Err(MediaError::invocation_failed(
                    "Invalid argument",
                    Some("Error parsing filtergraph".to_string()),
                    Some(1),
                ));
            }
        }

        if let Some(output) = args.last() {
            self.files.insert(output.clone(), args.join(" ").into_bytes());
        }
        Ok(())
    }

    async fn read_file(&mut self, name: &str) -> MediaResult<Vec<u8>> {
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| MediaError::StorageFileNotFound(name.to_string()))
    }

    async fn terminate(&mut self) {
        self.script.lock().terminations += 1;
        self.files.clear();
    }

    fn virtual_root(&self) -> String {
        "/".to_string()
    }
}

/// Engine handle over a scripted engine, plus the script to inspect it.
pub fn scripted(behavior: ExecBehavior) -> (EngineHandle, SharedScript) {
    let script = SharedScript(Arc::new(Mutex::new(Script {
        behavior,
        write_delay: None,
        loads: 0,
        terminations: 0,
        writes: Vec::new(),
        execs: Vec::new(),
    })));
    let engine = ScriptedEngine {
        script: script.clone(),
        files: HashMap::new(),
    };
    (
        EngineHandle::new(Box::new(engine), EngineConfig::default()),
        script,
    )
}
