use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime};

use anyhow::Context;
use collector_engine::AgentHandle;
use collector_logging::{collector_debug, collector_info};

/// Runs the agent on its own thread with a single-threaded runtime.
pub fn spawn_agent(task: impl Future<Output = ()> + Send + 'static) -> anyhow::Result<JoinHandle<()>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    thread::Builder::new()
        .name("collector-agent".to_string())
        .spawn(move || runtime.block_on(task))
        .context("failed to spawn agent thread")
}

/// Polls the snapshot's modification time and reports each change as
/// view activity, the way scrolling re-renders the live page.
pub struct SnapshotWatcher {
    stop_tx: mpsc::Sender<()>,
    thread: JoinHandle<()>,
}

impl SnapshotWatcher {
    pub fn spawn(path: PathBuf, every: Duration, agent: AgentHandle) -> anyhow::Result<Self> {
        let (stop_tx, stop_rx) = mpsc::channel();
        let thread = thread::Builder::new()
            .name("snapshot-watcher".to_string())
            .spawn(move || {
                let mut last = modified(&path);
                loop {
                    match stop_rx.recv_timeout(every) {
                        Err(RecvTimeoutError::Timeout) => {}
                        _ => break,
                    }
                    let current = modified(&path);
                    if current != last {
                        collector_debug!("Snapshot {:?} changed", path);
                        last = current;
                        agent.scrolled();
                    }
                }
            })
            .context("failed to spawn snapshot watcher")?;
        collector_info!("Watching snapshot every {:?}", every);
        Ok(Self { stop_tx, thread })
    }

    pub fn stop(self) {
        let _ = self.stop_tx.send(());
        let _ = self.thread.join();
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}
