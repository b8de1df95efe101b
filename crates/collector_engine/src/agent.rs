use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use collector_core::{update, Effect, Msg, ScanTrigger, SchedulerState, SchedulerTiming};
use collector_logging::{
    collector_debug, collector_error, collector_info, collector_warn, current_scan_pass,
};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tokio::time::{Instant as TokioInstant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::events::EventSink;
use crate::extract::utc_now_iso;
use crate::scan::Scanner;
use crate::store::ConfigStore;
use crate::submit::Submitter;
use crate::view::FeedView;
use crate::ScanAck;

#[derive(Debug, Clone, Copy)]
pub struct AgentSettings {
    pub timing: SchedulerTiming,
    /// How often the store's `enabled` flag is re-read.
    pub config_poll: Duration,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            timing: SchedulerTiming::default(),
            config_poll: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("agent is not running")]
    Closed,
    #[error("settings unavailable: {0}")]
    Settings(String),
    #[error("feed view unavailable: {0}")]
    View(String),
}

enum AgentCommand {
    ConfigChanged,
    Scrolled,
    ScanNow {
        reply: oneshot::Sender<Result<ScanAck, AgentError>>,
    },
}

pub struct AgentParts {
    pub scanner: Scanner,
    pub view: Arc<dyn FeedView>,
    pub store: Arc<dyn ConfigStore>,
    pub submitter: Arc<Submitter>,
    pub sink: Arc<dyn EventSink>,
    pub settings: AgentSettings,
}

/// Single-threaded driver: feeds the scheduler, runs the scans it asks for
/// and spawns one submission task per non-empty batch.
pub struct Agent {
    scheduler: SchedulerState,
    scanner: Scanner,
    view: Arc<dyn FeedView>,
    store: Arc<dyn ConfigStore>,
    submitter: Arc<Submitter>,
    sink: Arc<dyn EventSink>,
    config_poll: Duration,
    last_enabled: Option<bool>,
}

/// Cheap handle for talking to a running agent.
#[derive(Clone)]
pub struct AgentHandle {
    cmd_tx: mpsc::UnboundedSender<AgentCommand>,
    cancel: CancellationToken,
}

impl AgentHandle {
    /// The options store changed; re-read the `enabled` flag now.
    pub fn config_changed(&self) {
        let _ = self.cmd_tx.send(AgentCommand::ConfigChanged);
    }

    /// View-changing activity (scrolling, new items rendered).
    pub fn scrolled(&self) {
        let _ = self.cmd_tx.send(AgentCommand::Scrolled);
    }

    /// Runs exactly one scan and reports how many items it collected.
    pub async fn scan_now(&self) -> Result<ScanAck, AgentError> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(AgentCommand::ScanNow { reply })
            .map_err(|_| AgentError::Closed)?;
        rx.await.map_err(|_| AgentError::Closed)?
    }

    /// Same as [`AgentHandle::scan_now`], for callers outside the runtime.
    pub fn scan_now_blocking(&self) -> Result<ScanAck, AgentError> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(AgentCommand::ScanNow { reply })
            .map_err(|_| AgentError::Closed)?;
        rx.blocking_recv().map_err(|_| AgentError::Closed)?
    }

    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Agent {
    pub fn new(parts: AgentParts) -> Self {
        Self {
            scheduler: SchedulerState::new(parts.settings.timing),
            scanner: parts.scanner,
            view: parts.view,
            store: parts.store,
            submitter: parts.submitter,
            sink: parts.sink,
            config_poll: parts.settings.config_poll,
            last_enabled: None,
        }
    }

    /// Splits the agent into a handle and the future that runs it.
    pub fn into_task(self) -> (AgentHandle, impl Future<Output = ()> + Send) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let handle = AgentHandle {
            cmd_tx,
            cancel: cancel.clone(),
        };
        (handle, self.run(cmd_rx, cancel))
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<AgentCommand>, cancel: CancellationToken) {
        let mut in_flight = JoinSet::new();
        let mut config_poll = tokio::time::interval(self.config_poll);
        config_poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        collector_info!("Agent running");
        loop {
            let deadline = self.scheduler.next_deadline();
            let wake = async move {
                match deadline {
                    Some(at) => tokio::time::sleep_until(TokioInstant::from_std(at)).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                _ = cancel.cancelled() => break,
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command, &mut in_flight),
                    None => break,
                },
                _ = wake => {
                    self.dispatch(Msg::Tick { now: now() }, &mut in_flight);
                }
                _ = config_poll.tick() => self.sync_enabled(&mut in_flight),
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(err) = joined {
                        collector_error!("Submission task failed: {}", err);
                    }
                }
            }
        }

        self.dispatch(Msg::Teardown, &mut in_flight);
        // In-flight submissions are allowed to finish and report.
        while let Some(joined) = in_flight.join_next().await {
            if let Err(err) = joined {
                collector_error!("Submission task failed: {}", err);
            }
        }
        collector_info!("Agent stopped after {} scan pass(es)", self.scanner.passes());
    }

    fn handle_command(&mut self, command: AgentCommand, in_flight: &mut JoinSet<()>) {
        match command {
            AgentCommand::ConfigChanged => self.sync_enabled(in_flight),
            AgentCommand::Scrolled => {
                self.dispatch(Msg::Scrolled { now: now() }, in_flight);
            }
            AgentCommand::ScanNow { reply } => {
                let result = self
                    .dispatch(Msg::ScanNow, in_flight)
                    .unwrap_or(Err(AgentError::Closed));
                let _ = reply.send(result);
            }
        }
    }

    /// Follows the store's `enabled` flag, reacting to transitions only.
    fn sync_enabled(&mut self, in_flight: &mut JoinSet<()>) {
        let enabled = match self.store.load() {
            Ok(settings) => settings.enabled,
            Err(err) => {
                collector_warn!("Failed to read settings: {}", err);
                return;
            }
        };
        if self.last_enabled == Some(enabled) {
            return;
        }
        self.last_enabled = Some(enabled);
        let msg = if enabled {
            Msg::Enable { now: now() }
        } else {
            Msg::Disable
        };
        self.dispatch(msg, in_flight);
    }

    /// Applies a message and runs the resulting effects. Returns the result
    /// of a manual scan when the message produced one.
    fn dispatch(
        &mut self,
        msg: Msg,
        in_flight: &mut JoinSet<()>,
    ) -> Option<Result<ScanAck, AgentError>> {
        collector_debug!("Scheduler msg {:?}", msg);
        let state = std::mem::take(&mut self.scheduler);
        let (state, effects) = update(state, msg);
        self.scheduler = state;

        let mut manual = None;
        for effect in effects {
            match effect {
                Effect::RunScan { trigger } => {
                    let result = self.run_scan(trigger, in_flight);
                    if trigger == ScanTrigger::Manual {
                        manual = Some(result);
                    }
                }
                Effect::NotifyStarted => {
                    collector_info!("Starting collection");
                    self.sink.on_started();
                }
                Effect::NotifyStopped => {
                    collector_info!("Stopping collection");
                    self.sink.on_stopped();
                }
                Effect::Shutdown => collector_debug!("Scheduler torn down"),
            }
        }
        manual
    }

    fn run_scan(
        &mut self,
        trigger: ScanTrigger,
        in_flight: &mut JoinSet<()>,
    ) -> Result<ScanAck, AgentError> {
        // Fresh read on every pass; nothing is cached across scans.
        let config = self.store.config().map_err(|err| {
            collector_warn!("Scan ({}) skipped, settings unavailable: {}", trigger, err);
            AgentError::Settings(err.to_string())
        })?;
        // Timers may outlive a disable the poll has not seen yet.
        if trigger != ScanTrigger::Manual && !config.enabled {
            collector_info!("Scan ({}) skipped, collection disabled", trigger);
            self.last_enabled = Some(false);
            self.dispatch(Msg::Disable, in_flight);
            return Ok(ScanAck { collected: 0 });
        }
        let outcome = self
            .scanner
            .scan(self.view.as_ref(), &config)
            .map_err(|err| {
                collector_warn!("Scan ({}) skipped: {}", trigger, err);
                AgentError::View(err.to_string())
            })?;

        collector_info!(
            "pass={} scan ({}) found {} item(s), collected {}",
            current_scan_pass(),
            trigger,
            outcome.stats.rendered,
            outcome.stats.collected
        );
        if trigger == ScanTrigger::Manual {
            if let Err(err) = self.store.mark_synced(&utc_now_iso()) {
                collector_warn!("Failed to record sync time: {}", err);
            }
        }

        let collected = outcome.batch.len();
        if !outcome.batch.is_empty() {
            let submitter = self.submitter.clone();
            let endpoint = config.endpoint;
            let batch = outcome.batch;
            in_flight.spawn(async move {
                // Outcome already reported through the event sink.
                let _ = submitter.submit(&endpoint, &batch).await;
            });
        }
        Ok(ScanAck { collected })
    }
}

fn now() -> std::time::Instant {
    TokioInstant::now().into_std()
}
