mod cli;
mod console;
mod logging;
mod runtime;

use std::io;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use collector_engine::{
    Agent, AgentParts, EventSink, FeedItemExtractor, FileConfigStore, LogEventSink,
    ReqwestTransport, Scanner, SnapshotFileView, Submitter,
};
use collector_logging::collector_info;

use crate::cli::Cli;
use crate::console::Console;
use crate::runtime::SnapshotWatcher;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::initialize(cli.log, cli.verbose);

    let store = Arc::new(
        FileConfigStore::open(&cli.config)
            .with_context(|| format!("failed to open settings {:?}", cli.config))?,
    );
    let extractor = FeedItemExtractor::new(&cli.selectors())?;
    let view = Arc::new(SnapshotFileView::new(&cli.snapshot, &cli.item_selector)?);
    let sink: Arc<dyn EventSink> = Arc::new(LogEventSink);
    let transport = ReqwestTransport::new(cli.transport_settings());
    let submitter = Submitter::new(Arc::new(transport.clone()), store.clone(), sink.clone());

    let agent = Agent::new(AgentParts {
        scanner: Scanner::new(Box::new(extractor)),
        view,
        store: store.clone(),
        submitter: Arc::new(submitter),
        sink,
        settings: cli.agent_settings(),
    });
    let (handle, task) = agent.into_task();
    let agent_thread = runtime::spawn_agent(task)?;
    let watcher = SnapshotWatcher::spawn(cli.snapshot.clone(), cli.watch_interval(), handle.clone())?;
    collector_info!(
        "Collector up: settings {:?}, snapshot {:?}",
        store.path(),
        cli.snapshot
    );

    let console = Console::new(store, handle.clone(), transport)?;
    let result = console.run(io::stdin().lock(), io::stdout());

    watcher.stop();
    handle.shutdown();
    if agent_thread.join().is_err() {
        anyhow::bail!("agent thread panicked");
    }
    result
}
