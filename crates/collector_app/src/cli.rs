use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use collector_core::SchedulerTiming;
use collector_engine::{AgentSettings, FeedSelectors, TransportSettings, DEFAULT_ITEM_SELECTOR};

use crate::logging::LogDestination;

#[derive(Parser, Debug)]
#[command(name = "collector")]
#[command(version, about = "Watches a rendered feed and forwards relevant items to a collector")]
pub struct Cli {
    /// Settings file shared with the options UI.
    #[arg(long, env = "COLLECTOR_CONFIG", default_value = "collector.json")]
    pub config: PathBuf,

    /// HTML snapshot of the feed page, kept current by the browser exporter.
    #[arg(long, env = "COLLECTOR_SNAPSHOT")]
    pub snapshot: PathBuf,

    #[arg(long, default_value = DEFAULT_ITEM_SELECTOR)]
    pub item_selector: String,

    /// Base for resolving relative permalinks.
    #[arg(long, default_value = "https://x.com")]
    pub base_url: String,

    #[arg(long, default_value_t = 10)]
    pub interval_secs: u64,

    #[arg(long, default_value_t = 2000)]
    pub debounce_ms: u64,

    /// How often the snapshot file is checked for changes.
    #[arg(long, default_value_t = 500)]
    pub watch_ms: u64,

    #[arg(long, default_value_t = 30)]
    pub request_timeout_secs: u64,

    #[arg(long, value_enum, default_value_t = LogDestination::Terminal)]
    pub log: LogDestination,

    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn agent_settings(&self) -> AgentSettings {
        AgentSettings {
            timing: SchedulerTiming {
                scan_interval: Duration::from_secs(self.interval_secs.max(1)),
                scroll_debounce: Duration::from_millis(self.debounce_ms),
            },
            ..AgentSettings::default()
        }
    }

    pub fn selectors(&self) -> FeedSelectors {
        FeedSelectors {
            base_url: self.base_url.clone(),
            ..FeedSelectors::default()
        }
    }

    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            request_timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
            ..TransportSettings::default()
        }
    }

    pub fn watch_interval(&self) -> Duration {
        Duration::from_millis(self.watch_ms.max(50))
    }
}
