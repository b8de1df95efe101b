//! Collector core: pure data model, relevance policy, dedup set and the
//! scan scheduler state machine. Nothing in here performs IO or reads a clock.
mod config;
mod debounce;
mod effect;
mod msg;
mod record;
mod relevance;
mod seen;
mod state;
mod update;
mod view_model;

pub use config::{
    endpoint_url, normalize_endpoint, parse_list, validate_endpoint, Config, ConfigError,
    StoredSettings, DEFAULT_ENDPOINT, DEFAULT_KEYWORDS,
};
pub use debounce::{DebounceState, ScrollDebounce};
pub use effect::{Effect, ScanTrigger};
pub use msg::Msg;
pub use record::{Batch, Record};
pub use relevance::is_relevant;
pub use seen::SeenSet;
pub use state::{Phase, SchedulerState, SchedulerTiming};
pub use update::update;
pub use view_model::SchedulerView;
