use std::time::Instant;

use crate::{DebounceState, Phase};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerView {
    pub phase: Phase,
    pub next_periodic: Option<Instant>,
    pub scroll: DebounceState,
    pub scans_requested: u64,
    pub torn_down: bool,
}
