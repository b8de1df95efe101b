use std::time::{Duration, Instant};

use crate::debounce::ScrollDebounce;
use crate::view_model::SchedulerView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Stopped,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerTiming {
    pub scan_interval: Duration,
    pub scroll_debounce: Duration,
}

impl Default for SchedulerTiming {
    fn default() -> Self {
        Self {
            scan_interval: Duration::from_secs(10),
            scroll_debounce: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerState {
    timing: SchedulerTiming,
    phase: Phase,
    next_periodic: Option<Instant>,
    scroll: ScrollDebounce,
    scans_requested: u64,
    torn_down: bool,
}

impl Default for SchedulerState {
    fn default() -> Self {
        Self::new(SchedulerTiming::default())
    }
}

impl SchedulerState {
    pub fn new(timing: SchedulerTiming) -> Self {
        Self {
            timing,
            phase: Phase::Stopped,
            next_periodic: None,
            scroll: ScrollDebounce::new(timing.scroll_debounce),
            scans_requested: 0,
            torn_down: false,
        }
    }

    pub fn view(&self) -> SchedulerView {
        SchedulerView {
            phase: self.phase,
            next_periodic: self.next_periodic,
            scroll: self.scroll.state(),
            scans_requested: self.scans_requested,
            torn_down: self.torn_down,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Earliest instant at which a `Tick` can produce a scan.
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.phase != Phase::Running {
            return None;
        }
        match (self.next_periodic, self.scroll.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub(crate) fn start(&mut self, now: Instant) {
        self.phase = Phase::Running;
        self.next_periodic = Some(now + self.timing.scan_interval);
        self.scroll.reset();
    }

    pub(crate) fn stop(&mut self) {
        self.phase = Phase::Stopped;
        self.next_periodic = None;
        self.scroll.reset();
    }

    pub(crate) fn tear_down(&mut self) {
        self.stop();
        self.torn_down = true;
    }

    pub(crate) fn note_scroll(&mut self, now: Instant) {
        self.scroll.on_activity(now);
    }

    /// Consume the periodic deadline if it has passed and re-arm it.
    /// A late wake-up re-arms from `now` instead of replaying missed ticks.
    pub(crate) fn take_periodic_due(&mut self, now: Instant) -> bool {
        match self.next_periodic {
            Some(deadline) if now >= deadline => {
                let next = deadline + self.timing.scan_interval;
                self.next_periodic = Some(if next > now {
                    next
                } else {
                    now + self.timing.scan_interval
                });
                true
            }
            _ => false,
        }
    }

    pub(crate) fn take_scroll_due(&mut self, now: Instant) -> bool {
        self.scroll.poll(now)
    }

    pub(crate) fn count_scan(&mut self) {
        self.scans_requested += 1;
    }
}
