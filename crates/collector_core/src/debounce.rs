use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebounceState {
    #[default]
    Idle,
    Pending {
        deadline: Instant,
    },
    Fired,
}

/// Scroll debounce: `Idle -> Pending(deadline) -> Fired`.
///
/// Every activity pushes the deadline out by `delay`; `poll` fires once when
/// the activity has settled. Time is supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollDebounce {
    delay: Duration,
    state: DebounceState,
}

impl ScrollDebounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            state: DebounceState::Idle,
        }
    }

    pub fn on_activity(&mut self, now: Instant) {
        self.state = DebounceState::Pending {
            deadline: now + self.delay,
        };
    }

    /// Returns `true` exactly once per settled burst of activity.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.state {
            DebounceState::Pending { deadline } if now >= deadline => {
                self.state = DebounceState::Fired;
                true
            }
            _ => false,
        }
    }

    pub fn reset(&mut self) {
        self.state = DebounceState::Idle;
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            DebounceState::Pending { deadline } => Some(deadline),
            DebounceState::Idle | DebounceState::Fired => None,
        }
    }
}
