use crate::{Effect, Msg, Phase, ScanTrigger, SchedulerState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: SchedulerState, msg: Msg) -> (SchedulerState, Vec<Effect>) {
    if state.is_torn_down() {
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::Enable { now } => match state.phase() {
            Phase::Running => Vec::new(),
            Phase::Stopped => {
                state.start(now);
                state.count_scan();
                vec![
                    Effect::NotifyStarted,
                    Effect::RunScan {
                        trigger: ScanTrigger::Enabled,
                    },
                ]
            }
        },
        Msg::Disable => match state.phase() {
            Phase::Running => {
                state.stop();
                vec![Effect::NotifyStopped]
            }
            Phase::Stopped => Vec::new(),
        },
        Msg::Tick { now } => {
            if state.phase() != Phase::Running {
                return (state, Vec::new());
            }
            // Both deadlines are consumed; a single pass serves both.
            let periodic = state.take_periodic_due(now);
            let scroll = state.take_scroll_due(now);
            let trigger = match (periodic, scroll) {
                (true, _) => Some(ScanTrigger::Interval),
                (false, true) => Some(ScanTrigger::Scroll),
                (false, false) => None,
            };
            match trigger {
                Some(trigger) => {
                    state.count_scan();
                    vec![Effect::RunScan { trigger }]
                }
                None => Vec::new(),
            }
        }
        Msg::Scrolled { now } => {
            if state.phase() == Phase::Running {
                state.note_scroll(now);
            }
            Vec::new()
        }
        Msg::ScanNow => {
            state.count_scan();
            vec![Effect::RunScan {
                trigger: ScanTrigger::Manual,
            }]
        }
        Msg::Teardown => {
            let was_running = state.phase() == Phase::Running;
            state.tear_down();
            let mut effects = Vec::with_capacity(2);
            if was_running {
                effects.push(Effect::NotifyStopped);
            }
            effects.push(Effect::Shutdown);
            effects
        }
    };

    (state, effects)
}
