use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Collection was switched on in the options store.
    Enable { now: Instant },
    /// Collection was switched off in the options store.
    Disable,
    /// The driver woke up; fire whatever deadlines have passed.
    Tick { now: Instant },
    /// Scroll (or any view-changing) activity was observed.
    Scrolled { now: Instant },
    /// Explicit "scan now" command.
    ScanNow,
    /// Agent unload.
    Teardown,
}
