#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    RunScan { trigger: ScanTrigger },
    NotifyStarted,
    NotifyStopped,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanTrigger {
    Enabled,
    Interval,
    Scroll,
    Manual,
}

impl std::fmt::Display for ScanTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanTrigger::Enabled => write!(f, "enabled"),
            ScanTrigger::Interval => write!(f, "interval"),
            ScanTrigger::Scroll => write!(f, "scroll"),
            ScanTrigger::Manual => write!(f, "manual"),
        }
    }
}
