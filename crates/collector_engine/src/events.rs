use collector_logging::{collector_info, collector_warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentEvent {
    Started,
    Stopped,
    Collected(usize),
    Error(String),
}

/// Receiver of lifecycle and outcome notifications. Fire-and-forget.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: AgentEvent);

    fn on_started(&self) {
        self.emit(AgentEvent::Started);
    }

    fn on_stopped(&self) {
        self.emit(AgentEvent::Stopped);
    }

    fn on_collected(&self, count: usize) {
        self.emit(AgentEvent::Collected(count));
    }

    fn on_error(&self, message: &str) {
        self.emit(AgentEvent::Error(message.to_string()));
    }
}

/// Writes every event to the log; stands in for desktop notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&self, event: AgentEvent) {
        match event {
            AgentEvent::Started => collector_info!("Collection started"),
            AgentEvent::Stopped => collector_info!("Collection stopped"),
            AgentEvent::Collected(count) => collector_info!("Collected {} item(s)", count),
            AgentEvent::Error(message) => collector_warn!("Collection error: {}", message),
        }
    }
}

