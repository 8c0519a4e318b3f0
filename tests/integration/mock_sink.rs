//! Recording event sink for integration tests.
//!
//! Keeps every emitted event so tests can assert on the full history.

use twinspool::app::events::SimEvent;
use twinspool::app::ports::EventSink;
use twinspool::fsm::EngineState;

pub struct RecordingSink {
    pub events: Vec<SimEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn state_changes(&self) -> Vec<(EngineState, EngineState)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SimEvent::StateChanged { from, to } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    pub fn alert_messages(&self) -> Vec<&'static str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SimEvent::AlertRaised(a) => Some(a.message),
                _ => None,
            })
            .collect()
    }

    pub fn shutdown_reasons(&self) -> Vec<&'static str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SimEvent::ShutdownCommanded { reason } => Some(*reason),
                _ => None,
            })
            .collect()
    }

    pub fn ignored(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, SimEvent::CommandIgnored(_)))
            .count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &SimEvent) {
        self.events.push(event.clone());
    }
}
