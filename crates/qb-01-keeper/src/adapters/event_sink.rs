//! Event sink adapters.

use crate::ports::events::EventSink;
use parking_lot::Mutex;
use shared_types::BridgeEvent;
use tracing::info;

/// Keeps every published event; used by tests and query snapshots.
#[derive(Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<BridgeEvent>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BridgeEvent> {
        self.events.lock().clone()
    }

    /// Events of one kind, in publication order.
    pub fn of_kind(&self, kind: &str) -> Vec<BridgeEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.kind() == kind)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for MemoryEventSink {
    fn publish(&self, events: Vec<BridgeEvent>) {
        self.events.lock().extend(events);
    }
}

/// Writes each event to the log.
#[derive(Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn publish(&self, events: Vec<BridgeEvent>) {
        for event in events {
            info!(kind = event.kind(), ?event, "[qb-01] event");
        }
    }
}
