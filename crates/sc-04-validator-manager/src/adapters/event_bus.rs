//! Event Bus adapter
//!
//! Collects manager events in memory for tests and the simulation summary.

use crate::domain::ManagerEvent;
use crate::ports::EventBus;
use parking_lot::RwLock;
use tracing::debug;

/// In-memory event bus.
#[derive(Debug, Default)]
pub struct InMemoryEventBus {
    events: RwLock<Vec<ManagerEvent>>,
}

impl InMemoryEventBus {
    /// Empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// All events so far, in publication order.
    pub fn get_events(&self) -> Vec<ManagerEvent> {
        self.events.read().clone()
    }

    /// Events with the given [`ManagerEvent::name`].
    pub fn events_named(&self, name: &str) -> Vec<ManagerEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.name() == name)
            .cloned()
            .collect()
    }

    /// Number of events so far.
    pub fn event_count(&self) -> usize {
        self.events.read().len()
    }
}

impl EventBus for InMemoryEventBus {
    fn publish(&self, event: ManagerEvent) {
        debug!("[sc-04] Event {}", event.name());
        self.events.write().push(event);
    }
}
