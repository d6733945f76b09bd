//! Event publisher that records events in memory

use crate::events::TreeEvent;
use crate::ports::EventPublisher;
use async_trait::async_trait;
use parking_lot::RwLock;

/// Keeps every published event, oldest first
#[derive(Debug, Default)]
pub struct InMemoryEventPublisher {
    events: RwLock<Vec<TreeEvent>>,
}

impl InMemoryEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all recorded events
    pub fn events(&self) -> Vec<TreeEvent> {
        self.events.read().clone()
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Remove and return all recorded events
    pub fn drain(&self) -> Vec<TreeEvent> {
        std::mem::take(&mut *self.events.write())
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventPublisher {
    async fn publish(&self, event: TreeEvent) -> Result<(), String> {
        tracing::trace!(event = event.name(), "event recorded");
        self.events.write().push(event);
        Ok(())
    }
}
