//! Event bus for localstore using tokio::broadcast
//!
//! Reports what initialization and the write-back worker did, since neither
//! `initialize` nor `set` hands persistence outcomes back to the caller.

use tokio::sync::broadcast;

/// Events emitted by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// Persistent store was wiped at initialization (`resetLocal`)
    Cleared,
    /// A deferred write reached the persistent store
    Persisted { key: String },
    /// A deferred write failed and was dropped
    PersistFailed { key: String, error: String },
}

/// Event bus for broadcasting store events
///
/// Slow subscribers lag and lose old events; publishers never block.
pub struct EventBus {
    sender: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    /// Create a new event bus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create with default capacity (256 events)
    pub fn default_capacity() -> Self {
        Self::new(256)
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: StoreEvent) {
        // Ignore send errors (no subscribers)
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::default_capacity()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}
