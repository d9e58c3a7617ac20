//! Cluster event delivery.
//!
//! An explicit observer registry: subscribers hold the receiving half of an
//! unbounded channel, the cluster holds the senders. Delivery is
//! at-least-once per event; ordering across subscribers is unspecified.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

/// Topology notifications delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterEvent {
    /// A node was evicted after repeated acquisition failures.
    NodeEvicted { id: String },

    /// A removed node's pool missed its drain bound and was force-purged.
    DrainTimedOut { id: String },
}

/// Fan-out handle for cluster events.
///
/// Cheap to clone; all clones share the subscriber list.
#[derive(Clone)]
pub struct EventSink {
    subscribers: Arc<Mutex<Vec<mpsc::UnboundedSender<ClusterEvent>>>>,
}

impl EventSink {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Register a new subscriber.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<ClusterEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().unwrap().push(tx);
        rx
    }

    /// Deliver an event to every live subscriber, pruning closed ones.
    pub fn emit(&self, event: ClusterEvent) {
        self.subscribers
            .lock()
            .unwrap()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }
}

impl Default for EventSink {
    fn default() -> Self {
        Self::new()
    }
}
