//! Failure bookkeeping and the automatic eviction path.

use std::sync::Arc;
use std::time::Duration;

use crate::cluster::drain_and_purge;
use crate::cluster::events::{ClusterEvent, EventSink};
use crate::topology::{NodeEntry, Registry};

/// Observes acquisition outcomes and evicts nodes whose consecutive
/// failure streak reaches the configured threshold.
pub struct HealthTracker {
    threshold: u32,
    drain_timeout: Duration,
    registry: Arc<Registry>,
    events: EventSink,
}

impl HealthTracker {
    pub fn new(
        threshold: u32,
        drain_timeout: Duration,
        registry: Arc<Registry>,
        events: EventSink,
    ) -> Self {
        Self {
            threshold,
            drain_timeout,
            registry,
            events,
        }
    }

    /// A connection was handed out: the node's failure streak is over.
    pub fn record_success(&self, node: &NodeEntry) {
        node.record_success();
    }

    /// An acquisition failed. At the threshold, the node is taken out of
    /// selection, its pool drain is scheduled, and subscribers are told.
    pub fn record_failure(&self, node: &Arc<NodeEntry>) {
        let failures = node.record_failure();
        if failures < self.threshold {
            tracing::debug!(
                node = %node.id(),
                failures,
                threshold = self.threshold,
                "acquisition failure recorded"
            );
            return;
        }

        // only the caller that wins the state transition evicts; a racing
        // failure or an explicit remove() leaves nothing to do here
        if !node.begin_remove() {
            return;
        }

        self.registry.bump_revision();
        tracing::warn!(
            node = %node.id(),
            failures,
            "evicting node after repeated acquisition failures"
        );
        self.events.emit(ClusterEvent::NodeEvicted {
            id: node.id().to_string(),
        });

        tokio::spawn(drain_and_purge(
            Arc::clone(&self.registry),
            Arc::clone(node),
            self.drain_timeout,
            self.events.clone(),
        ));
    }
}
