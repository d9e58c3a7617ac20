//! One registered backend node.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;

use crate::config::schema::NodeConfig;
use crate::pool::ConnectionPool;

/// Node lifecycle state.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Eligible for selection.
    Active = 0,
    /// Removal begun; invisible to selection, pool draining.
    Removing = 1,
    /// Drained and about to be purged from the registry.
    Removed = 2,
}

impl From<u8> for NodeState {
    fn from(val: u8) -> Self {
        match val {
            1 => NodeState::Removing,
            2 => NodeState::Removed,
            _ => NodeState::Active,
        }
    }
}

/// A backend node: configuration, its pool, and health counters.
#[derive(Debug)]
pub struct NodeEntry {
    id: String,
    config: NodeConfig,
    pool: Arc<ConnectionPool>,
    state: AtomicU8,
    consecutive_failures: AtomicU32,
}

impl NodeEntry {
    pub fn new(config: NodeConfig, pool: Arc<ConnectionPool>) -> Self {
        Self {
            id: config.id.clone(),
            config,
            pool,
            state: AtomicU8::new(NodeState::Active as u8),
            consecutive_failures: AtomicU32::new(0),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn pool(&self) -> &Arc<ConnectionPool> {
        &self.pool
    }

    pub fn state(&self) -> NodeState {
        NodeState::from(self.state.load(Ordering::Acquire))
    }

    pub fn is_active(&self) -> bool {
        self.state.load(Ordering::Acquire) == NodeState::Active as u8
    }

    /// Attempt the Active → Removing transition. Returns true for exactly
    /// one caller; losers of the race must not act on the node.
    pub fn begin_remove(&self) -> bool {
        self.state
            .compare_exchange(
                NodeState::Active as u8,
                NodeState::Removing as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Mark the node fully torn down.
    pub fn mark_removed(&self) {
        self.state.store(NodeState::Removed as u8, Ordering::Release);
    }

    /// Record a successful acquisition: the failure streak is over.
    pub fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::Release);
    }

    /// Record a failed acquisition, returning the new streak length.
    pub fn record_failure(&self) -> u32 {
        self.consecutive_failures.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::Acquire)
    }
}
