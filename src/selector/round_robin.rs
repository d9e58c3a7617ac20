//! Round-robin selection strategy.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::selector::Selector;
use crate::topology::NodeEntry;

/// Rotation state for one pattern.
struct Cursor {
    /// Topology revision the position was built against.
    revision: AtomicU64,
    position: AtomicUsize,
}

/// Round-robin selector.
///
/// Keeps one rotation cursor per distinct pattern string so callers using
/// different patterns never disturb each other's rotation. A cursor whose
/// revision no longer matches the topology restarts from the front:
/// membership shifted, so the remembered position is meaningless.
pub struct RoundRobin {
    cursors: DashMap<String, Cursor>,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self {
            cursors: DashMap::new(),
        }
    }
}

impl Default for RoundRobin {
    fn default() -> Self {
        Self::new()
    }
}

impl Selector for RoundRobin {
    fn pick(&self, pattern: &str, revision: u64, nodes: &[Arc<NodeEntry>]) -> Option<Arc<NodeEntry>> {
        if nodes.is_empty() {
            return None;
        }

        let cursor = self
            .cursors
            .entry(pattern.to_string())
            .or_insert_with(|| Cursor {
                revision: AtomicU64::new(revision),
                position: AtomicUsize::new(0),
            });

        if cursor.revision.swap(revision, Ordering::AcqRel) != revision {
            // stale membership invalidates the position; a pick racing this
            // reset may repeat one index, which the restart makes moot
            cursor.position.store(0, Ordering::Release);
        }

        let index = cursor.position.fetch_add(1, Ordering::AcqRel) % nodes.len();
        Some(nodes[index].clone())
    }
}
