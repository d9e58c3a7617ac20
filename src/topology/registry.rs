//! The node registry.
//!
//! Writers (add, remove, evict, purge) serialize on a mutex and publish a
//! fresh immutable snapshot with a bumped revision; readers load the
//! current snapshot without locking. Selection state keyed to an older
//! revision is stale and must be rebuilt by its owner.

use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;

use crate::error::{ClusterError, Result};
use crate::topology::node::NodeEntry;
use crate::topology::pattern::Pattern;

/// An immutable view of the topology at one revision.
#[derive(Debug)]
pub struct Snapshot {
    revision: u64,
    /// Registration order, first-added first.
    nodes: Vec<Arc<NodeEntry>>,
}

impl Snapshot {
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Every registered entry, draining ones included.
    pub fn nodes(&self) -> &[Arc<NodeEntry>] {
        &self.nodes
    }

    /// Active entries matching `pattern`, in registration order.
    pub fn matching(&self, pattern: &Pattern) -> Vec<Arc<NodeEntry>> {
        self.nodes
            .iter()
            .filter(|entry| entry.is_active() && pattern.matches(entry.id()))
            .cloned()
            .collect()
    }

    fn contains(&self, id: &str) -> bool {
        self.nodes.iter().any(|entry| entry.id() == id)
    }
}

/// Owns the id → node mapping.
pub struct Registry {
    snapshot: ArcSwap<Snapshot>,
    write: Mutex<()>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(Snapshot {
                revision: 0,
                nodes: Vec::new(),
            }),
            write: Mutex::new(()),
        }
    }

    /// Current topology snapshot; never blocks.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.load_full()
    }

    /// Register a new entry. Fails while any entry with the same id is
    /// still present, draining entries included: an id is only free for
    /// reuse once its purge completes.
    pub fn insert(&self, entry: Arc<NodeEntry>) -> Result<()> {
        let _guard = self.write.lock().unwrap();
        let current = self.snapshot.load();
        if current.contains(entry.id()) {
            return Err(ClusterError::DuplicateId(entry.id().to_string()));
        }

        let mut nodes = current.nodes.clone();
        nodes.push(entry);
        self.publish(current.revision + 1, nodes);
        Ok(())
    }

    /// Drop an entry from the mapping, freeing its id.
    pub fn purge(&self, id: &str) {
        let _guard = self.write.lock().unwrap();
        let current = self.snapshot.load();
        if !current.contains(id) {
            return;
        }

        let nodes = current
            .nodes
            .iter()
            .filter(|entry| entry.id() != id)
            .cloned()
            .collect();
        self.publish(current.revision + 1, nodes);
    }

    /// Publish a new revision over the same membership. Used after entry
    /// state flips (Active → Removing) so cached selection state resets.
    pub fn bump_revision(&self) {
        let _guard = self.write.lock().unwrap();
        let current = self.snapshot.load();
        self.publish(current.revision + 1, current.nodes.clone());
    }

    fn publish(&self, revision: u64, nodes: Vec<Arc<NodeEntry>>) {
        self.snapshot.store(Arc::new(Snapshot { revision, nodes }));
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::node::testing::entry;

    #[test]
    fn test_insert_preserves_registration_order() {
        let registry = Registry::new();
        registry.insert(entry("b")).unwrap();
        registry.insert(entry("a")).unwrap();
        registry.insert(entry("c")).unwrap();

        let snapshot = registry.snapshot();
        let ids: Vec<_> = snapshot.nodes().iter().map(|e| e.id().to_string()).collect();
        assert_eq!(ids, ["b", "a", "c"]);
        assert_eq!(snapshot.revision(), 3);
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let registry = Registry::new();
        registry.insert(entry("a")).unwrap();

        let err = registry.insert(entry("a")).unwrap_err();
        assert!(matches!(err, ClusterError::DuplicateId(id) if id == "a"));
        // rejected insert publishes nothing
        assert_eq!(registry.snapshot().revision(), 1);
    }

    #[test]
    fn test_draining_entry_blocks_id_reuse() {
        let registry = Registry::new();
        let node = entry("a");
        registry.insert(node.clone()).unwrap();

        node.begin_remove();
        assert!(registry.insert(entry("a")).is_err());

        registry.purge("a");
        registry.insert(entry("a")).unwrap();
    }

    #[test]
    fn test_matching_skips_non_active() {
        let registry = Registry::new();
        let a = entry("replica1");
        registry.insert(a.clone()).unwrap();
        registry.insert(entry("replica2")).unwrap();
        registry.insert(entry("primary")).unwrap();

        let snapshot = registry.snapshot();
        let matched = snapshot.matching(&Pattern::parse("replica*"));
        assert_eq!(matched.len(), 2);

        a.begin_remove();
        // the old snapshot reflects entry state, which is shared
        let matched = snapshot.matching(&Pattern::parse("replica*"));
        let ids: Vec<_> = matched.iter().map(|e| e.id()).collect();
        assert_eq!(ids, ["replica2"]);
    }

    #[test]
    fn test_snapshot_isolated_from_later_writes() {
        let registry = Registry::new();
        registry.insert(entry("a")).unwrap();

        let before = registry.snapshot();
        registry.insert(entry("b")).unwrap();

        assert_eq!(before.nodes().len(), 1);
        assert_eq!(registry.snapshot().nodes().len(), 2);
    }
}
