//! Fixed-order (fallback chain) selection strategy.

use std::sync::Arc;

use crate::selector::Selector;
use crate::topology::NodeEntry;

/// Always picks the first matched node. Later nodes only come into play
/// once earlier ones leave the topology, which gives primary/standby
/// semantics: a caller that sees an acquisition failure retries its `get`,
/// and by then failure-driven eviction may have promoted the next node to
/// the front.
#[derive(Debug, Default)]
pub struct Order;

impl Order {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Selector for Order {
    fn pick(&self, _pattern: &str, _revision: u64, nodes: &[Arc<NodeEntry>]) -> Option<Arc<NodeEntry>> {
        nodes.first().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::node::testing::entry;

    #[test]
    fn test_always_first() {
        let selector = Order::new();
        let nodes = vec![entry("primary"), entry("standby")];

        for _ in 0..3 {
            assert_eq!(selector.pick("*", 1, &nodes).unwrap().id(), "primary");
        }
    }

    #[test]
    fn test_empty_set_yields_none() {
        let selector = Order::new();
        assert!(selector.pick("*", 1, &[]).is_none());
    }
}
