//! Random selection strategy.

use std::sync::Arc;

use crate::selector::Selector;
use crate::topology::NodeEntry;

/// Uniform random selector. No state persists across calls.
#[derive(Debug, Default)]
pub struct Random;

impl Random {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Selector for Random {
    fn pick(&self, _pattern: &str, _revision: u64, nodes: &[Arc<NodeEntry>]) -> Option<Arc<NodeEntry>> {
        if nodes.is_empty() {
            return None;
        }
        Some(nodes[fastrand::usize(..nodes.len())].clone())
    }
}
