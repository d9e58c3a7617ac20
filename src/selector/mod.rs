//! Node selection strategies.
//!
//! # Data Flow
//! ```text
//! get(target, strategy)
//!     → topology snapshot (matched active nodes, registration order)
//!     → Apply selection strategy:
//!         - round_robin.rs (rotate per pattern, revision-aware cursor)
//!         - random.rs (uniform pick, no state)
//!         - order.rs (first node, fallback via caller retry)
//!     → one node entry
//! ```
//!
//! # Design Decisions
//! - Only round-robin carries state, scoped per pattern string
//! - A topology revision change resets the rotation cursor
//! - Registration order is the canonical tie-break everywhere

pub mod order;
pub mod random;
pub mod round_robin;

use std::sync::Arc;

use crate::topology::NodeEntry;

use order::Order;
use random::Random;
use round_robin::RoundRobin;

/// Selection strategy requested per `get` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    #[default]
    RoundRobin,
    Random,
    Order,
}

impl Strategy {
    /// Parse a strategy name. Unknown names fall back to the default
    /// rather than erroring, mirroring the behavior callers of the
    /// original interface rely on.
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "RR" => Strategy::RoundRobin,
            "RANDOM" => Strategy::Random,
            "ORDER" => Strategy::Order,
            _ => Strategy::default(),
        }
    }
}

/// Picks one node from a matched set.
pub trait Selector: Send + Sync {
    /// Choose among `nodes` (non-empty, registration order) for `pattern`
    /// at topology `revision`. Returns `None` only for an empty slice.
    fn pick(&self, pattern: &str, revision: u64, nodes: &[Arc<NodeEntry>]) -> Option<Arc<NodeEntry>>;
}

/// One instance of every strategy, owned by the cluster for its lifetime.
pub struct Selectors {
    round_robin: RoundRobin,
    random: Random,
    order: Order,
}

impl Selectors {
    pub fn new() -> Self {
        Self {
            round_robin: RoundRobin::new(),
            random: Random::new(),
            order: Order::new(),
        }
    }

    pub fn get(&self, strategy: Strategy) -> &dyn Selector {
        match strategy {
            Strategy::RoundRobin => &self.round_robin,
            Strategy::Random => &self.random,
            Strategy::Order => &self.order,
        }
    }
}

impl Default for Selectors {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!(Strategy::parse("RR"), Strategy::RoundRobin);
        assert_eq!(Strategy::parse("random"), Strategy::Random);
        assert_eq!(Strategy::parse("Order"), Strategy::Order);
        // unknown names fall back to the default
        assert_eq!(Strategy::parse("fancy"), Strategy::RoundRobin);
    }
}
