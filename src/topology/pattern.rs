//! Target pattern matching.
//!
//! A target is an exact node id, a literal prefix with a single trailing
//! `*`, or "all nodes" (`*` alone, or an empty target). No other wildcard
//! forms exist, keeping matching O(n) over the id set.

/// A parsed target pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// Matches every active node.
    All,
    /// Matches the single node with this id.
    Exact(String),
    /// Matches every id sharing this prefix.
    Prefix(String),
}

impl Pattern {
    /// Parse a caller-supplied target string.
    pub fn parse(target: &str) -> Self {
        if target.is_empty() || target == "*" {
            Pattern::All
        } else if let Some(prefix) = target.strip_suffix('*') {
            Pattern::Prefix(prefix.to_string())
        } else {
            Pattern::Exact(target.to_string())
        }
    }

    /// True if `id` falls under this pattern.
    pub fn matches(&self, id: &str) -> bool {
        match self {
            Pattern::All => true,
            Pattern::Exact(exact) => id == exact,
            Pattern::Prefix(prefix) => id.starts_with(prefix.as_str()),
        }
    }
}
