//! Cluster topology: the registered nodes and their states.
//!
//! # Data Flow
//! ```text
//! add/remove/evict (writers)
//!     → registry.rs (serialized, publish new snapshot + revision)
//!
//! get (readers)
//!     → registry.rs (lock-free snapshot load)
//!     → pattern.rs (match target against active ids, registration order)
//! ```
//!
//! # Design Decisions
//! - Snapshots are immutable; readers never contend with writers
//! - The revision counter invalidates cached selection state
//! - Entries stay registered while draining so their id cannot be reused early

pub mod node;
pub mod pattern;
pub mod registry;

pub use node::{NodeEntry, NodeState};
pub use pattern::Pattern;
pub use registry::{Registry, Snapshot};
