//! Connection-pool cluster manager.
//!
//! Maintains a dynamic set of named backend connection pools (typically one
//! per database replica) and routes each connection request to one pool,
//! chosen by matching a target pattern against the registered node ids and
//! applying a selection strategy.
//!
//! # Data Flow
//! ```text
//! get(target, strategy)
//!     → topology (snapshot current nodes, match pattern)
//!     → selector (pick one node: round-robin / random / order)
//!     → pool (acquire a connection, bounded wait)
//!     → PooledConnection handed to the caller
//!
//! acquisition failure
//!     → health tracker (consecutive failure count)
//!     → threshold breach: node evicted, pool drained, event emitted
//! ```
//!
//! # Design Decisions
//! - Topology reads are lock-free snapshots; `get` never blocks on add/remove
//! - Selection state (round-robin cursor) is per pattern, reset on revision change
//! - Eviction is the only automatic removal path; explicit remove bypasses it
//! - One driver binding mounted at a time, selected at `load`

// Core subsystems
pub mod cluster;
pub mod config;
pub mod driver;
pub mod pool;
pub mod topology;

// Traffic management
pub mod health;
pub mod selector;

// Cross-cutting concerns
pub mod error;
pub mod sql;

pub use cluster::events::ClusterEvent;
pub use cluster::Cluster;
pub use config::schema::{ClusterConfig, EvictionConfig, NodeConfig, PoolOptions};
pub use driver::Driver;
pub use error::{AcquireError, ClusterError, Result};
pub use pool::{Connection, ConnectionPool, Connector, PooledConnection};
pub use selector::Strategy;
pub use sql::Value;
