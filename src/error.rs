//! Crate-wide error definitions.

use thiserror::Error;

/// Errors surfaced by cluster operations.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// Operation attempted before `load` or after `unload`.
    #[error("cluster is not loaded")]
    NotLoaded,

    /// `load` called while a driver is already mounted.
    #[error("a driver is already loaded; unload it first")]
    AlreadyLoaded,

    /// `load` called with a driver name that has no binding.
    #[error("unsupported driver: {0}")]
    UnsupportedDriver(String),

    /// `add` called with an id that is still registered.
    #[error("node id already registered: {0}")]
    DuplicateId(String),

    /// A target pattern resolved to zero active nodes.
    #[error("no node matches target: {0:?}")]
    NoMatchingNode(String),

    /// The selected node's pool could not hand back a connection.
    #[error("failed to acquire a connection from node {node}")]
    AcquisitionFailed {
        node: String,
        #[source]
        source: AcquireError,
    },

    /// A removed node's pool still had outstanding connections when the
    /// drain bound elapsed. Non-fatal: the entry is force-purged.
    #[error("node {0} did not drain within the configured timeout")]
    DrainTimeout(String),

    /// A node configuration the driver refused to open a pool for.
    #[error("invalid configuration for node {node}: {reason}")]
    InvalidConfig { node: String, reason: String },
}

/// Errors produced by a single pool acquisition attempt.
#[derive(Debug, Error)]
pub enum AcquireError {
    /// The backend connection could not be established.
    #[error("connect failed: {0}")]
    Connect(#[from] std::io::Error),

    /// The pool is draining and no longer hands out connections.
    #[error("pool is draining")]
    Draining,

    /// No connection slot became free within the acquire bound.
    #[error("timed out waiting for a free connection slot")]
    Timeout,
}

pub type Result<T> = std::result::Result<T, ClusterError>;
