//! Connection and connector seams.
//!
//! The cluster core never interprets a backend connection; it only needs to
//! know whether one is still usable. Drivers supply both halves: a
//! [`Connector`] that dials new connections and the [`Connection`] values it
//! produces.

use futures_util::future::BoxFuture;

use crate::error::AcquireError;

/// A live connection handed out by a pool.
pub trait Connection: Send + std::fmt::Debug {
    /// True while the underlying transport is usable. Closed connections
    /// are discarded instead of returning to the idle list.
    fn is_open(&self) -> bool;
}

/// Dials new connections for one node.
pub trait Connector: Send + Sync {
    fn connect(&self) -> BoxFuture<'static, Result<Box<dyn Connection>, AcquireError>>;
}
