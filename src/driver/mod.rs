//! Pluggable backend bindings.
//!
//! # Responsibilities
//! - Open connection pools for node configurations
//! - Quote literals and identifiers in the backend's dialect
//! - Resolve a driver name given to `load` into a binding
//!
//! # Design Decisions
//! - Exactly one binding is mounted per cluster instance
//! - The core hands node configs through without interpreting them
//! - Embedders can mount their own binding via `Cluster::load_with`

pub mod mysql;

use std::sync::Arc;

use crate::config::schema::{NodeConfig, PoolOptions};
use crate::error::{ClusterError, Result};
use crate::pool::ConnectionPool;
use crate::sql::Value;

/// One backend binding: pool construction plus dialect quoting.
pub trait Driver: Send + Sync {
    /// Name this binding mounts under.
    fn name(&self) -> &'static str;

    /// Open a pool for one node. Construction is eager so that a bad node
    /// configuration surfaces at `add` time rather than on first use.
    fn open_pool(&self, node: &NodeConfig, defaults: &PoolOptions) -> Result<Arc<ConnectionPool>>;

    /// Quote a literal value.
    fn escape(&self, value: &Value) -> String;

    /// Quote an identifier (table, column, schema name).
    fn escape_identifier(&self, name: &str) -> String;
}

/// Resolve a driver name to its built-in binding.
pub fn resolve(name: &str) -> Result<Arc<dyn Driver>> {
    match name {
        "mysql" => Ok(Arc::new(mysql::MysqlDriver)),
        other => Err(ClusterError::UnsupportedDriver(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_driver() {
        let driver = resolve("mysql").unwrap();
        assert_eq!(driver.name(), "mysql");
    }

    #[test]
    fn test_resolve_unknown_driver() {
        let Err(err) = resolve("postgres") else {
            panic!("expected resolve to fail for unknown driver");
        };
        assert!(matches!(err, ClusterError::UnsupportedDriver(name) if name == "postgres"));
    }
}
