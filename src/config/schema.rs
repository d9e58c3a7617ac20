//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for a pool cluster.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Backend driver binding to mount at load time.
    pub driver: String,

    /// Automatic eviction settings.
    pub eviction: EvictionConfig,

    /// Pool defaults applied to every node unless overridden.
    pub pool: PoolOptions,

    /// Backend node definitions.
    pub nodes: Vec<NodeConfig>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            driver: "mysql".to_string(),
            eviction: EvictionConfig::default(),
            pool: PoolOptions::default(),
            nodes: Vec::new(),
        }
    }
}

/// Failure-driven eviction settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EvictionConfig {
    /// Consecutive acquisition failures before a node is evicted.
    /// Must be at least 1; a zero threshold would evict on the first failure.
    pub threshold: u32,
}

impl Default for EvictionConfig {
    fn default() -> Self {
        Self { threshold: 5 }
    }
}

/// Connection-pool sizing and timing defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolOptions {
    /// Maximum concurrent connections per node.
    pub max_connections: usize,

    /// Bound on a single acquisition wait, in seconds.
    pub acquire_timeout_secs: u64,

    /// Bound on draining a removed node's pool, in seconds.
    pub drain_timeout_secs: u64,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout_secs: 10,
            drain_timeout_secs: 30,
        }
    }
}

impl PoolOptions {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_secs)
    }
}

/// One backend node.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NodeConfig {
    /// Unique node identifier, also the pattern-matching subject.
    pub id: String,

    /// Backend host name or address.
    pub host: String,

    /// Backend port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// User to authenticate as.
    #[serde(default)]
    pub user: String,

    /// Password to authenticate with.
    #[serde(default)]
    pub password: String,

    /// Default database/schema to select.
    #[serde(default)]
    pub database: Option<String>,

    /// Per-node override of the pool connection limit.
    #[serde(default)]
    pub max_connections: Option<usize>,
}

fn default_port() -> u16 {
    3306
}

impl NodeConfig {
    /// Create a node definition with defaults for everything but id and host.
    pub fn new(id: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            host: host.into(),
            port: default_port(),
            user: String::new(),
            password: String::new(),
            database: None,
            max_connections: None,
        }
    }

    /// "host:port" dial address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
