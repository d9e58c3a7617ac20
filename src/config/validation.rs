//! Configuration validation.
//!
//! Semantic checks over a parsed [`ClusterConfig`]; serde has already
//! handled syntax. All violations are collected and returned together so an
//! operator fixes a config file in one pass, not one error at a time.

use std::collections::HashSet;
use thiserror::Error;

use crate::config::schema::ClusterConfig;

/// One semantic violation in a cluster configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("node at index {0} has an empty id")]
    EmptyNodeId(usize),

    #[error("duplicate node id: {0}")]
    DuplicateNodeId(String),

    #[error("node {0} has an empty host")]
    EmptyHost(String),

    #[error("node {0} has port 0")]
    ZeroPort(String),

    #[error("eviction threshold must be at least 1")]
    ZeroEvictionThreshold,

    #[error("pool connection limit must be at least 1 (node: {0})")]
    ZeroConnectionLimit(String),

    #[error("acquire timeout must be at least 1 second")]
    ZeroAcquireTimeout,

    #[error("drain timeout must be at least 1 second")]
    ZeroDrainTimeout,
}

/// Validate a parsed configuration, returning every violation found.
pub fn validate_config(config: &ClusterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.eviction.threshold == 0 {
        errors.push(ValidationError::ZeroEvictionThreshold);
    }
    if config.pool.acquire_timeout_secs == 0 {
        errors.push(ValidationError::ZeroAcquireTimeout);
    }
    if config.pool.drain_timeout_secs == 0 {
        errors.push(ValidationError::ZeroDrainTimeout);
    }
    if config.pool.max_connections == 0 {
        errors.push(ValidationError::ZeroConnectionLimit("<defaults>".to_string()));
    }

    let mut seen = HashSet::new();
    for (index, node) in config.nodes.iter().enumerate() {
        if node.id.is_empty() {
            errors.push(ValidationError::EmptyNodeId(index));
            continue;
        }
        if !seen.insert(node.id.as_str()) {
            errors.push(ValidationError::DuplicateNodeId(node.id.clone()));
        }
        if node.host.is_empty() {
            errors.push(ValidationError::EmptyHost(node.id.clone()));
        }
        if node.port == 0 {
            errors.push(ValidationError::ZeroPort(node.id.clone()));
        }
        if node.max_connections == Some(0) {
            errors.push(ValidationError::ZeroConnectionLimit(node.id.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::NodeConfig;

    #[test]
    fn test_valid_config_passes() {
        let mut config = ClusterConfig::default();
        config.nodes.push(NodeConfig::new("replica1", "10.0.0.1"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ClusterConfig::default();
        config.eviction.threshold = 0;
        config.nodes.push(NodeConfig::new("a", ""));
        config.nodes.push(NodeConfig::new("a", "10.0.0.2"));

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::ZeroEvictionThreshold));
        assert!(errors.contains(&ValidationError::EmptyHost("a".to_string())));
        assert!(errors.contains(&ValidationError::DuplicateNodeId("a".to_string())));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_zero_port_rejected() {
        let mut config = ClusterConfig::default();
        let mut node = NodeConfig::new("replica1", "10.0.0.1");
        node.port = 0;
        config.nodes.push(node);

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::ZeroPort("replica1".to_string())]);
    }
}
