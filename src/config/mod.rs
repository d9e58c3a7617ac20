//! Cluster configuration.
//!
//! # Data Flow
//! ```text
//! TOML file
//!     → loader.rs (read, parse)
//!     → validation.rs (semantic checks, all errors collected)
//!     → ClusterConfig accepted
//!
//! Hot reload (watcher.rs):
//!     file modified → re-parse → send over channel
//!     → Cluster::apply_config diffs node membership
//! ```
//!
//! # Design Decisions
//! - Serde handles syntax, validation.rs handles semantics
//! - Defaults live on the schema types, not scattered at call sites
//! - A failed reload keeps the current topology

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;
