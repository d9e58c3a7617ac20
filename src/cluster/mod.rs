//! The cluster facade.
//!
//! # Responsibilities
//! - Gate every operation on the load/unload lifecycle
//! - Compose topology, selection, pooling, and health into `get`
//! - Own the subscriber registry for eviction notifications
//! - Tear down pools on unload/end, bounded by the drain timeout
//!
//! # Design Decisions
//! - Loaded state is swapped atomically; `get` never takes the transition lock
//! - `unload` is idempotent, `end` insists on a loaded cluster
//! - Drains triggered by remove/eviction run in background tasks;
//!   unload/end await them

pub mod events;

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use futures_util::future::join_all;
use tokio::sync::{mpsc, Mutex};

use crate::config::schema::{ClusterConfig, EvictionConfig, NodeConfig, PoolOptions};
use crate::driver::{self, Driver};
use crate::error::{ClusterError, Result};
use crate::health::HealthTracker;
use crate::pool::PooledConnection;
use crate::selector::{Selectors, Strategy};
use crate::sql::{self, Value};
use crate::topology::{NodeEntry, Pattern, Registry};

use events::{ClusterEvent, EventSink};

/// A managed set of named backend connection pools.
///
/// Starts unloaded. `load` mounts a driver binding and enables the
/// topology operations; `unload`/`end` drain every pool and return the
/// cluster to the unloaded state.
pub struct Cluster {
    /// Present exactly while the cluster is loaded.
    inner: ArcSwapOption<Inner>,
    /// Serializes load/unload/end transitions.
    transition: Mutex<()>,
    /// Outlives load/unload cycles so subscriptions persist across them.
    events: EventSink,
    eviction: EvictionConfig,
    pool_defaults: PoolOptions,
}

/// Everything that exists only while loaded.
struct Inner {
    driver: Arc<dyn Driver>,
    registry: Arc<Registry>,
    selectors: Selectors,
    tracker: HealthTracker,
}

impl Cluster {
    /// A cluster with default eviction and pool settings.
    pub fn new() -> Self {
        Self::with_options(EvictionConfig::default(), PoolOptions::default())
    }

    /// A cluster with explicit eviction and pool settings.
    pub fn with_options(eviction: EvictionConfig, pool_defaults: PoolOptions) -> Self {
        Self {
            inner: ArcSwapOption::from(None),
            transition: Mutex::new(()),
            events: EventSink::new(),
            eviction,
            pool_defaults,
        }
    }

    /// Build a loaded cluster from a validated configuration: mounts the
    /// configured driver and registers every configured node, failing on
    /// the first error so misconfiguration surfaces at startup.
    pub async fn from_config(config: &ClusterConfig) -> Result<Self> {
        let cluster = Self::with_options(config.eviction.clone(), config.pool.clone());
        cluster.load(&config.driver).await?;
        for node in &config.nodes {
            cluster.add(node.clone())?;
        }
        Ok(cluster)
    }

    /// Mount the named driver binding.
    pub async fn load(&self, driver_name: &str) -> Result<()> {
        let _transition = self.transition.lock().await;
        if self.inner.load().is_some() {
            return Err(ClusterError::AlreadyLoaded);
        }
        let driver = driver::resolve(driver_name)?;
        self.install(driver);
        Ok(())
    }

    /// Mount a caller-supplied driver binding.
    pub async fn load_with(&self, driver: Arc<dyn Driver>) -> Result<()> {
        let _transition = self.transition.lock().await;
        if self.inner.load().is_some() {
            return Err(ClusterError::AlreadyLoaded);
        }
        self.install(driver);
        Ok(())
    }

    fn install(&self, driver: Arc<dyn Driver>) {
        let registry = Arc::new(Registry::new());
        let tracker = HealthTracker::new(
            self.eviction.threshold,
            self.pool_defaults.drain_timeout(),
            Arc::clone(&registry),
            self.events.clone(),
        );
        tracing::info!(driver = driver.name(), "cluster loaded");
        self.inner.store(Some(Arc::new(Inner {
            driver,
            registry,
            selectors: Selectors::new(),
            tracker,
        })));
    }

    /// Unmount the driver, draining every registered pool first.
    /// A no-op when the cluster is already unloaded.
    pub async fn unload(&self) -> Result<()> {
        let _transition = self.transition.lock().await;
        let Some(inner) = self.inner.swap(None) else {
            return Ok(());
        };
        self.teardown(&inner).await;
        tracing::info!("cluster unloaded");
        Ok(())
    }

    /// Drain and purge every entry, returning the cluster to the unloaded
    /// state. Unlike [`unload`](Self::unload), calling this on an
    /// unloaded cluster is an error.
    pub async fn end(&self) -> Result<()> {
        let _transition = self.transition.lock().await;
        let Some(inner) = self.inner.swap(None) else {
            return Err(ClusterError::NotLoaded);
        };
        self.teardown(&inner).await;
        tracing::info!("cluster ended");
        Ok(())
    }

    /// Register a backend node. Its pool is constructed eagerly; a
    /// rejected node configuration fails here, not on first `get`.
    pub fn add(&self, config: NodeConfig) -> Result<()> {
        let inner = self.inner()?;
        let pool = inner.driver.open_pool(&config, &self.pool_defaults)?;
        let id = config.id.clone();
        inner.registry.insert(Arc::new(NodeEntry::new(config, pool)))?;
        tracing::info!(node = %id, "node added");
        Ok(())
    }

    /// Remove every node matching `target`, draining their pools in the
    /// background. The matched entries leave selection immediately, before
    /// their drains complete.
    pub fn remove(&self, target: &str) -> Result<()> {
        let inner = self.inner()?;
        let pattern = Pattern::parse(target);
        let matched = inner.registry.snapshot().matching(&pattern);
        if matched.is_empty() {
            return Err(ClusterError::NoMatchingNode(target.to_string()));
        }

        let mut transitioned = false;
        for entry in matched {
            if entry.begin_remove() {
                transitioned = true;
                tracing::info!(node = %entry.id(), "removing node");
                tokio::spawn(drain_and_purge(
                    Arc::clone(&inner.registry),
                    entry,
                    self.pool_defaults.drain_timeout(),
                    self.events.clone(),
                ));
            }
        }
        if transitioned {
            inner.registry.bump_revision();
        }
        Ok(())
    }

    /// Acquire a connection from one node matching `target`, chosen by
    /// `strategy`. An acquisition failure is returned to the caller and
    /// simultaneously recorded against the node's health.
    pub async fn get(&self, target: &str, strategy: Strategy) -> Result<PooledConnection> {
        let inner = self.inner()?;
        let pattern = Pattern::parse(target);
        let snapshot = inner.registry.snapshot();
        let matched = snapshot.matching(&pattern);

        let Some(node) = inner
            .selectors
            .get(strategy)
            .pick(target, snapshot.revision(), &matched)
        else {
            return Err(ClusterError::NoMatchingNode(target.to_string()));
        };

        tracing::debug!(node = %node.id(), pattern = %target, ?strategy, "node selected");
        match node.pool().acquire().await {
            Ok(conn) => {
                inner.tracker.record_success(&node);
                Ok(conn)
            }
            Err(source) => {
                inner.tracker.record_failure(&node);
                Err(ClusterError::AcquisitionFailed {
                    node: node.id().to_string(),
                    source,
                })
            }
        }
    }

    /// Subscribe to topology notifications. Subscriptions survive
    /// unload/load cycles.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<ClusterEvent> {
        self.events.subscribe()
    }

    /// Diff a reloaded configuration against the current membership:
    /// configured ids not yet registered are added, registered ids absent
    /// from the configuration are removed. Settings changes for an id that
    /// stays are not applied; remove and re-add the node for those.
    pub fn apply_config(&self, config: &ClusterConfig) -> Result<()> {
        let inner = self.inner()?;
        let snapshot = inner.registry.snapshot();

        for entry in snapshot.nodes() {
            if entry.is_active() && !config.nodes.iter().any(|n| n.id == entry.id()) {
                self.remove(entry.id())?;
            }
        }
        for node in &config.nodes {
            if !snapshot.nodes().iter().any(|e| e.id() == node.id) {
                self.add(node.clone())?;
            }
        }
        Ok(())
    }

    /// Quote a literal in the loaded driver's dialect.
    pub fn escape(&self, value: &Value) -> Result<String> {
        Ok(self.inner()?.driver.escape(value))
    }

    /// Quote an identifier in the loaded driver's dialect.
    pub fn escape_identifier(&self, name: &str) -> Result<String> {
        Ok(self.inner()?.driver.escape_identifier(name))
    }

    /// Substitute `?`/`??` placeholders in a query template.
    pub fn format(&self, template: &str, values: &[Value]) -> Result<String> {
        let inner = self.inner()?;
        Ok(sql::format(inner.driver.as_ref(), template, values))
    }

    fn inner(&self) -> Result<Arc<Inner>> {
        self.inner.load_full().ok_or(ClusterError::NotLoaded)
    }

    async fn teardown(&self, inner: &Arc<Inner>) {
        let snapshot = inner.registry.snapshot();
        for entry in snapshot.nodes() {
            // entries already Removing keep their in-flight drain; the
            // second drain below settles immediately
            entry.begin_remove();
        }
        inner.registry.bump_revision();

        let drains = snapshot.nodes().iter().map(|entry| {
            drain_and_purge(
                Arc::clone(&inner.registry),
                Arc::clone(entry),
                self.pool_defaults.drain_timeout(),
                self.events.clone(),
            )
        });
        join_all(drains).await;
    }
}

impl Default for Cluster {
    fn default() -> Self {
        Self::new()
    }
}

/// Drain a removed node's pool, then purge the entry so its id becomes
/// available again. A missed drain bound is reported, never fatal.
pub(crate) async fn drain_and_purge(
    registry: Arc<Registry>,
    node: Arc<NodeEntry>,
    timeout: Duration,
    events: EventSink,
) {
    if let Err(e) = node.pool().drain(timeout).await {
        tracing::warn!(node = %node.id(), "{e}");
        events.emit(ClusterEvent::DrainTimedOut {
            id: node.id().to_string(),
        });
    }
    node.mark_removed();
    registry.purge(node.id());
    tracing::info!(node = %node.id(), "node purged");
}
