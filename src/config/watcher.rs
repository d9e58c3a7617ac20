//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::cluster::Cluster;
use crate::config::loader::load_config;
use crate::config::schema::ClusterConfig;

/// Watches a cluster config file and ships re-parsed configs over a channel.
///
/// A config that fails to parse or validate is logged and dropped; the
/// cluster keeps its current topology.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<ClusterConfig>,
}

impl ConfigWatcher {
    /// Create a watcher for `path`.
    ///
    /// Returns the watcher and the receiver for configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<ClusterConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file.
    ///
    /// The returned [`RecommendedWatcher`] must be kept alive for events to
    /// keep flowing.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!(path = ?path, "config change detected, reloading");
                        match load_config(&path) {
                            Ok(config) => {
                                let _ = tx.send(config);
                            }
                            Err(e) => {
                                tracing::error!(
                                    "config reload rejected: {e}. Keeping current topology."
                                );
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("watch error: {e:?}"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "config watcher started");
        Ok(watcher)
    }
}

/// Drive a cluster from a stream of reloaded configs.
///
/// Applies each received config as a membership diff until the sending
/// watcher is dropped. Intended to be spawned as a background task.
pub async fn apply_updates(cluster: &Cluster, mut updates: mpsc::UnboundedReceiver<ClusterConfig>) {
    while let Some(config) = updates.recv().await {
        if let Err(e) = cluster.apply_config(&config) {
            tracing::error!("failed to apply reloaded config: {e}");
        }
    }
}
