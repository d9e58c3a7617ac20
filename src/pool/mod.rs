//! Per-node connection pooling.
//!
//! # Responsibilities
//! - Bound concurrent connections per node (semaphore)
//! - Reuse released connections (idle list)
//! - Bound each acquisition wait, propagating cancellation
//! - Drain gracefully: refuse new acquires, wait for outstanding to return
//!
//! # Design Decisions
//! - A RAII guard releases connections; callers cannot forget to release
//! - Acquire-side waits are tokio-native and cancellation-safe
//! - Draining never revokes connections already handed to a caller

pub mod connection;

pub use connection::{Connection, Connector};

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{Notify, OwnedSemaphorePermit, Semaphore};

use crate::error::{AcquireError, ClusterError, Result};

/// A bounded pool of reusable connections to a single node.
pub struct ConnectionPool {
    /// Node id, carried for logs and errors.
    node: String,
    connector: Arc<dyn Connector>,
    /// Caps total connections (idle + outstanding).
    limit: Arc<Semaphore>,
    idle: Mutex<Vec<Box<dyn Connection>>>,
    /// Connections currently held by callers.
    outstanding: AtomicUsize,
    draining: AtomicBool,
    drained: Notify,
    acquire_timeout: Duration,
}

impl ConnectionPool {
    pub fn new(
        node: impl Into<String>,
        connector: Arc<dyn Connector>,
        max_connections: usize,
        acquire_timeout: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            node: node.into(),
            connector,
            limit: Arc::new(Semaphore::new(max_connections)),
            idle: Mutex::new(Vec::new()),
            outstanding: AtomicUsize::new(0),
            draining: AtomicBool::new(false),
            drained: Notify::new(),
            acquire_timeout,
        })
    }

    /// Acquire a connection, waiting at most the configured bound for a
    /// free slot. Reuses an idle connection when one is still open,
    /// otherwise dials a new one through the connector.
    pub async fn acquire(self: &Arc<Self>) -> std::result::Result<PooledConnection, AcquireError> {
        if self.draining.load(Ordering::Acquire) {
            return Err(AcquireError::Draining);
        }

        let permit =
            match tokio::time::timeout(self.acquire_timeout, self.limit.clone().acquire_owned())
                .await
            {
                Ok(Ok(permit)) => permit,
                // drain() closes the semaphore to wake queued waiters
                Ok(Err(_)) => return Err(AcquireError::Draining),
                Err(_) => return Err(AcquireError::Timeout),
            };

        if self.draining.load(Ordering::Acquire) {
            return Err(AcquireError::Draining);
        }

        let mut reused = None;
        while let Some(candidate) = self.idle.lock().unwrap().pop() {
            if candidate.is_open() {
                reused = Some(candidate);
                break;
            }
            // stale idle connection, discard and keep looking
        }

        let conn = match reused {
            Some(conn) => conn,
            None => self.connector.connect().await?,
        };

        self.outstanding.fetch_add(1, Ordering::AcqRel);
        tracing::trace!(node = %self.node, "connection acquired");

        Ok(PooledConnection {
            pool: Arc::clone(self),
            conn: Some(conn),
            _permit: permit,
        })
    }

    /// Stop handing out connections and wait for outstanding ones to come
    /// back, up to `timeout`. Idle connections are dropped either way.
    pub async fn drain(&self, timeout: Duration) -> Result<()> {
        self.draining.store(true, Ordering::Release);
        self.limit.close();

        let wait = async {
            loop {
                if self.outstanding.load(Ordering::Acquire) == 0 {
                    break;
                }
                let mut notified = std::pin::pin!(self.drained.notified());
                notified.as_mut().enable();
                // re-check: the last guard may have dropped before the
                // notification interest above was registered
                if self.outstanding.load(Ordering::Acquire) == 0 {
                    break;
                }
                notified.await;
            }
        };
        let timed_out = tokio::time::timeout(timeout, wait).await.is_err();

        self.idle.lock().unwrap().clear();

        if timed_out {
            Err(ClusterError::DrainTimeout(self.node.clone()))
        } else {
            tracing::debug!(node = %self.node, "pool drained");
            Ok(())
        }
    }

    /// Node id this pool serves.
    pub fn node(&self) -> &str {
        &self.node
    }

    /// Connections currently held by callers.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// Connections sitting idle in the pool.
    pub fn idle_count(&self) -> usize {
        self.idle.lock().unwrap().len()
    }

    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("node", &self.node)
            .field("outstanding", &self.outstanding())
            .field("draining", &self.is_draining())
            .finish()
    }
}

/// A connection checked out of a pool.
///
/// Dropping the guard releases the connection: back into the idle list if
/// it is still open and the pool is not draining, discarded otherwise.
pub struct PooledConnection {
    pool: Arc<ConnectionPool>,
    conn: Option<Box<dyn Connection>>,
    _permit: OwnedSemaphorePermit,
}

impl PooledConnection {
    /// Id of the node this connection belongs to.
    pub fn node(&self) -> &str {
        self.pool.node()
    }

    /// The underlying connection.
    pub fn connection(&self) -> &dyn Connection {
        // conn is only None after drop
        self.conn.as_deref().unwrap()
    }
}

impl std::fmt::Debug for PooledConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledConnection")
            .field("node", &self.node())
            .finish()
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            if conn.is_open() && !self.pool.is_draining() {
                self.pool.idle.lock().unwrap().push(conn);
            }
        }
        if self.pool.outstanding.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.pool.drained.notify_waiters();
        }
        tracing::trace!(node = %self.pool.node, "connection released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AcquireError;
    use futures_util::future::BoxFuture;

    #[derive(Debug)]
    struct StubConnection {
        open: bool,
    }

    impl Connection for StubConnection {
        fn is_open(&self) -> bool {
            self.open
        }
    }

    struct StubConnector;

    impl Connector for StubConnector {
        fn connect(
            &self,
        ) -> BoxFuture<'static, std::result::Result<Box<dyn Connection>, AcquireError>> {
            Box::pin(async { Ok(Box::new(StubConnection { open: true }) as Box<dyn Connection>) })
        }
    }

    fn pool(max: usize) -> Arc<ConnectionPool> {
        ConnectionPool::new("n1", Arc::new(StubConnector), max, Duration::from_millis(50))
    }

    #[tokio::test]
    async fn test_acquire_release_accounting() {
        let pool = pool(2);

        let a = pool.acquire().await.unwrap();
        let b = pool.acquire().await.unwrap();
        assert_eq!(pool.outstanding(), 2);
        assert_eq!(a.node(), "n1");
        assert!(a.connection().is_open());

        drop(a);
        assert_eq!(pool.outstanding(), 1);
        assert_eq!(pool.idle_count(), 1);

        // released connection is reused, not re-dialed
        let c = pool.acquire().await.unwrap();
        assert_eq!(pool.idle_count(), 0);

        drop(b);
        drop(c);
        assert_eq!(pool.outstanding(), 0);
        assert_eq!(pool.idle_count(), 2);
    }

    #[tokio::test]
    async fn test_acquire_times_out_when_exhausted() {
        let pool = pool(1);

        let held = pool.acquire().await.unwrap();
        let err = pool.acquire().await.unwrap_err();
        assert!(matches!(err, AcquireError::Timeout));

        drop(held);
        assert!(pool.acquire().await.is_ok());
    }

    #[tokio::test]
    async fn test_drain_waits_for_outstanding() {
        let pool = pool(2);
        let held = pool.acquire().await.unwrap();

        let drainer = {
            let pool = Arc::clone(&pool);
            tokio::spawn(async move { pool.drain(Duration::from_secs(5)).await })
        };

        // give the drain task a chance to start waiting
        tokio::task::yield_now().await;
        assert!(pool.is_draining());
        assert!(matches!(
            pool.acquire().await.unwrap_err(),
            AcquireError::Draining
        ));

        drop(held);
        drainer.await.unwrap().unwrap();
        assert_eq!(pool.outstanding(), 0);
        assert_eq!(pool.idle_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_timeout_reported() {
        let pool = pool(1);
        let _held = pool.acquire().await.unwrap();

        let err = pool.drain(Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, ClusterError::DrainTimeout(node) if node == "n1"));
    }

    #[tokio::test]
    async fn test_stale_idle_connection_discarded() {
        struct ClosedConnector;
        impl Connector for ClosedConnector {
            fn connect(
                &self,
            ) -> BoxFuture<'static, std::result::Result<Box<dyn Connection>, AcquireError>>
            {
                Box::pin(async {
                    Ok(Box::new(StubConnection { open: false }) as Box<dyn Connection>)
                })
            }
        }

        let pool = ConnectionPool::new(
            "n1",
            Arc::new(ClosedConnector),
            1,
            Duration::from_millis(50),
        );

        let conn = pool.acquire().await.unwrap();
        drop(conn);
        // the connection came back closed, so it is not kept
        assert_eq!(pool.idle_count(), 0);
    }
}
