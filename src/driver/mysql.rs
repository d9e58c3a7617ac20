//! MySQL-dialect binding.
//!
//! Pools dial plain TCP to the configured address; protocol handshake and
//! query execution live with the consumer of the connection. Quoting
//! follows MySQL conventions: single-quoted backslash-escaped literals,
//! backtick identifiers.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use tokio::net::TcpStream;

use crate::config::schema::{NodeConfig, PoolOptions};
use crate::error::{AcquireError, ClusterError, Result};
use crate::pool::{Connection, ConnectionPool, Connector};
use crate::sql::Value;

use super::Driver;

pub struct MysqlDriver;

impl Driver for MysqlDriver {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn open_pool(&self, node: &NodeConfig, defaults: &PoolOptions) -> Result<Arc<ConnectionPool>> {
        if node.host.is_empty() {
            return Err(ClusterError::InvalidConfig {
                node: node.id.clone(),
                reason: "host must not be empty".to_string(),
            });
        }
        if node.port == 0 {
            return Err(ClusterError::InvalidConfig {
                node: node.id.clone(),
                reason: "port must not be 0".to_string(),
            });
        }

        let connector = Arc::new(TcpConnector {
            addr: node.address(),
        });
        let max_connections = node.max_connections.unwrap_or(defaults.max_connections);

        Ok(ConnectionPool::new(
            &node.id,
            connector,
            max_connections,
            defaults.acquire_timeout(),
        ))
    }

    fn escape(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::UInt(u) => u.to_string(),
            Value::Double(d) => d.to_string(),
            Value::Text(s) => escape_str(s),
            Value::Bytes(bytes) => {
                let mut out = String::with_capacity(bytes.len() * 2 + 3);
                out.push_str("X'");
                for b in bytes {
                    out.push_str(&format!("{b:02x}"));
                }
                out.push('\'');
                out
            }
        }
    }

    fn escape_identifier(&self, name: &str) -> String {
        // qualified names quote each segment: db.table -> `db`.`table`
        name.split('.')
            .map(|part| format!("`{}`", part.replace('`', "``")))
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Wrap a string literal in single quotes, backslash-escaping the
/// characters MySQL treats specially.
fn escape_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x1a' => out.push_str("\\Z"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

struct TcpConnector {
    addr: String,
}

impl Connector for TcpConnector {
    fn connect(&self) -> BoxFuture<'static, std::result::Result<Box<dyn Connection>, AcquireError>> {
        let addr = self.addr.clone();
        Box::pin(async move {
            let stream = TcpStream::connect(&addr).await?;
            Ok(Box::new(TcpConnection { stream }) as Box<dyn Connection>)
        })
    }
}

#[derive(Debug)]
struct TcpConnection {
    stream: TcpStream,
}

impl Connection for TcpConnection {
    fn is_open(&self) -> bool {
        self.stream.peer_addr().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_literals() {
        let driver = MysqlDriver;
        assert_eq!(driver.escape(&Value::Null), "NULL");
        assert_eq!(driver.escape(&Value::Bool(true)), "true");
        assert_eq!(driver.escape(&Value::Int(-3)), "-3");
        assert_eq!(driver.escape(&"plain".into()), "'plain'");
        assert_eq!(driver.escape(&"o'brien".into()), "'o\\'brien'");
        assert_eq!(driver.escape(&"a\\b\n".into()), "'a\\\\b\\n'");
        assert_eq!(driver.escape(&Value::Bytes(vec![0xde, 0xad])), "X'dead'");
    }

    #[test]
    fn test_escape_identifier() {
        let driver = MysqlDriver;
        assert_eq!(driver.escape_identifier("users"), "`users`");
        assert_eq!(driver.escape_identifier("app.users"), "`app`.`users`");
        assert_eq!(driver.escape_identifier("odd`name"), "`odd``name`");
    }

    #[test]
    fn test_open_pool_rejects_bad_config() {
        let driver = MysqlDriver;
        let defaults = PoolOptions::default();

        let node = NodeConfig::new("n1", "");
        assert!(matches!(
            driver.open_pool(&node, &defaults),
            Err(ClusterError::InvalidConfig { .. })
        ));

        let mut node = NodeConfig::new("n1", "10.0.0.1");
        node.port = 0;
        assert!(matches!(
            driver.open_pool(&node, &defaults),
            Err(ClusterError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_open_pool_applies_limits() {
        let driver = MysqlDriver;
        let defaults = PoolOptions::default();

        let mut node = NodeConfig::new("replica1", "10.0.0.1");
        node.max_connections = Some(2);
        let pool = driver.open_pool(&node, &defaults).unwrap();
        assert_eq!(pool.node(), "replica1");
    }
}
