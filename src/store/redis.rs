//! Redis-backed counting store.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::error::Result;

use super::CounterStore;

/// A [`CounterStore`] backed by a Redis instance.
///
/// Wraps a [`ConnectionManager`], which multiplexes commands over a single
/// reconnecting connection and is cheap to clone per call. Response and
/// connection timeouts are configured on the manager at construction time,
/// which keeps every decision-path store call bounded.
pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    /// Create a new store from an established connection manager.
    pub fn new(connection: ConnectionManager) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl CounterStore for RedisStore {
    async fn increment(&self, key: &str) -> Result<i64> {
        let mut conn = self.connection.clone();
        let count: i64 = conn.incr(key, 1).await?;
        Ok(count)
    }

    async fn expire(&self, key: &str, seconds: u64) -> Result<()> {
        let mut conn = self.connection.clone();
        conn.expire::<_, ()>(key, seconds as i64).await?;
        Ok(())
    }

    async fn hash_fields(&self, key: &str, fields: &[&str]) -> Result<Vec<Option<String>>> {
        let mut conn = self.connection.clone();
        let mut cmd = redis::cmd("HMGET");
        cmd.arg(key);
        for field in fields {
            cmd.arg(*field);
        }
        let values: Vec<Option<String>> = cmd.query_async(&mut conn).await?;
        Ok(values)
    }
}
