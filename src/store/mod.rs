//! Counting store abstraction.
//!
//! The decision core never talks to Redis directly; it depends on the
//! [`CounterStore`] capability so strategies and the config resolver can be
//! exercised against a mock in tests.

mod redis;

#[cfg(test)]
pub(crate) mod mock;

pub use self::redis::RedisStore;

use async_trait::async_trait;

use crate::error::Result;

/// Capability trait for the shared counting store.
///
/// The store must guarantee that [`increment`](CounterStore::increment) is
/// atomic: concurrent increments on the same key are never lost or
/// double-applied. Every call is bounded by the store client's own timeout;
/// a timeout surfaces as an error, never as a hang.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically increment the counter at `key` and return the
    /// post-increment value. Creates the counter at 1 if it does not exist.
    async fn increment(&self, key: &str) -> Result<i64>;

    /// Set the expiry of `key` to `seconds` from now.
    async fn expire(&self, key: &str, seconds: u64) -> Result<()>;

    /// Fetch the named hash fields stored under `key`, in order. Absent
    /// fields (or an absent hash) come back as `None`.
    async fn hash_fields(&self, key: &str, fields: &[&str]) -> Result<Vec<Option<String>>>;
}
