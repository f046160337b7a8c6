//! In-memory mock of the counting store for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{GateError, Result};

use super::CounterStore;

/// A scriptable in-memory [`CounterStore`].
///
/// Counters and hashes live in plain maps; `set_failing(true)` makes every
/// subsequent call fail with a store error, simulating a disconnected Redis.
pub(crate) struct MockStore {
    counters: Mutex<HashMap<String, i64>>,
    expiries: Mutex<HashMap<String, u64>>,
    hashes: Mutex<HashMap<String, HashMap<String, String>>>,
    failing: AtomicBool,
}

impl MockStore {
    pub(crate) fn new() -> Self {
        Self {
            counters: Mutex::new(HashMap::new()),
            expiries: Mutex::new(HashMap::new()),
            hashes: Mutex::new(HashMap::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Set a single field of the hash stored under `key`.
    pub(crate) fn set_hash_field(&self, key: &str, field: &str, value: &str) {
        self.hashes
            .lock()
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
    }

    /// Make every subsequent store call fail (or stop failing).
    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Current counter value for `key`, or 0 if the counter does not exist.
    pub(crate) fn count_for(&self, key: &str) -> i64 {
        self.counters.lock().get(key).copied().unwrap_or(0)
    }

    /// The expiry (in seconds) last set on `key`, if any.
    pub(crate) fn expiry_for(&self, key: &str) -> Option<u64> {
        self.expiries.lock().get(key).copied()
    }

    /// Drop the counter for `key`, simulating store-side expiry.
    pub(crate) fn clear_counter(&self, key: &str) {
        self.counters.lock().remove(key);
        self.expiries.lock().remove(key);
    }

    fn check_available(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(GateError::Store(redis::RedisError::from((
                redis::ErrorKind::IoError,
                "mock store offline",
            ))));
        }
        Ok(())
    }
}

#[async_trait]
impl CounterStore for MockStore {
    async fn increment(&self, key: &str) -> Result<i64> {
        self.check_available()?;
        let mut counters = self.counters.lock();
        let count = counters.entry(key.to_string()).or_insert(0);
        *count += 1;
        Ok(*count)
    }

    async fn expire(&self, key: &str, seconds: u64) -> Result<()> {
        self.check_available()?;
        self.expiries.lock().insert(key.to_string(), seconds);
        Ok(())
    }

    async fn hash_fields(&self, key: &str, fields: &[&str]) -> Result<Vec<Option<String>>> {
        self.check_available()?;
        let hashes = self.hashes.lock();
        let hash = hashes.get(key);
        Ok(fields
            .iter()
            .map(|field| hash.and_then(|h| h.get(*field).cloned()))
            .collect())
    }
}
