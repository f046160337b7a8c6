//! Distributed fixed-window counting strategy.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, trace};

use crate::error::Result;
use crate::store::CounterStore;

use super::resolver::RateLimitConfig;
use super::strategy::RateLimitStrategy;

/// Key prefix for window counters in the counting store.
const COUNTER_PREFIX: &str = "rl:";

/// Fixed-window strategy backed by the shared counting store.
///
/// All instances increment the same counter, so the quota is enforced
/// globally. The window resets through store-side expiry: the first
/// increment of a window creates the counter and sets its TTL to the window
/// length, and a fresh increment after expiry starts the next window at 1.
///
/// If the process dies between the first increment and the expiry call, the
/// counter persists without a TTL and that key's window never resets until
/// the counter is removed out of band. The two-step form is kept because it
/// matches the store interface's three primitive operations.
pub struct FixedWindowStrategy {
    store: Arc<dyn CounterStore>,
}

impl FixedWindowStrategy {
    /// Create a new fixed-window strategy backed by the given store.
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RateLimitStrategy for FixedWindowStrategy {
    async fn allow(&self, key: &str, config: &RateLimitConfig) -> Result<bool> {
        let counter_key = format!("{COUNTER_PREFIX}{key}");

        let count = self.store.increment(&counter_key).await?;
        if count == 1 {
            self.store.expire(&counter_key, config.window_secs).await?;
        }

        trace!(
            key = %key,
            count = count,
            limit = config.max_requests,
            "Checked fixed window counter"
        );

        let within_limit = count <= i64::from(config.max_requests);
        if !within_limit {
            debug!(
                key = %key,
                count = count,
                limit = config.max_requests,
                "Fixed window limit exceeded"
            );
        }

        Ok(within_limit)
    }
}
