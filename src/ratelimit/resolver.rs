//! Per-key rate limit configuration resolution.

use std::sync::Arc;

use tracing::debug;

use crate::error::{GateError, Result};
use crate::store::CounterStore;

/// Key prefix for config hashes in the counting store.
const CONFIG_PREFIX: &str = "rate_config:";

/// Hash fields holding the per-key configuration, in lookup order.
const CONFIG_FIELDS: [&str; 3] = ["maxRequests", "windowInSec", "strategy"];

/// Default maximum requests per window.
const DEFAULT_MAX_REQUESTS: u32 = 5;
/// Default window length in seconds.
const DEFAULT_WINDOW_SECS: u64 = 60;
/// Default strategy name.
const DEFAULT_STRATEGY: &str = "FIXED";

/// Effective rate limit configuration for one key.
///
/// Constructed fresh on every lookup; the core does not cache these.
/// Field values are validated by parse-success only, so an out-of-range
/// value such as `maxRequests=0` passes through uncorrected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in one window
    pub max_requests: u32,
    /// Window length in seconds
    pub window_secs: u64,
    /// Configured strategy name (resolved by [`StrategyKind::from_name`])
    ///
    /// [`StrategyKind::from_name`]: super::StrategyKind::from_name
    pub strategy: String,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_MAX_REQUESTS,
            window_secs: DEFAULT_WINDOW_SECS,
            strategy: DEFAULT_STRATEGY.to_string(),
        }
    }
}

/// Resolves the effective configuration for a rate limit key.
///
/// Resolution is a total function: it consults the store, defaults each
/// absent field independently, and degrades to the complete default triple
/// on any lookup or parse failure. Config resolution must never become a
/// source of request failure.
pub struct ConfigResolver {
    store: Arc<dyn CounterStore>,
}

impl ConfigResolver {
    /// Create a new resolver backed by the given store.
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self { store }
    }

    /// Get the effective configuration for `key`. Never fails.
    pub async fn get_config(&self, key: &str) -> RateLimitConfig {
        match self.lookup(key).await {
            Ok(config) => config,
            Err(e) => {
                debug!(
                    key = %key,
                    error = %e,
                    "Config lookup failed, using full defaults"
                );
                RateLimitConfig::default()
            }
        }
    }

    /// Fallible inner lookup. A parse failure on any field is an error for
    /// the whole lookup, so partial values are never mixed with partial
    /// defaults.
    async fn lookup(&self, key: &str) -> Result<RateLimitConfig> {
        let store_key = format!("{CONFIG_PREFIX}{key}");
        let mut values = self
            .store
            .hash_fields(&store_key, &CONFIG_FIELDS)
            .await?
            .into_iter();

        let max_raw = values.next().flatten();
        let window_raw = values.next().flatten();
        let strategy_raw = values.next().flatten();

        let max_requests = match max_raw {
            Some(raw) => raw.parse().map_err(|_| {
                GateError::Config(format!("invalid maxRequests value: {raw:?}"))
            })?,
            None => DEFAULT_MAX_REQUESTS,
        };

        let window_secs = match window_raw {
            Some(raw) => raw.parse().map_err(|_| {
                GateError::Config(format!("invalid windowInSec value: {raw:?}"))
            })?,
            None => DEFAULT_WINDOW_SECS,
        };

        let strategy = strategy_raw.unwrap_or_else(|| DEFAULT_STRATEGY.to_string());

        Ok(RateLimitConfig {
            max_requests,
            window_secs,
            strategy,
        })
    }
}
