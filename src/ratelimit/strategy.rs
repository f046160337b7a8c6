//! Strategy trait and name-based selection.

use async_trait::async_trait;

use crate::error::Result;

use super::resolver::RateLimitConfig;

/// Trait for rate limiting strategy implementations.
///
/// This trait abstracts over the distributed [`FixedWindowStrategy`] and the
/// process-local [`LocalFallbackStrategy`] so the decision engine can work
/// with either.
///
/// [`FixedWindowStrategy`]: super::FixedWindowStrategy
/// [`LocalFallbackStrategy`]: super::LocalFallbackStrategy
#[async_trait]
pub trait RateLimitStrategy: Send + Sync {
    /// Evaluate whether a request under `key` is within the configured quota.
    ///
    /// Every call counts against the quota, including calls that end up
    /// denied. Errors from the counting substrate propagate to the caller;
    /// strategies perform no fallback of their own.
    async fn allow(&self, key: &str, config: &RateLimitConfig) -> Result<bool>;
}

/// The closed set of known strategies.
///
/// Selection by name never fails: anything that is not a (case-insensitive)
/// match for `"FIXED"` resolves to the local fallback. An unknown name is a
/// safe default, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// Distributed fixed-window counting in the shared store
    Fixed,
    /// Process-local per-key buckets
    LocalFallback,
}

impl StrategyKind {
    /// Resolve a configured strategy name to a strategy kind.
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("FIXED") {
            StrategyKind::Fixed
        } else {
            StrategyKind::LocalFallback
        }
    }
}
