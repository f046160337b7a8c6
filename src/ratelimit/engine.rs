//! Decision engine: the single public operation of the core.

use std::sync::Arc;

use tracing::{trace, warn};

use crate::error::Result;
use crate::metrics::DecisionMetrics;
use crate::store::CounterStore;

use super::fixed_window::FixedWindowStrategy;
use super::local::LocalFallbackStrategy;
use super::resolver::ConfigResolver;
use super::strategy::{RateLimitStrategy, StrategyKind};

/// Orchestrates config resolution, strategy selection, and the allow/deny
/// evaluation for each rate limit key.
///
/// `decide` is the entire public surface of the core and never raises: any
/// failure anywhere in the pipeline fails open. Each decision is a single
/// attempt with no retries, keeping decision latency bounded under degraded
/// conditions.
pub struct DecisionEngine {
    resolver: ConfigResolver,
    fixed: FixedWindowStrategy,
    fallback: LocalFallbackStrategy,
    metrics: DecisionMetrics,
}

impl DecisionEngine {
    /// Create a new engine over the given counting store.
    pub fn new(store: Arc<dyn CounterStore>, metrics: DecisionMetrics) -> Self {
        Self {
            resolver: ConfigResolver::new(store.clone()),
            fixed: FixedWindowStrategy::new(store),
            fallback: LocalFallbackStrategy::new(),
            metrics,
        }
    }

    /// Decide whether the request under `key` is admitted.
    ///
    /// On a completed decision exactly one outcome counter is incremented.
    /// On any pipeline failure the request is admitted and neither counter
    /// moves: fail-open decisions are not real decisions.
    pub async fn decide(&self, key: &str) -> bool {
        match self.try_decide(key).await {
            Ok(allowed) => {
                if allowed {
                    self.metrics.allowed.inc();
                } else {
                    self.metrics.blocked.inc();
                }
                allowed
            }
            Err(e) => {
                warn!(
                    key = %key,
                    error = %e,
                    "Decision pipeline failed, failing open"
                );
                true
            }
        }
    }

    async fn try_decide(&self, key: &str) -> Result<bool> {
        let config = self.resolver.get_config(key).await;

        let strategy: &dyn RateLimitStrategy = match StrategyKind::from_name(&config.strategy) {
            StrategyKind::Fixed => &self.fixed,
            StrategyKind::LocalFallback => &self.fallback,
        };

        trace!(
            key = %key,
            strategy = %config.strategy,
            limit = config.max_requests,
            window_secs = config.window_secs,
            "Evaluating rate limit"
        );

        strategy.allow(key, &config).await
    }

    /// The engine's outcome metrics (exposed for the metrics endpoint).
    pub fn metrics(&self) -> &DecisionMetrics {
        &self.metrics
    }
}
