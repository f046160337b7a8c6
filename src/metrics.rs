//! Decision outcome metrics.
//!
//! Two monotonic counters, one per outcome. Fail-open decisions touch
//! neither: the counters reflect real decisions only.

use prometheus::{Encoder, IntCounter, Opts, Registry, TextEncoder};

use crate::error::Result;

/// Prometheus counters for rate limit decisions.
pub struct DecisionMetrics {
    registry: Registry,

    /// Requests admitted by the rate limiter
    pub allowed: IntCounter,

    /// Requests rejected by the rate limiter
    pub blocked: IntCounter,
}

impl DecisionMetrics {
    /// Create a new metrics set backed by its own registry.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let allowed = IntCounter::with_opts(Opts::new(
            "rate_limit_allowed",
            "Requests admitted by the rate limiter",
        ))?;
        registry.register(Box::new(allowed.clone()))?;

        let blocked = IntCounter::with_opts(Opts::new(
            "rate_limit_blocked",
            "Requests rejected by the rate limiter",
        ))?;
        registry.register(Box::new(blocked.clone()))?;

        Ok(Self {
            registry,
            allowed,
            blocked,
        })
    }

    /// Render all registered metrics in the Prometheus text format.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let metrics = DecisionMetrics::new().unwrap();
        assert_eq!(metrics.allowed.get(), 0);
        assert_eq!(metrics.blocked.get(), 0);
    }

    #[test]
    fn test_render_contains_counters() {
        let metrics = DecisionMetrics::new().unwrap();
        metrics.allowed.inc();
        metrics.blocked.inc();
        metrics.blocked.inc();

        let text = metrics.render().unwrap();
        assert!(text.contains("rate_limit_allowed 1"));
        assert!(text.contains("rate_limit_blocked 2"));
    }
}
