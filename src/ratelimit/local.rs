//! Process-local fallback strategy.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::Result;

use super::resolver::RateLimitConfig;
use super::strategy::RateLimitStrategy;

/// Per-key quota bucket.
///
/// Invariant: `0 <= remaining <= capacity`.
struct Bucket {
    capacity: u32,
    remaining: u32,
    window_secs: u64,
    reset_at: Instant,
}

impl Bucket {
    fn new(config: &RateLimitConfig, now: Instant) -> Self {
        Self {
            capacity: config.max_requests,
            remaining: config.max_requests,
            window_secs: config.window_secs,
            reset_at: now + Duration::from_secs(config.window_secs),
        }
    }

    /// One decision. Refills and advances the window first if it has
    /// expired, always stepping by the bucket's own window length.
    fn allow(&mut self, now: Instant) -> bool {
        if now > self.reset_at {
            self.remaining = self.capacity;
            self.reset_at = now + Duration::from_secs(self.window_secs);
        }
        if self.remaining > 0 {
            self.remaining -= 1;
            true
        } else {
            false
        }
    }
}

/// Local fallback strategy holding one independent bucket per key.
///
/// Buckets are created lazily on a key's first decision and keep the
/// capacity and window seen at that moment; later config changes for the
/// key do not retrofit an existing bucket. Buckets are never evicted, so
/// the map grows with the number of distinct keys this process has seen.
/// Both are accepted limitations of a degrade-mode path.
///
/// Concurrent decisions for the same key serialize on that bucket's mutex;
/// decisions for different keys only contend on the map's shards.
pub struct LocalFallbackStrategy {
    buckets: DashMap<String, Mutex<Bucket>>,
}

impl LocalFallbackStrategy {
    /// Create a new, empty fallback strategy.
    pub fn new() -> Self {
        Self {
            buckets: DashMap::new(),
        }
    }

    /// Decision at an explicit point in time. The public trait entry point
    /// uses the real clock; tests drive this directly.
    fn allow_at(&self, key: &str, config: &RateLimitConfig, now: Instant) -> bool {
        let entry = self
            .buckets
            .entry(key.to_string())
            .or_insert_with(|| {
                debug!(
                    key = %key,
                    capacity = config.max_requests,
                    window_secs = config.window_secs,
                    "Creating local bucket"
                );
                Mutex::new(Bucket::new(config, now))
            });

        let mut bucket = entry.lock();
        bucket.allow(now)
    }

    /// Number of live buckets (primarily useful for tests).
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

impl Default for LocalFallbackStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateLimitStrategy for LocalFallbackStrategy {
    async fn allow(&self, key: &str, config: &RateLimitConfig) -> Result<bool> {
        Ok(self.allow_at(key, config, Instant::now()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn config(max_requests: u32, window_secs: u64) -> RateLimitConfig {
        RateLimitConfig {
            max_requests,
            window_secs,
            strategy: "LOCAL".to_string(),
        }
    }

    #[tokio::test]
    async fn test_allows_up_to_capacity_then_denies() {
        let strategy = LocalFallbackStrategy::new();
        let config = config(2, 60);

        assert!(strategy.allow("u1:/x", &config).await.unwrap());
        assert!(strategy.allow("u1:/x", &config).await.unwrap());
        assert!(!strategy.allow("u1:/x", &config).await.unwrap());
        assert!(!strategy.allow("u1:/x", &config).await.unwrap());
    }

    #[test]
    fn test_window_expiry_refills_bucket() {
        let strategy = LocalFallbackStrategy::new();
        let config = config(2, 10);
        let t0 = Instant::now();

        assert!(strategy.allow_at("u1:/x", &config, t0));
        assert!(strategy.allow_at("u1:/x", &config, t0));
        assert!(!strategy.allow_at("u1:/x", &config, t0));

        // Just past the window boundary the bucket refills to full capacity
        let t1 = t0 + Duration::from_secs(11);
        assert!(strategy.allow_at("u1:/x", &config, t1));
        assert!(strategy.allow_at("u1:/x", &config, t1));
        assert!(!strategy.allow_at("u1:/x", &config, t1));
    }

    #[test]
    fn test_refill_steps_by_bucket_window() {
        let strategy = LocalFallbackStrategy::new();
        let config = config(1, 10);
        let t0 = Instant::now();

        assert!(strategy.allow_at("u1:/x", &config, t0));

        // 11s in: refill, new window ends at t0+21s
        let t1 = t0 + Duration::from_secs(11);
        assert!(strategy.allow_at("u1:/x", &config, t1));

        // 20s in: still inside the second window
        let t2 = t0 + Duration::from_secs(20);
        assert!(!strategy.allow_at("u1:/x", &config, t2));

        // 22s in: third window
        let t3 = t0 + Duration::from_secs(22);
        assert!(strategy.allow_at("u1:/x", &config, t3));
    }

    #[test]
    fn test_capacity_frozen_at_creation() {
        let strategy = LocalFallbackStrategy::new();
        let t0 = Instant::now();

        assert!(strategy.allow_at("u1:/x", &config(1, 60), t0));

        // A larger limit in later config does not retrofit the bucket
        assert!(!strategy.allow_at("u1:/x", &config(100, 60), t0));
    }

    #[tokio::test]
    async fn test_keys_have_independent_buckets() {
        let strategy = LocalFallbackStrategy::new();
        let config = config(1, 60);

        assert!(strategy.allow("u1:/x", &config).await.unwrap());
        assert!(strategy.allow("u2:/x", &config).await.unwrap());
        assert!(!strategy.allow("u1:/x", &config).await.unwrap());
        assert_eq!(strategy.bucket_count(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_decisions_never_double_count() {
        let strategy = Arc::new(LocalFallbackStrategy::new());
        let config = Arc::new(config(10, 60));

        let mut handles = Vec::with_capacity(100);
        for _ in 0..100 {
            let strategy = strategy.clone();
            let config = config.clone();
            handles.push(tokio::spawn(async move {
                strategy.allow("u1:/x", &config).await.unwrap()
            }));
        }

        let mut allowed = 0;
        let mut denied = 0;
        for handle in handles {
            if handle.await.unwrap() {
                allowed += 1;
            } else {
                denied += 1;
            }
        }

        assert_eq!(allowed, 10);
        assert_eq!(denied, 90);
        assert_eq!(allowed + denied, 100);
    }
}
