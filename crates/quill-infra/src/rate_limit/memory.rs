//! In-memory per-client rate limiter using the governor crate.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::{Clock, DefaultClock};
use governor::state::keyed::HashMapStateStore;
use governor::{Quota, RateLimiter as GovernorRateLimiter};

use quill_core::ports::{RateLimitError, RateLimitResult, RateLimiter};

type KeyedRateLimiter = GovernorRateLimiter<String, HashMapStateStore<String>, DefaultClock>;

/// Rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Attempts allowed per window (also the burst size).
    pub max_requests: u32,
    /// Window duration.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_requests: std::env::var("RATE_LIMIT_MAX_REQUESTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_requests),
            window: std::env::var("RATE_LIMIT_WINDOW_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.window),
        }
    }

    fn quota(&self) -> Quota {
        let burst = NonZeroU32::new(self.max_requests).unwrap_or(NonZeroU32::MIN);
        Quota::with_period(self.window / burst.get())
            .map(|q| q.allow_burst(burst))
            .unwrap_or_else(|| Quota::per_second(burst))
    }
}

/// GCRA rate limiter keyed by client address.
///
/// Limits are per-process, not shared across instances.
pub struct InMemoryRateLimiter {
    limiter: KeyedRateLimiter,
}

impl InMemoryRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            limiter: GovernorRateLimiter::hashmap(config.quota()),
        }
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, client: &str) -> Result<RateLimitResult, RateLimitError> {
        match self.limiter.check_key(&client.to_string()) {
            Ok(()) => Ok(RateLimitResult::allowed()),
            Err(not_until) => Ok(RateLimitResult::denied(
                not_until.wait_time_from(self.limiter.clock().now()),
            )),
        }
    }

    async fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32) -> InMemoryRateLimiter {
        InMemoryRateLimiter::new(RateLimitConfig {
            max_requests,
            window: Duration::from_secs(60),
        })
    }

    #[tokio::test]
    async fn allows_burst_then_denies() {
        let limiter = limiter(3);
        for _ in 0..3 {
            assert!(limiter.check("10.0.0.1").await.unwrap().allowed);
        }

        let denied = limiter.check("10.0.0.1").await.unwrap();
        assert!(!denied.allowed);
        assert!(denied.retry_after > Duration::ZERO);
    }

    #[tokio::test]
    async fn clients_are_limited_independently() {
        let limiter = limiter(1);
        assert!(limiter.check("10.0.0.1").await.unwrap().allowed);
        assert!(!limiter.check("10.0.0.1").await.unwrap().allowed);
        assert!(limiter.check("10.0.0.2").await.unwrap().allowed);
    }

    #[test]
    fn zero_requests_falls_back_to_one() {
        let config = RateLimitConfig {
            max_requests: 0,
            window: Duration::from_secs(60),
        };
        assert_eq!(config.quota().burst_size().get(), 1);
    }
}
