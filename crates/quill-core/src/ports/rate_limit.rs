//! Throttling port for the credential endpoints.

use async_trait::async_trait;
use std::time::Duration;

/// Per-client request throttle.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Record one attempt for `client` and report whether it may proceed.
    async fn check(&self, client: &str) -> Result<RateLimitResult, RateLimitError>;

    /// Drop bookkeeping for clients that are back to a full quota.
    async fn prune(&self) {}
}

/// Outcome of a throttle check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    /// Time until the client may try again. Zero when allowed.
    pub retry_after: Duration,
}

impl RateLimitResult {
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            retry_after: Duration::ZERO,
        }
    }

    pub fn denied(retry_after: Duration) -> Self {
        Self {
            allowed: false,
            retry_after,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Rate limiter backend error: {0}")]
    Backend(String),
}
