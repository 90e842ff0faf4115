//! Bounded retry for rate-limited requests.

use std::time::Duration;

use async_trait::async_trait;

use crate::models::ClientConfig;

/// Status the admin API uses for throttled requests.
pub const RATE_LIMIT_STATUS: u16 = 429;

/// Longest single wait honored from a Retry-After header.
pub const MAX_RETRY_WAIT: Duration = Duration::from_secs(600);

/// Suspends the calling flow while a rate limit is waited out.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// How many rate-limit responses a single call absorbs, and how long to wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; a call makes at most `max_retries + 1` attempts
    pub max_retries: u32,
    /// Wait applied when the server gives no usable Retry-After
    pub default_wait: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, default_wait: Duration) -> Self {
        Self {
            max_retries,
            default_wait,
        }
    }

    /// Whether another attempt is allowed after `retries_done` retries.
    pub fn allows_retry(&self, retries_done: u32) -> bool {
        retries_done < self.max_retries
    }

    /// Wait derived from a Retry-After header value.
    ///
    /// Accepts whole or fractional seconds, capped at [`MAX_RETRY_WAIT`].
    /// Anything else, including negative values, falls back to the default
    /// wait.
    pub fn wait_for(&self, retry_after: Option<&str>) -> Duration {
        retry_after
            .and_then(|value| value.trim().parse::<f64>().ok())
            .filter(|secs| *secs >= 0.0)
            .map(|secs| Duration::try_from_secs_f64(secs).unwrap_or(MAX_RETRY_WAIT))
            .map(|wait| wait.min(MAX_RETRY_WAIT))
            .unwrap_or(self.default_wait)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(2))
    }
}

impl From<&ClientConfig> for RetryPolicy {
    fn from(config: &ClientConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_secs(config.default_retry_after_secs),
        )
    }
}
