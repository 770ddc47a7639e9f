//! Outbound rate limiting.
//!
//! One gate for the whole process: every upstream request first calls
//! [`RateLimiter::acquire`]. Callers queue FIFO on a `tokio` mutex holding the
//! last release time and keep the gate while they sleep. The release recorded
//! is the instant the caller actually woke, so a late wakeup pushes every
//! later caller back instead of letting them catch up.
//!
//! A caller cancelled while sleeping releases the gate without recording a
//! release.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

use crate::config::RateLimitConfig;
use crate::observability::metrics;

/// Longest interval a limiter accepts; longer values are clamped.
pub const MAX_INTERVAL: Duration = Duration::from_secs(3600);

/// Minimum-interval gate shared by all upstream requests.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last_release: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a limiter releasing at most one caller per `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.min(MAX_INTERVAL),
            last_release: Mutex::new(None),
        }
    }

    /// Build a limiter from configuration.
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(Duration::from_millis(config.interval_ms))
    }

    /// Configured interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until this caller may issue a request.
    pub async fn acquire(&self) {
        let mut last = self.last_release.lock().await;

        if let Some(previous) = *last {
            let ready = previous + self.interval;
            let wait = ready.saturating_duration_since(Instant::now());
            if !wait.is_zero() {
                tracing::debug!(wait_ms = wait.as_millis() as u64, "Request limit");
                metrics::record_rate_limit_wait(wait);
                sleep_until(ready).await;
            }
        }

        *last = Some(Instant::now());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::from_config(&RateLimitConfig::default())
    }
}
