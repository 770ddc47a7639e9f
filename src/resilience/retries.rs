//! Bounded retry policy.
//!
//! # Responsibilities
//! - Run an async operation up to `max_attempts` times in total
//! - Retry only errors the caller classifies as retryable
//! - Optionally wait between attempts (fixed or exponential backoff)
//!
//! The error of the final attempt propagates as-is; there is no
//! "retries exhausted" wrapper. `max_attempts == 0` still runs once.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use crate::config::RetryConfig;
use crate::observability::metrics;
use crate::resilience::backoff::Delay;

/// Retry parameters, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Option<Delay>,
}

impl RetryPolicy {
    /// Policy with `max_attempts` total attempts and no delay.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            delay: None,
        }
    }

    /// Wait `delay` between attempts.
    pub fn with_delay(mut self, delay: Delay) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Build a policy from configuration.
    pub fn from_config(config: &RetryConfig) -> Self {
        let delay = config.delay_ms.map(|delay_ms| match config.max_delay_ms {
            Some(max_ms) => Delay::Exponential {
                base: Duration::from_millis(delay_ms),
                max: Duration::from_millis(max_ms),
            },
            None => Delay::Fixed(Duration::from_millis(delay_ms)),
        });
        Self {
            max_attempts: config.max_attempts,
            delay,
        }
    }

    /// Attempts actually made before giving up.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Run `op`, retrying on any error.
    pub async fn run<T, E, F, Fut>(&self, op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.run_if(op, |_| true).await
    }

    /// Run `op`, retrying only errors for which `retryable` returns true.
    pub async fn run_if<T, E, F, Fut, P>(&self, mut op: F, retryable: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: Display,
    {
        let max_attempts = self.max_attempts();
        let mut attempt = 1;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < max_attempts && retryable(&e) => {
                    tracing::warn!(attempt, max_attempts, error = %e, "Attempt failed");
                    metrics::record_retry();

                    if let Some(delay) = self.delay {
                        tokio::time::sleep(delay.after_attempt(attempt)).await;
                    }
                    attempt += 1;
                    tracing::debug!("Retrying ({}/{})", attempt, max_attempts);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug, PartialEq)]
    enum TestError {
        Transient(u32),
        Fatal,
    }

    impl Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{self:?}")
        }
    }

    fn is_transient(e: &TestError) -> bool {
        matches!(e, TestError::Transient(_))
    }

    #[tokio::test]
    async fn test_exhaustion_returns_last_error() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = RetryPolicy::new(3)
            .run_if(
                || async {
                    let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    Err(TestError::Transient(n))
                },
                is_transient,
            )
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(result, Err(TestError::Transient(3)));
    }

    #[tokio::test]
    async fn test_non_retryable_runs_once() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = RetryPolicy::new(3)
            .run_if(
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(TestError::Fatal)
                },
                is_transient,
            )
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(result, Err(TestError::Fatal));
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let calls = AtomicU32::new(0);
        let result = RetryPolicy::new(0)
            .run(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TestError>(7)
            })
            .await;
        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let calls = AtomicU32::new(0);
        let result: Result<(), _> = RetryPolicy::new(0)
            .run(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(TestError::Transient(1))
            })
            .await;
        assert_eq!(result, Err(TestError::Transient(1)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = RetryPolicy::new(3)
            .run(|| async {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Err(TestError::Transient(n))
                } else {
                    Ok(n)
                }
            })
            .await;
        assert_eq!(result, Ok(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_between_attempts() {
        let start = tokio::time::Instant::now();
        let result: Result<(), _> = RetryPolicy::new(3)
            .with_delay(Delay::Fixed(Duration::from_secs(2)))
            .run(|| async { Err(TestError::Transient(0)) })
            .await;

        assert!(result.is_err());
        // Two waits: after attempt 1 and after attempt 2, none after the last.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(4) && elapsed < Duration::from_secs(5));
    }

    #[test]
    fn test_from_config() {
        let mut config = RetryConfig::default();
        assert_eq!(RetryPolicy::from_config(&config), RetryPolicy::new(3));

        config.delay_ms = Some(100);
        assert_eq!(
            RetryPolicy::from_config(&config),
            RetryPolicy::new(3).with_delay(Delay::Fixed(Duration::from_millis(100)))
        );

        config.max_delay_ms = Some(800);
        assert_eq!(
            RetryPolicy::from_config(&config).delay,
            Some(Delay::Exponential {
                base: Duration::from_millis(100),
                max: Duration::from_millis(800),
            })
        );
    }
}
