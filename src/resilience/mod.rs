//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Upstream request (cache miss):
//!     → retries.rs (bounded attempts, retry request errors only)
//!         → rate_limit.rs (wait for the process-wide slot)
//!         → transport (single GET)
//!     → On retryable failure: backoff.rs (optional delay), next attempt
//! ```
//!
//! # Design Decisions
//! - Every attempt goes through the rate limiter, retries included
//! - Parse errors are never retried
//! - Retry and rate limiting are plain values composed by the Fetcher

pub mod backoff;
pub mod rate_limit;
pub mod retries;

pub use backoff::Delay;
pub use rate_limit::RateLimiter;
pub use retries::RetryPolicy;
