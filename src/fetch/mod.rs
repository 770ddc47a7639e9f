//! Fetch pipeline composition.
//!
//! # Data Flow
//! ```text
//! Fetcher::get(url)
//!     → cache (single-flight guard, fresh entry?)
//!     → [miss] retries → rate limiter → transport
//!     → envelope decides caching
//!     → raw bytes to the caller (domain layer decodes)
//! ```
//!
//! One `Fetcher` is built at startup and shared (via `Arc`) by every caller;
//! the rate limit and cache are only meaningful when shared.

pub mod fetcher;

pub use fetcher::Fetcher;
