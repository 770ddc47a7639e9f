//! TETR.IO player stats lookup library.
//!
//! Cached, rate-limited and retrying access to the per-user stats API, plus
//! a batch layer that resolves many players at once.

pub mod api;
pub mod batch;
pub mod cache;
pub mod config;
pub mod fetch;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod resilience;

pub use api::{Player, StatsClient, UserQuery};
pub use batch::{lookup_all, LookupError, UserRecord};
pub use cache::ResponseCache;
pub use config::StatsConfig;
pub use fetch::Fetcher;
pub use lifecycle::Shutdown;
pub use net::{FetchError, FetchResult, HttpTransport, Transport};
pub use resilience::{RateLimiter, RetryPolicy};
