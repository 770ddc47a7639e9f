//! Stats API domain layer.
//!
//! # Data Flow
//! ```text
//! "OSK" → query.rs (UserQuery::Name)
//!     → player.rs (memoized per-endpoint accessors)
//!     → client.rs (endpoint URL, envelope decoding)
//!     → fetch::Fetcher (cache, rate limit, retry, transport)
//! ```

pub mod client;
pub mod player;
pub mod query;
pub mod types;

pub use client::StatsClient;
pub use player::Player;
pub use query::{InvalidUser, UserQuery};
pub use types::{LeagueSummary, Rank, SoloSummary, SummaryKind, User, UserInfo};
