//! Upstream network layer.
//!
//! # Data Flow
//! ```text
//! Fetch pipeline (cache miss)
//!     → transport.rs (single GET, status check, optional JSON check)
//!     → envelope.rs (success/failure envelope, cache expiry)
//!     → Back to cache / domain layer
//! ```
//!
//! # Design Decisions
//! - Transport is a trait so the pipeline can run against stubs
//! - Only 200 OK is a success; everything else carries its status
//! - All failures map to one error type (`types.rs`)

pub mod envelope;
#[cfg(test)]
pub(crate) mod stub;
pub mod transport;
pub mod types;

pub use envelope::{CacheMeta, EnvelopeMeta, ResponseEnvelope};
pub use transport::{HttpTransport, Transport};
pub use types::{Decode, FetchError, FetchResult, ResourceKey};
