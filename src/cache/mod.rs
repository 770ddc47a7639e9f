//! Single-flight response cache.
//!
//! # Data Flow
//! ```text
//! get_or_fetch(key, fetch)
//!     → inflight.rs (exclusive guard for key; concurrent callers queue here)
//!     → store.rs (fresh entry? return it)
//!     → fetch() (cache miss: the retry/rate-limit/transport pipeline)
//!     → envelope (success → store until cached_until; failure → not stored)
//!     → release guard, return raw bytes
//! ```
//!
//! # Design Decisions
//! - At most one fetch per key is in flight; waiters see the winner's entry
//! - Failure envelopes are returned but never stored, so waiters re-fetch
//! - Expiry comes from the upstream `cached_until`; a past value stores an
//!   entry that is already stale
//! - Expired entries are removed lazily on read (or by `purge_expired`)

pub mod clock;
pub mod inflight;
pub mod store;

use bytes::Bytes;
use std::future::Future;
use std::sync::Arc;

use crate::net::{EnvelopeMeta, FetchResult, ResourceKey, ResponseEnvelope};
use crate::observability::metrics;

pub use clock::{Clock, ManualClock, SystemClock};
pub use inflight::InFlight;
pub use store::{CacheEntry, EntryStore};

/// Key-addressed cache of raw upstream responses.
#[derive(Debug)]
pub struct ResponseCache {
    store: EntryStore,
    in_flight: InFlight,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    /// Create a cache driven by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a cache driven by `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            store: EntryStore::new(),
            in_flight: InFlight::new(),
            clock,
        }
    }

    /// Return the cached payload for `key`, or resolve it with `fetch`.
    ///
    /// `fetch` runs only on a miss, while this caller holds the key's guard.
    /// Its bytes are parsed as a response envelope: successes are stored until
    /// their `cached_until`, failures are returned without being stored.
    pub async fn get_or_fetch<F, Fut>(&self, key: &ResourceKey, fetch: F) -> FetchResult<Bytes>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = FetchResult<Bytes>>,
    {
        let _guard = self.in_flight.acquire(key).await;

        if let Some(payload) = self.store.get_fresh(key, self.clock.now_ms()) {
            tracing::debug!(key = %key, "Cache hit");
            metrics::record_cache_lookup(true);
            return Ok(payload);
        }

        tracing::debug!(key = %key, "Cache miss");
        metrics::record_cache_lookup(false);

        let payload = fetch().await?;

        match EnvelopeMeta::from_slice(&payload)? {
            ResponseEnvelope::Success { cache, .. } => {
                let ttl_ms = cache.cached_until.saturating_sub(self.clock.now_ms());
                tracing::debug!(key = %key, ttl_ms, "Caching response");
                self.store.insert(
                    key.clone(),
                    CacheEntry {
                        payload: payload.clone(),
                        expires_at: cache.cached_until,
                    },
                );
            }
            ResponseEnvelope::Failure { error } => {
                tracing::debug!(key = %key, error = %error, "Upstream reported failure, not caching");
            }
        }

        Ok(payload)
    }

    /// Fresh payload for `key` without fetching or waiting on in-flight work.
    pub fn peek(&self, key: &ResourceKey) -> Option<Bytes> {
        self.store.get_fresh(key, self.clock.now_ms())
    }

    /// Drop all stale entries.
    pub fn purge_expired(&self) -> usize {
        let purged = self.store.purge_expired(self.clock.now_ms());
        if purged > 0 {
            tracing::debug!(purged, "Purged expired cache entries");
        }
        purged
    }

    /// Number of stored entries, stale ones included until they are read or purged.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Number of keys currently being resolved or awaited.
    pub fn in_flight_keys(&self) -> usize {
        self.in_flight.len()
    }

}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}
