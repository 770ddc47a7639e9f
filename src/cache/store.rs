//! Key-addressed payload store with per-entry expiry.

use bytes::Bytes;
use dashmap::DashMap;

use crate::net::ResourceKey;

/// A cached response payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Raw response bytes, exactly as received.
    pub payload: Bytes,
    /// Expiry (Unix epoch ms). May already be in the past when written.
    pub expires_at: i64,
}

impl CacheEntry {
    /// Check if the entry is still valid at `now_ms`.
    pub fn is_fresh(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at
    }
}

/// Concurrent map of entries. Entries are replaced whole, never mutated.
#[derive(Debug, Default)]
pub struct EntryStore {
    entries: DashMap<ResourceKey, CacheEntry>,
}

impl EntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payload for `key` if present and fresh. Stale entries are dropped.
    pub fn get_fresh(&self, key: &ResourceKey, now_ms: i64) -> Option<Bytes> {
        let hit = self
            .entries
            .get(key)
            .and_then(|entry| entry.is_fresh(now_ms).then(|| entry.payload.clone()));

        if hit.is_none() {
            self.entries.remove_if(key, |_, entry| !entry.is_fresh(now_ms));
        }
        hit
    }

    /// Insert or replace the entry for `key`.
    pub fn insert(&self, key: ResourceKey, entry: CacheEntry) {
        self.entries.insert(key, entry);
    }

    /// Drop every stale entry, returning how many were removed.
    pub fn purge_expired(&self, now_ms: i64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh(now_ms));
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn key(path: &str) -> ResourceKey {
        ResourceKey::from(&Url::parse("https://ch.tetr.io/api/").unwrap().join(path).unwrap())
    }

    #[test]
    fn test_fresh_and_stale_reads() {
        let store = EntryStore::new();
        store.insert(
            key("users/osk"),
            CacheEntry {
                payload: Bytes::from_static(b"{}"),
                expires_at: 5_000,
            },
        );

        assert_eq!(store.get_fresh(&key("users/osk"), 4_999), Some(Bytes::from_static(b"{}")));
        assert_eq!(store.len(), 1);

        // Expiry is exclusive; a stale read evicts.
        assert_eq!(store.get_fresh(&key("users/osk"), 5_000), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_purge_expired() {
        let store = EntryStore::new();
        for (i, expires_at) in [100, 200, 300].into_iter().enumerate() {
            store.insert(
                key(&format!("users/u{i}")),
                CacheEntry {
                    payload: Bytes::new(),
                    expires_at,
                },
            );
        }
        assert_eq!(store.purge_expired(250), 2);
        assert_eq!(store.len(), 1);
    }
}
