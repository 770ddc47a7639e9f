//! Per-key in-flight guards.
//!
//! Each key currently being resolved owns a slot holding an async mutex and
//! the number of callers holding or awaiting it. Slots are created on first
//! use and removed when that count drops to zero, all under one map lock, so
//! the map only ever contains keys with live callers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::net::ResourceKey;

#[derive(Debug)]
struct Slot {
    lock: Arc<AsyncMutex<()>>,
    holders: usize,
}

/// Map of per-key guards.
#[derive(Debug, Default)]
pub struct InFlight {
    slots: Mutex<HashMap<ResourceKey, Slot>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`.
    ///
    /// Cancel-safe: dropping the returned future while it waits releases
    /// the caller's claim on the slot.
    pub async fn acquire(&self, key: &ResourceKey) -> KeyGuard<'_> {
        let lease = self.lease(key);
        let permit = lease.lock.clone().lock_owned().await;
        KeyGuard {
            _permit: permit,
            _lease: lease,
        }
    }

    /// Number of keys with callers holding or awaiting a guard.
    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots().is_empty()
    }

    fn lease(&self, key: &ResourceKey) -> Lease<'_> {
        let mut slots = self.slots();
        let slot = slots.entry(key.clone()).or_insert_with(|| Slot {
            lock: Arc::new(AsyncMutex::new(())),
            holders: 0,
        });
        slot.holders += 1;
        Lease {
            owner: self,
            key: key.clone(),
            lock: slot.lock.clone(),
        }
    }

    fn release(&self, key: &ResourceKey) {
        let mut slots = self.slots();
        if let Some(slot) = slots.get_mut(key) {
            slot.holders -= 1;
            if slot.holders == 0 {
                slots.remove(key);
            }
        }
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<ResourceKey, Slot>> {
        // Every critical section leaves the map consistent.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A caller's claim on a slot, counted in `holders`.
struct Lease<'a> {
    owner: &'a InFlight,
    key: ResourceKey,
    lock: Arc<AsyncMutex<()>>,
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        self.owner.release(&self.key);
    }
}

/// Exclusive access to one key. Released on drop.
pub struct KeyGuard<'a> {
    // Field order matters: the mutex is unlocked before the slot count drops.
    _permit: OwnedMutexGuard<()>,
    _lease: Lease<'a>,
}
