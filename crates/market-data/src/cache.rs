//! In-process cache with a per-entry time-to-live.
//!
//! Backs the memory tier in front of the rate and market-price lookups.
//! Entries carry their own absolute deadline because success and failure
//! results live for very different spans (a fresh rate until UTC midnight,
//! a degraded market answer for a minute or five). Shared, lock-guarded,
//! and race-tolerant: concurrent writers for the same key compute the same
//! value inside its validity window, so last-writer-wins is fine.
//!
//! The cache is in-memory only and repopulates after a restart.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::warn;

/// Cached value with its expiry deadline.
#[derive(Debug)]
struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// String-keyed cache where every entry has its own TTL.
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, Entry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Lock the entry map, recovering from poison if necessary.
    /// Worst case after recovery is a stale entry, which expiry handles.
    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, Entry<V>>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("TTL cache mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Fetch a live value. Expired entries are evicted on access.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.lock_entries();

        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a value that expires `ttl` from now, replacing any previous
    /// entry under the key.
    pub fn insert(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let mut entries = self.lock_entries();
        entries.insert(
            key.into(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Number of entries currently stored, expired ones included.
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.lock_entries().is_empty()
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}
