//! In-memory TTL store for fetched API data
//!
//! Provides a `CacheStore` that holds values with expiry timestamps so UI
//! code can avoid redundant network calls. Entries live for their TTL only;
//! an expired entry behaves exactly like a missing one and is removed on the
//! read that finds it stale.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

/// A cached value together with its expiry timestamp
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    expires_at: Instant,
}

impl<T> CacheEntry<T> {
    fn new(value: T, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-memory key-value store with per-entry TTL expiration
///
/// The store is thread-safe and intended to be shared behind an `Arc`,
/// constructed at application start and passed to whatever needs caching.
/// There is no size bound and no eviction beyond TTL expiry; `purge_expired`
/// is available as a housekeeping hook for long sessions.
///
/// Reads never fail: a missing or expired key simply yields `None`.
#[derive(Debug, Default)]
pub struct CacheStore<T> {
    entries: RwLock<HashMap<String, CacheEntry<T>>>,
}

impl<T: Clone> CacheStore<T> {
    /// Creates an empty store
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Stores `value` under `key`, fresh for `ttl` from now
    ///
    /// Overwrites any prior entry for the key and resets its expiry.
    pub fn set(&self, key: &str, value: T, ttl: Duration) {
        let mut entries = self.entries.write();
        entries.insert(key.to_string(), CacheEntry::new(value, ttl));
        tracing::debug!(key, ?ttl, "cache set");
    }

    /// Returns the value for `key` if present and unexpired
    ///
    /// An entry found expired is removed before `None` is returned, so the
    /// store never serves or retains stale data past its TTL.
    pub fn get(&self, key: &str) -> Option<T> {
        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if !entry.is_expired() => {
                    tracing::debug!(key, "cache hit");
                    return Some(entry.value.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }
        // Found but stale; drop the read lock before removing.
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|e| e.is_expired()) {
            entries.remove(key);
            tracing::debug!(key, "cache entry expired, removed");
        }
        None
    }

    /// Removes the entry for `key`, if any
    pub fn remove(&self, key: &str) {
        self.entries.write().remove(key);
    }

    /// Removes every entry
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Removes all entries whose TTL has elapsed
    pub fn purge_expired(&self) {
        self.entries.write().retain(|_, e| !e.is_expired());
    }

    /// Returns the number of entries, expired ones included until swept
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
