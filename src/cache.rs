//! Balance result cache.
//!
//! Plain map, no interior locking: the cache lives inside the node pool's
//! state and is only reached through the pool mutex. Expiry is lazy: callers
//! pass the TTL on read and stale entries are skipped, never removed.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// A cached balance. Immutable once written; a new write replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub value: String,
    pub created_at: Instant,
}

impl CacheEntry {
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    /// An entry exactly `ttl` old is still fresh.
    pub fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        self.age(now) <= ttl
    }
}

/// Address (case-sensitive, as supplied) → last stored balance.
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: HashMap<String, CacheEntry>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Value for `key` if it was written no more than `ttl` before `now`.
    pub fn get_fresh(&self, key: &str, ttl: Duration, now: Instant) -> Option<&str> {
        self.entries
            .get(key)
            .filter(|entry| entry.is_fresh(ttl, now))
            .map(|entry| entry.value.as_str())
    }

    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.put_at(key, value, Instant::now());
    }

    pub fn put_at(&mut self, key: impl Into<String>, value: impl Into<String>, created_at: Instant) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                value: value.into(),
                created_at,
            },
        );
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
