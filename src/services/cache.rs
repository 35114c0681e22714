use dashmap::DashMap;
use std::time::{Duration, Instant};

/// A thread-safe response cache.
///
/// Entries remember when they were stored; callers decide freshness by
/// passing the maximum age on every read.
pub struct Cache<V> {
    data: DashMap<String, CacheEntry<V>>,
}

struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

impl<V: Clone> Cache<V> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }

    /// Get a value if it was stored less than `max_age` ago.
    pub fn get_fresh(&self, key: &str, max_age: Duration) -> Option<V> {
        let entry = self.data.get(key)?;
        if entry.stored_at.elapsed() < max_age {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// Store a value, stamped with the current time.
    pub fn set(&self, key: String, value: V) {
        self.data.insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Remove a value from the cache.
    pub fn remove(&self, key: &str) -> Option<V> {
        self.data.remove(key).map(|(_, entry)| entry.value)
    }

    /// Clear all entries from the cache.
    pub fn clear(&self) {
        self.data.clear();
    }

    /// Remove all entries older than `max_age`.
    pub fn cleanup(&self, max_age: Duration) {
        self.data.retain(|_, entry| entry.stored_at.elapsed() < max_age);
    }

    /// Get the number of entries in the cache (including stale).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<V: Clone> Default for Cache<V> {
    fn default() -> Self {
        Self::new()
    }
}
