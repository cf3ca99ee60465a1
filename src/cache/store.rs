//! Cache Store Module
//!
//! Keyed TTL store with lazy, read-time eviction.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::cache::{CacheEntry, CacheStats, DEFAULT_TTL_SECS};
use crate::clock::{Clock, SystemClock};

// == TTL Cache ==
/// Key-value store where every entry carries an expiry time.
///
/// Expired entries are removed by the `get`/`has` call that finds them;
/// there is no background sweep. All methods take `&mut self`, so a lookup
/// and the eviction it triggers happen as one step for whoever holds the
/// cache.
#[derive(Debug)]
pub struct TtlCache<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Lookup statistics
    stats: CacheStats,
    /// TTL in seconds used when `set` is called without one
    default_ttl: u64,
    /// Time source for expiry decisions
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    // == Constructor ==
    /// Creates a cache using wall-clock time.
    ///
    /// # Arguments
    /// * `default_ttl` - TTL in seconds for entries set without an explicit TTL
    pub fn new(default_ttl: u64) -> Self {
        Self::with_clock(default_ttl, Arc::new(SystemClock))
    }

    /// Creates a cache reading time from `clock`.
    pub fn with_clock(default_ttl: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            default_ttl,
            clock,
        }
    }

    // == Get ==
    /// Returns the value stored under `key` if it has not expired.
    ///
    /// An expired entry is deleted and reported as absent.
    pub fn get(&mut self, key: &str) -> Option<V> {
        if self.evict_if_expired(key) {
            self.stats.record_miss();
            return None;
        }

        match self.entries.get(key) {
            Some(entry) => {
                self.stats.record_hit();
                Some(entry.value.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any existing entry.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl` - Optional TTL in seconds (uses the default TTL if None)
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl: Option<u64>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let entry = CacheEntry::new(value, ttl, self.clock.now_ms());
        self.entries.insert(key.into(), entry);
        self.stats.set_total_entries(self.entries.len());
    }

    // == Delete ==
    /// Removes the entry for `key`; does nothing when it is absent.
    pub fn delete(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.stats.set_total_entries(self.entries.len());
        }
    }

    // == Clear ==
    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.set_total_entries(0);
    }

    // == Has ==
    /// Expiry-aware presence check with the same eviction side effect as `get`.
    ///
    /// Does not count towards hit/miss statistics.
    pub fn has(&mut self, key: &str) -> bool {
        if self.evict_if_expired(key) {
            return false;
        }
        self.entries.contains_key(key)
    }

    /// Returns the number of stored entries, including not yet discovered
    /// expired ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Default TTL in seconds.
    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Drops `key` if it is present and expired. Returns whether it did.
    fn evict_if_expired(&mut self, key: &str) -> bool {
        let now = self.clock.now_ms();
        let expired = self
            .entries
            .get(key)
            .is_some_and(|entry| entry.is_expired(now));

        if expired {
            self.entries.remove(key);
            self.stats.record_expiration();
            self.stats.set_total_entries(self.entries.len());
            trace!(key, "evicted expired cache entry");
        }

        expired
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL_SECS)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn cache_with_clock(default_ttl: u64) -> (TtlCache<String>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let cache = TtlCache::with_clock(default_ttl, clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_cache_new() {
        let cache: TtlCache<String> = TtlCache::default();
        assert!(cache.is_empty());
        assert_eq!(cache.default_ttl(), DEFAULT_TTL_SECS);
    }

    #[test]
    fn test_cache_set_and_get() {
        let (mut cache, _) = cache_with_clock(300);

        cache.set("key1", "value1".to_string(), None);

        assert_eq!(cache.get("key1"), Some("value1".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_get_nonexistent() {
        let (mut cache, _) = cache_with_clock(300);
        assert_eq!(cache.get("nonexistent"), None);
        assert!(!cache.has("nonexistent"));
    }

    #[test]
    fn test_cache_delete() {
        let (mut cache, _) = cache_with_clock(300);

        cache.set("key1", "value1".to_string(), None);
        cache.delete("key1");
        cache.delete("key1");

        assert!(cache.is_empty());
        assert_eq!(cache.get("key1"), None);
    }

    #[test]
    fn test_cache_overwrite_resets_ttl() {
        let (mut cache, clock) = cache_with_clock(300);

        cache.set("key1", "value1".to_string(), Some(10));
        clock.advance_secs(8);
        cache.set("key1", "value2".to_string(), Some(10));
        clock.advance_secs(8);

        assert_eq!(cache.get("key1"), Some("value2".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_ttl_expiration_evicts_on_get() {
        let (mut cache, clock) = cache_with_clock(300);

        cache.set("key1", "value1".to_string(), Some(5));
        assert_eq!(cache.get("key1"), Some("value1".to_string()));

        clock.advance_secs(6);

        assert_eq!(cache.len(), 1, "Expired entry stays until discovered");
        assert_eq!(cache.get("key1"), None);
        assert_eq!(cache.len(), 0);
        assert!(!cache.has("key1"));
    }

    #[test]
    fn test_cache_has_evicts_expired() {
        let (mut cache, clock) = cache_with_clock(300);

        cache.set("key1", "value1".to_string(), Some(1));
        assert!(cache.has("key1"));

        clock.advance_secs(2);

        assert!(!cache.has("key1"));
        assert!(cache.is_empty());
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn test_cache_default_ttl_applies() {
        let (mut cache, clock) = cache_with_clock(60);

        cache.set("key1", "value1".to_string(), None);
        clock.advance_secs(59);
        assert!(cache.has("key1"));

        clock.advance_secs(1);
        assert!(!cache.has("key1"));
    }

    #[test]
    fn test_cache_clear() {
        let (mut cache, _) = cache_with_clock(300);

        cache.set("a", "1".to_string(), None);
        cache.set("b", "2".to_string(), None);
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.stats().total_entries, 0);
    }

    #[test]
    fn test_cache_stats() {
        let (mut cache, _) = cache_with_clock(300);

        cache.set("key1", "value1".to_string(), None);
        cache.get("key1");
        cache.get("nonexistent");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }
}
