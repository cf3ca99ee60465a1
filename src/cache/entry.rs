//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

// == Cache Entry ==
/// A cached value together with its lifetime bounds.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: i64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry that lives for `ttl_seconds` from `now_ms`.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl_seconds` - Lifetime in seconds
    /// * `now_ms` - Current time in Unix milliseconds
    pub fn new(value: V, ttl_seconds: u64, now_ms: i64) -> Self {
        let ttl_ms = i64::try_from(ttl_seconds.saturating_mul(1000)).unwrap_or(i64::MAX);

        Self {
            value,
            created_at: now_ms,
            expires_at: now_ms.saturating_add(ttl_ms),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// An entry is expired once the current time reaches its expiration
    /// time, so a fully elapsed TTL never yields the value again.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at
    }

    // == Time To Live ==
    /// Returns remaining lifetime in milliseconds, `0` once expired.
    pub fn ttl_remaining_ms(&self, now_ms: i64) -> u64 {
        u64::try_from(self.expires_at - now_ms).unwrap_or(0)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new("test_value", 60, NOW);

        assert_eq!(entry.value, "test_value");
        assert_eq!(entry.created_at, NOW);
        assert_eq!(entry.expires_at, NOW + 60_000);
        assert!(!entry.is_expired(NOW));
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new(1u32, 1, NOW);

        assert!(!entry.is_expired(NOW + 999));
        assert!(entry.is_expired(NOW + 1_001));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new((), 1, NOW);

        // Expired exactly when the TTL has fully elapsed
        assert!(entry.is_expired(NOW + 1_000), "Entry should be expired at boundary");
    }

    #[test]
    fn test_zero_ttl_is_immediately_expired() {
        let entry = CacheEntry::new((), 0, NOW);
        assert!(entry.is_expired(NOW));
    }

    #[test]
    fn test_ttl_remaining_ms() {
        let entry = CacheEntry::new((), 10, NOW);

        assert_eq!(entry.ttl_remaining_ms(NOW), 10_000);
        assert_eq!(entry.ttl_remaining_ms(NOW + 4_000), 6_000);
        assert_eq!(entry.ttl_remaining_ms(NOW + 20_000), 0);
    }

    #[test]
    fn test_huge_ttl_does_not_overflow() {
        let entry = CacheEntry::new((), u64::MAX, NOW);
        assert!(!entry.is_expired(NOW));
        assert_eq!(entry.expires_at, i64::MAX);
    }
}
