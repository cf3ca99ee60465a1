//! Cache Module
//!
//! Provides in-memory caching with per-entry TTL expiration.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::TtlCache;

// == Public Constants ==
/// TTL in seconds used when none is configured
pub const DEFAULT_TTL_SECS: u64 = 300;

/// Cache key under which an entity with the given id is stored.
pub fn entity_key(id: &str) -> String {
    format!("entity:{id}")
}
