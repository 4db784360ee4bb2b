//! Cache Module
//!
//! Cache coordination for the catalog: backends, the shared client, key
//! derivation, read-through population and write-triggered invalidation.

mod backend;
mod client;
mod entry;
mod invalidation;
pub mod keys;
mod lru;
mod memory;
mod read_through;
mod redis;
mod stats;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use backend::CacheBackend;
pub use client::{CacheClient, PurgeOutcome, DEFAULT_CACHE_TIMEOUT};
pub use entry::CacheEntry;
pub use invalidation::{InvalidationCoordinator, InvalidationReport};
pub use lru::LruTracker;
pub use memory::{MemoryBackend, MemoryStore};
pub use read_through::{Lookup, ReadThroughCache};
pub use self::redis::RedisBackend;
pub use stats::{CacheCounters, CacheStats};

// == Public Constants ==
/// Expiry for listing entries unless configured otherwise (10 minutes)
pub const DEFAULT_LIST_TTL_SECS: u64 = 600;
