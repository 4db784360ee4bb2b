//! Cache Backend Port
//!
//! The key/value store the cache client talks to. Implementations report
//! transport failures as [`CacheError`]; the client decides what to do with
//! them.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheError;

/// Key/value store with optional per-key expiry.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Returns the stored value, or None when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Replaces the whole value. `None` TTL means the entry never expires.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Removes a key, returning whether it existed.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    /// Removes every key starting with `prefix`, returning how many were removed.
    ///
    /// An error means the purge may have stopped part way through.
    async fn delete_prefix(&self, prefix: &str) -> Result<usize, CacheError>;

    /// Short backend name for logs and stats.
    fn name(&self) -> &'static str;
}
