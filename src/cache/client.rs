//! Cache Client Module
//!
//! The one handle every component uses to reach the cache backend. It is
//! built once at startup and cloned into whoever needs it; all clones share
//! the same backend connection and counters.
//!
//! Backend failures stop here. A failed or timed-out `get` is a miss, a
//! failed `set`/`delete` is logged and dropped. Callers only learn whether a
//! delete completed, so invalidation can record partial purges.
//!
//! Hits and misses are recorded by the reader once it knows whether the
//! cached bytes were usable; the client only counts backend errors.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::{CacheBackend, CacheCounters, CacheStats};
use crate::error::CacheError;

/// Default bound on a single backend call
pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_millis(250);

// == Purge Outcome ==
/// Result of a delete as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurgeOutcome {
    /// Keys the backend reported as removed
    pub deleted: usize,
    /// False when the backend failed part way or not at all reachable
    pub complete: bool,
}

// == Cache Client ==
/// Shared, failure-absorbing handle to a [`CacheBackend`].
#[derive(Clone)]
pub struct CacheClient {
    backend: Arc<dyn CacheBackend>,
    counters: Arc<CacheCounters>,
    timeout: Duration,
}

impl CacheClient {
    /// Wraps a backend with the default per-call timeout.
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self::with_timeout(backend, DEFAULT_CACHE_TIMEOUT)
    }

    /// Wraps a backend, bounding every call by `timeout`.
    pub fn with_timeout(backend: Arc<dyn CacheBackend>, timeout: Duration) -> Self {
        Self {
            backend,
            counters: Arc::new(CacheCounters::default()),
            timeout,
        }
    }

    // == Get ==
    /// Returns the cached value, or None on miss or backend failure.
    pub async fn get(&self, key: &str) -> Option<String> {
        self.call("get", key, self.backend.get(key))
            .await
            .ok()
            .flatten()
    }

    /// Counts one read as served from the cache or not.
    pub fn record_lookup(&self, hit: bool) {
        if hit {
            self.counters.record_hit();
        } else {
            self.counters.record_miss();
        }
    }

    // == Set ==
    /// Stores a value; failures are logged and swallowed.
    pub async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) {
        if self
            .call("set", key, self.backend.set(key, value, ttl))
            .await
            .is_ok()
        {
            debug!("Cached {} (ttl: {:?})", key, ttl);
        }
    }

    // == Delete ==
    /// Removes a key. `deleted` is 1 only when the key existed.
    pub async fn delete(&self, key: &str) -> PurgeOutcome {
        match self.call("delete", key, self.backend.delete(key)).await {
            Ok(existed) => PurgeOutcome {
                deleted: usize::from(existed),
                complete: true,
            },
            Err(()) => PurgeOutcome {
                deleted: 0,
                complete: false,
            },
        }
    }

    // == Delete Prefix ==
    /// Removes every key under `prefix`.
    pub async fn delete_prefix(&self, prefix: &str) -> PurgeOutcome {
        match self
            .call("delete_prefix", prefix, self.backend.delete_prefix(prefix))
            .await
        {
            Ok(deleted) => PurgeOutcome {
                deleted,
                complete: true,
            },
            Err(()) => PurgeOutcome {
                deleted: 0,
                complete: false,
            },
        }
    }

    /// Snapshot of hit, miss and error counters.
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    /// Name of the underlying backend.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Runs one backend call under the timeout, logging any failure once.
    async fn call<T, F>(&self, operation: &str, key: &str, fut: F) -> Result<T, ()>
    where
        F: Future<Output = Result<T, CacheError>>,
    {
        let result = match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(CacheError::Timeout(self.timeout)),
        };

        result.map_err(|err| {
            self.counters.record_error();
            warn!(
                backend = self.backend.name(),
                "Cache {} failed for '{}': {}", operation, key, err
            );
        })
    }
}

impl std::fmt::Debug for CacheClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheClient")
            .field("backend", &self.backend.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}
