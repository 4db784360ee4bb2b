//! Read-Through Cache
//!
//! `get_or_load` answers from the cache when it can and otherwise asks the
//! loader for the authoritative value, writes it back, and returns it.

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::cache::CacheClient;

// == Lookup ==
/// A value together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup<T> {
    /// The value returned to the caller
    pub value: T,
    /// True when served from the cache without calling the loader
    pub cache_hit: bool,
}

impl<T> Lookup<T> {
    /// Drops the cache-hit flag.
    pub fn into_inner(self) -> T {
        self.value
    }
}

// == Read-Through Cache ==
/// Cache-aside reads over a shared [`CacheClient`].
#[derive(Debug, Clone)]
pub struct ReadThroughCache {
    client: CacheClient,
}

impl ReadThroughCache {
    /// Creates a read-through cache over the given client.
    pub fn new(client: CacheClient) -> Self {
        Self { client }
    }

    /// The client this cache reads and writes through.
    pub fn client(&self) -> &CacheClient {
        &self.client
    }

    // == Get Or Load ==
    /// Returns the cached value for `key`, or loads, caches and returns it.
    ///
    /// A missing entry, an undecodable entry and a cache outage all fall
    /// through to `loader`. Loader errors are returned unchanged and nothing
    /// is cached for them. The loaded value is returned whether or not the
    /// cache write succeeded.
    ///
    /// # Arguments
    /// * `key` - Cache key built by the key codec
    /// * `ttl` - Expiry for the populated entry, None = until invalidated
    /// * `loader` - Fetches the authoritative value from the store
    pub async fn get_or_load<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        loader: F,
    ) -> Result<Lookup<T>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(raw) = self.client.get(key).await {
            match serde_json::from_str::<T>(&raw) {
                Ok(value) => {
                    self.client.record_lookup(true);
                    return Ok(Lookup {
                        value,
                        cache_hit: true,
                    });
                }
                Err(err) => warn!("Discarding undecodable cache entry '{}': {}", key, err),
            }
        }
        self.client.record_lookup(false);

        let value = loader().await?;
        self.populate(key, &value, ttl).await;

        Ok(Lookup {
            value,
            cache_hit: false,
        })
    }

    /// Writes a freshly loaded value back to the cache.
    async fn populate<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("Could not serialize value for '{}': {}", key, err);
                return;
            }
        };

        // Runs on its own task so a cancelled request still finishes the write
        let client = self.client.clone();
        let key = key.to_string();
        let write = tokio::spawn(async move { client.set(&key, &payload, ttl).await });

        if let Err(err) = write.await {
            warn!("Cache population task failed: {}", err);
        }
    }
}
