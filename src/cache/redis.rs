//! Redis Cache Backend
//!
//! Network cache backend with separate read and write endpoints. Connections
//! are opened lazily on first use and then shared: a `ConnectionManager` is
//! multiplexed, cheap to clone, and reconnects on its own after failures.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tokio::sync::OnceCell;
use tracing::info;

use crate::cache::CacheBackend;
use crate::error::CacheError;

/// Keys requested per SCAN round trip during prefix purges
const SCAN_BATCH: usize = 200;

// == Lazy Connection ==
/// A Redis client whose connection is established on first use.
struct LazyConnection {
    client: Client,
    conn: OnceCell<ConnectionManager>,
}

impl LazyConnection {
    fn open(url: &str) -> Result<Self, CacheError> {
        Ok(Self {
            client: Client::open(url)?,
            conn: OnceCell::new(),
        })
    }

    /// Returns a handle to the shared connection, connecting if needed.
    ///
    /// A failed connect leaves the cell empty so the next call retries.
    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                let manager = ConnectionManager::new(self.client.clone()).await?;
                info!(
                    "Connected to Redis at {}",
                    self.client.get_connection_info().addr
                );
                Ok::<_, CacheError>(manager)
            })
            .await?;
        Ok(conn.clone())
    }
}

// == Redis Backend ==
/// Cache backend over Redis.
#[derive(Clone)]
pub struct RedisBackend {
    read: Arc<LazyConnection>,
    write: Arc<LazyConnection>,
}

impl RedisBackend {
    /// Creates a backend for the given read and write endpoints.
    ///
    /// No network traffic happens here; only the URLs are parsed.
    pub fn new(read_url: &str, write_url: &str) -> Result<Self, CacheError> {
        let read = Arc::new(LazyConnection::open(read_url)?);
        let write = if read_url == write_url {
            Arc::clone(&read)
        } else {
            Arc::new(LazyConnection::open(write_url)?)
        };

        Ok(Self { read, write })
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.read.connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut conn = self.write.connection().await?;
        match ttl {
            Some(ttl) => {
                let millis = (ttl.as_millis() as u64).max(1);
                let _: () = conn.pset_ex(key, value, millis).await?;
            }
            None => {
                let _: () = conn.set(key, value).await?;
            }
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.write.connection().await?;
        let removed: usize = conn.del(key).await?;
        Ok(removed > 0)
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<usize, CacheError> {
        // Scan the write endpoint: replicas may lag behind the keys we must purge
        let mut conn = self.write.connection().await?;
        let pattern = format!("{}*", prefix);
        let mut cursor: u64 = 0;
        let mut deleted = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                let removed: usize = conn.del(&keys).await?;
                deleted += removed;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(deleted)
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

impl std::fmt::Debug for RedisBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBackend")
            .field("read", &self.read.client.get_connection_info().addr)
            .field("write", &self.write.client.get_connection_info().addr)
            .finish()
    }
}
