//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{DEFAULT_CACHE_TIMEOUT, DEFAULT_LIST_TTL_SECS};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Persistent store connection string
    pub database_url: String,
    /// Cache endpoint for reads; None selects the in-process backend
    pub cache_read_url: Option<String>,
    /// Cache endpoint for writes and purges
    pub cache_write_url: Option<String>,
    /// Webhook receiving error reports; None reports through the log only
    pub error_reporter_url: Option<String>,
    /// Expiry in seconds for cached listings
    pub list_cache_ttl: u64,
    /// Upper bound on any single cache call, in milliseconds
    pub cache_timeout_ms: u64,
    /// Capacity of the in-process cache backend
    pub cache_max_entries: usize,
    /// In-process expiry sweep interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `DATABASE_URL` - Store connection string (default: sqlite::memory:)
    /// - `CACHE_READ_URL` - Cache read endpoint (default: `REDIS_URL`, else none)
    /// - `CACHE_WRITE_URL` - Cache write endpoint (default: `REDIS_URL`, else the read endpoint)
    /// - `ERROR_REPORTER_URL` - Error webhook (default: none)
    /// - `LIST_CACHE_TTL` - Listing expiry in seconds (default: 600)
    /// - `CACHE_TIMEOUT_MS` - Per-call cache timeout (default: 250)
    /// - `CACHE_MAX_ENTRIES` - In-process cache capacity (default: 10000)
    /// - `CLEANUP_INTERVAL` - Expiry sweep frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let shared_url = non_empty("REDIS_URL");
        let cache_read_url = non_empty("CACHE_READ_URL").or_else(|| shared_url.clone());
        let cache_write_url = non_empty("CACHE_WRITE_URL")
            .or(shared_url)
            .or_else(|| cache_read_url.clone());

        Self {
            server_port: parsed("SERVER_PORT").unwrap_or(defaults.server_port),
            database_url: non_empty("DATABASE_URL").unwrap_or(defaults.database_url),
            cache_read_url,
            cache_write_url,
            error_reporter_url: non_empty("ERROR_REPORTER_URL"),
            list_cache_ttl: parsed("LIST_CACHE_TTL").unwrap_or(defaults.list_cache_ttl),
            cache_timeout_ms: parsed("CACHE_TIMEOUT_MS").unwrap_or(defaults.cache_timeout_ms),
            cache_max_entries: parsed("CACHE_MAX_ENTRIES").unwrap_or(defaults.cache_max_entries),
            cleanup_interval: parsed("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
        }
    }

    pub fn list_ttl(&self) -> Duration {
        Duration::from_secs(self.list_cache_ttl)
    }

    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            database_url: "sqlite::memory:".to_string(),
            cache_read_url: None,
            cache_write_url: None,
            error_reporter_url: None,
            list_cache_ttl: DEFAULT_LIST_TTL_SECS,
            cache_timeout_ms: DEFAULT_CACHE_TIMEOUT.as_millis() as u64,
            cache_max_entries: 10_000,
            cleanup_interval: 1,
        }
    }
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
