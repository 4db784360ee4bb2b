//! Response DTOs for the catalog API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{CacheStats, Lookup};

/// Envelope for cached reads (GET /api/products, GET /api/products/:id)
///
/// `cache_hit` reports whether the data was served from the cache.
#[derive(Debug, Clone, Serialize)]
pub struct DataResponse<T> {
    /// The requested data
    pub data: T,
    /// True when served from the cache
    pub cache_hit: bool,
}

impl<T> From<Lookup<T>> for DataResponse<T> {
    fn from(lookup: Lookup<T>) -> Self {
        Self {
            data: lookup.value,
            cache_hit: lookup.cache_hit,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of cache backend failures absorbed by the client
    pub errors: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Name of the cache backend in use
    pub backend: String,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache client statistics
    pub fn new(stats: &CacheStats, backend: impl Into<String>) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            errors: stats.errors,
            hit_rate: stats.hit_rate(),
            backend: backend.into(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
