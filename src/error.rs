//! Error types for the catalog service
//!
//! Provides unified error handling using thiserror. Only [`CatalogError`]
//! ever reaches the HTTP layer; [`CacheError`] is absorbed by the cache
//! client and [`StoreError`] is wrapped before it leaves the service.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::ProductId;

// == Catalog Error Enum ==
/// Errors surfaced by the catalog service to its callers.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Product id does not exist in the persistent store
    #[error("Product with id {0} not found")]
    NotFound(ProductId),

    /// Malformed create/update input or list filters
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Persistent store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

// == Store Error Enum ==
/// Failures of the persistent store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database driver or query failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be mapped back into a product
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

// == Cache Error Enum ==
/// Failures of the cache backend. Never crosses the cache client boundary.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Backend unreachable or returned a transport error
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    /// Backend call exceeded the configured timeout
    #[error("Cache call timed out after {0:?}")]
    Timeout(Duration),

    /// Cached value could not be (de)serialized
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::Unavailable(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            CatalogError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            CatalogError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            // Store details stay in the logs and the error reporter
            CatalogError::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
