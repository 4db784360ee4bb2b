//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use catalog_cache::cache::{CacheBackend, CacheClient};
use catalog_cache::catalog::{CatalogService, MemoryProductStore};
use catalog_cache::error::CacheError;
use catalog_cache::observability::{LogReporter, PrometheusMetrics};
use catalog_cache::{create_router, AppState, Config};

/// Cache backend whose every call fails, as an unreachable server would.
pub struct FailingBackend;

#[async_trait]
impl CacheBackend for FailingBackend {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Option<Duration>) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn delete(&self, _key: &str) -> Result<bool, CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn delete_prefix(&self, _prefix: &str) -> Result<usize, CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Cache backend that never answers within the client timeout.
pub struct HangingBackend;

#[async_trait]
impl CacheBackend for HangingBackend {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        std::future::pending().await
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Option<Duration>) -> Result<(), CacheError> {
        std::future::pending().await
    }

    async fn delete(&self, _key: &str) -> Result<bool, CacheError> {
        std::future::pending().await
    }

    async fn delete_prefix(&self, _prefix: &str) -> Result<usize, CacheError> {
        std::future::pending().await
    }

    fn name(&self) -> &'static str {
        "hanging"
    }
}

/// App over SQLite in memory and the in-process cache, as with no config.
pub async fn create_test_app() -> Router {
    let state = AppState::from_config(&Config::default()).await.unwrap();
    create_router(state)
}

/// Service over an in-memory store and the given cache backend.
pub fn service_with_backend(backend: Arc<dyn CacheBackend>) -> CatalogService {
    CatalogService::new(
        Arc::new(MemoryProductStore::new()),
        CacheClient::with_timeout(backend, Duration::from_millis(50)),
        Arc::new(PrometheusMetrics::new().unwrap()),
        Arc::new(LogReporter),
    )
}

/// App over an in-memory store and the given cache backend.
pub fn app_with_backend(backend: Arc<dyn CacheBackend>) -> Router {
    let metrics = Arc::new(PrometheusMetrics::new().unwrap());
    let catalog = CatalogService::new(
        Arc::new(MemoryProductStore::new()),
        CacheClient::with_timeout(backend, Duration::from_millis(50)),
        metrics.clone(),
        Arc::new(LogReporter),
    );
    create_router(AppState::new(catalog, metrics))
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> Response<Body> {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    app.clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap()
}

pub async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
