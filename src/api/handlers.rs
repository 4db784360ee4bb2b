//! API Handlers
//!
//! HTTP request handlers for the product catalog and its operational
//! endpoints. Handlers only translate between HTTP and [`CatalogService`].

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info, warn};

use crate::cache::{CacheBackend, CacheClient, MemoryBackend, RedisBackend};
use crate::catalog::{CatalogService, SqliteProductStore};
use crate::config::Config;
use crate::error::{CatalogError, Result};
use crate::models::{
    DataResponse, HealthResponse, NewProduct, Product, ProductFilters, ProductId, ProductPage,
    ProductPatch, StatsResponse,
};
use crate::observability::{ErrorReporter, LogReporter, PrometheusMetrics, WebhookReporter};

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Cached catalog operations
    pub catalog: CatalogService,
    /// Registry rendered at /metrics
    pub metrics: Arc<PrometheusMetrics>,
    /// In-process cache backend, when one is in use, for the expiry sweep
    pub memory_cache: Option<MemoryBackend>,
}

impl AppState {
    /// Creates a new AppState around an already wired service.
    pub fn new(catalog: CatalogService, metrics: Arc<PrometheusMetrics>) -> Self {
        Self {
            catalog,
            metrics,
            memory_cache: None,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Connects the store, picks the network or in-process cache backend
    /// and the error reporter. One cache client is built here and shared
    /// by every request.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let metrics = Arc::new(PrometheusMetrics::new().context("failed to register metrics")?);

        let reporter: Arc<dyn ErrorReporter> = match &config.error_reporter_url {
            Some(url) => {
                info!("Reporting errors to {}", url);
                Arc::new(WebhookReporter::new(url.clone()))
            }
            None => Arc::new(LogReporter),
        };

        let mut memory_cache = None;
        let read_url = config
            .cache_read_url
            .as_deref()
            .or(config.cache_write_url.as_deref());
        let backend: Arc<dyn CacheBackend> = match read_url {
            Some(read_url) => {
                let write_url = config.cache_write_url.as_deref().unwrap_or(read_url);
                let redis = RedisBackend::new(read_url, write_url)
                    .context("invalid cache endpoint URL")?;
                info!("Using network cache backend: {:?}", redis);
                Arc::new(redis)
            }
            None => {
                warn!("No cache endpoint configured, using in-process cache");
                let memory = MemoryBackend::new(config.cache_max_entries);
                memory_cache = Some(memory.clone());
                Arc::new(memory)
            }
        };

        let store = SqliteProductStore::connect(&config.database_url)
            .await
            .with_context(|| format!("failed to open product store {}", config.database_url))?;

        let client = CacheClient::with_timeout(backend, config.cache_timeout());
        let catalog = CatalogService::new(Arc::new(store), client, metrics.clone(), reporter)
            .with_list_ttl(config.list_ttl());

        Ok(Self {
            catalog,
            metrics,
            memory_cache,
        })
    }
}

fn parse_id(raw: &str) -> Result<ProductId> {
    raw.parse()
        .map_err(|_| CatalogError::Validation(format!("Invalid product id '{}'", raw)))
}

/// Handler for GET /api/products
///
/// Query parameters are read as raw pairs so duplicates can be rejected.
pub async fn list_products_handler(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<DataResponse<ProductPage>>> {
    let filters = ProductFilters::from_pairs(params).map_err(CatalogError::Validation)?;
    let lookup = state.catalog.list_products(&filters).await?;
    Ok(Json(lookup.into()))
}

/// Handler for GET /api/products/:id
pub async fn get_product_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<Product>>> {
    let lookup = state.catalog.get_product(parse_id(&id)?).await?;
    Ok(Json(lookup.into()))
}

/// Handler for POST /api/products
pub async fn create_product_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewProduct>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>)> {
    let Json(product) = payload.map_err(|rej| CatalogError::Validation(rej.body_text()))?;
    let created = state.catalog.create_product(product).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Handler for PUT and PATCH /api/products/:id
///
/// Both methods take a partial body; absent fields keep their value.
pub async fn update_product_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<ProductPatch>, JsonRejection>,
) -> Result<Json<Product>> {
    let id = parse_id(&id)?;
    let Json(patch) = payload.map_err(|rej| CatalogError::Validation(rej.body_text()))?;
    let updated = state.catalog.update_product(id, patch).await?;
    Ok(Json(updated))
}

/// Handler for DELETE /api/products/:id
pub async fn delete_product_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.catalog.delete_product(parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /stats
///
/// Returns cache client counters since startup.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let client = state.catalog.cache_client();
    Json(StatsResponse::new(&client.stats(), client.backend_name()))
}

/// Handler for GET /metrics
pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => {
            warn!("Failed to render metrics: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
