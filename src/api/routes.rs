//! API Routes
//!
//! Configures the Axum router with the catalog and operational endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    create_product_handler, delete_product_handler, get_product_handler, health_handler,
    list_products_handler, metrics_handler, stats_handler, update_product_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /api/products` - Filtered, paginated product listing
/// - `POST /api/products` - Create a product
/// - `GET /api/products/:id` - Product detail
/// - `PUT|PATCH /api/products/:id` - Update a product
/// - `DELETE /api/products/:id` - Delete a product
/// - `GET /stats` - Cache client statistics
/// - `GET /metrics` - Prometheus exposition
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs every request with its latency
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/api/products",
            get(list_products_handler).post(create_product_handler),
        )
        .route(
            "/api/products/:id",
            get(get_product_handler)
                .put(update_product_handler)
                .patch(update_product_handler)
                .delete(delete_product_handler),
        )
        .route("/stats", get(stats_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
