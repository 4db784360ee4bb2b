//! API Module
//!
//! HTTP handlers and routing for the catalog REST API.
//!
//! # Endpoints
//! - `GET /api/products` - List products
//! - `POST /api/products` - Create a product
//! - `GET|PUT|PATCH|DELETE /api/products/:id` - Product detail and writes
//! - `GET /stats` - Cache statistics
//! - `GET /metrics` - Prometheus metrics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
