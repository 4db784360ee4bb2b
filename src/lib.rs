//! Catalog Cache - A product catalog API with a read-through cache
//!
//! Reads are served from a shared cache when possible and fall back to the
//! persistent store; every write purges the entries it made stale.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod observability;
pub mod tasks;

pub use api::{create_router, AppState};
pub use catalog::CatalogService;
pub use config::Config;
pub use tasks::spawn_cleanup_task;
