//! Catalog Module
//!
//! Product storage and the cached catalog operations built on it.

mod service;
mod sqlite;
mod store;

pub use service::CatalogService;
pub use sqlite::SqliteProductStore;
pub use store::{MemoryProductStore, ProductStore};
