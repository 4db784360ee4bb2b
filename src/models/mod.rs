//! Domain records and request/response models for the catalog API
//!
//! This module defines the product record, list filters, and the DTOs
//! used for serializing/deserializing HTTP request and response bodies.

pub mod filters;
pub mod product;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use filters::{category_key, ProductFilters};
pub use product::{Product, ProductId, ProductPage};
pub use requests::{NewProduct, ProductPatch};
pub use responses::{DataResponse, HealthResponse, StatsResponse};
