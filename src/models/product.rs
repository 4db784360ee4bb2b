//! Product records and list pages
//!
//! A [`Product`] is owned by the persistent store and cached by value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::filters::ProductFilters;

/// Store-assigned product identifier.
pub type ProductId = i64;

// == Product ==
/// A catalog product as stored in the persistent store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique, immutable identifier
    pub id: ProductId,
    /// Display name
    pub name: String,
    /// Category name, matched case-insensitively by list filters
    pub category: String,
    /// Unit price, always finite and >= 0
    pub price: f64,
    /// Units in stock
    pub stock: u32,
    /// Free-form description, may be empty
    pub description: String,
    /// Whether the product can currently be ordered
    pub available: bool,
    /// Timestamp of the last write
    pub updated_at: DateTime<Utc>,
}

// == Product Page ==
/// One page of a filtered product listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    /// Products on this page, ordered by id
    pub results: Vec<Product>,
    /// Total number of products matching the filters
    pub count: u64,
    /// Number of pages for the current page size (at least 1)
    pub total_pages: u64,
    /// 1-based page number
    pub page: u32,
    /// Page size used to slice the results
    pub page_size: u32,
}

impl ProductPage {
    /// Builds a page from the sliced results and the total match count.
    pub fn new(results: Vec<Product>, count: u64, filters: &ProductFilters) -> Self {
        let page_size = filters.page_size();
        let total_pages = count.div_ceil(u64::from(page_size)).max(1);

        Self {
            results,
            count,
            total_pages,
            page: filters.page(),
            page_size,
        }
    }
}
