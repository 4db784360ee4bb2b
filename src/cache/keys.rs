//! Key Codec
//!
//! Deterministic cache keys for product details and product listings. Both
//! namespaces carry a format version so a change in key layout never reads
//! entries written under the old one.
//!
//! List keys embed a canonical fingerprint of the filters: parameters sorted
//! by name, values normalized, joined as `name=value` with `&`. Nothing is
//! hashed, so distinct filter sets always produce distinct keys.

use std::collections::BTreeMap;

use crate::models::{ProductFilters, ProductId};

/// Current key format version
pub const KEY_VERSION: u32 = 1;

/// Namespace for single-product entries
const DETAIL_NAMESPACE: &str = "product";

/// Namespace for listing entries
const LIST_NAMESPACE: &str = "product_list";

// == Detail Key ==
/// Key for a single product: `product:v1:{id}`.
pub fn detail_key(id: ProductId) -> String {
    format!("{}:v{}:{}", DETAIL_NAMESPACE, KEY_VERSION, id)
}

// == List Prefix ==
/// Prefix shared by every listing key: `product_list:v1:`.
pub fn list_prefix() -> String {
    format!("{}:v{}:", LIST_NAMESPACE, KEY_VERSION)
}

// == List Key ==
/// Key for a filtered listing: `product_list:v1:{canonical}`.
pub fn list_key(filters: &ProductFilters) -> String {
    format!("{}{}", list_prefix(), fingerprint(filters))
}

// == Fingerprint ==
/// Canonical string for a filter set.
///
/// Absent and blank parameters are omitted. Pagination is always present
/// after defaults are applied, so `{}` and `{page: 1}` share a fingerprint.
pub fn fingerprint(filters: &ProductFilters) -> String {
    let mut params: BTreeMap<&str, String> = BTreeMap::new();

    if let Some(category) = filters.category() {
        params.insert("category", escape(&category));
    }
    if let Some(min) = filters.price_min {
        params.insert("price_min", format_price(min));
    }
    if let Some(max) = filters.price_max {
        params.insert("price_max", format_price(max));
    }
    if let Some(available) = filters.available {
        params.insert("available", available.to_string());
    }
    params.insert("page", filters.page().to_string());
    params.insert("page_size", filters.page_size().to_string());

    params
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("&")
}

/// Shortest representation that parses back to the same `f64`.
///
/// Stores filter on the exact bound, so the key must not round it.
/// `-0` folds into `0`.
fn format_price(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

/// Percent-escapes the characters that delimit the fingerprint.
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '%' => out.push_str("%25"),
            '&' => out.push_str("%26"),
            '=' => out.push_str("%3D"),
            _ => out.push(c),
        }
    }
    out
}
