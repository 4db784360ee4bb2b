//! List filters
//!
//! Filters arrive either as a typed struct or as raw query-string pairs in
//! any order. Both paths produce the same [`ProductFilters`], which the key
//! codec then turns into a canonical fingerprint.

use serde::{Deserialize, Serialize};

use super::product::Product;

// == Public Constants ==
/// Page returned when none is requested
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when none is requested
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page size a caller may request
pub const MAX_PAGE_SIZE: u32 = 100;

// == Product Filters ==
/// Filter and pagination parameters for product listings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductFilters {
    /// Category name, case-insensitive exact match
    pub category: Option<String>,
    /// Inclusive lower price bound
    pub price_min: Option<f64>,
    /// Inclusive upper price bound
    pub price_max: Option<f64>,
    /// Availability flag
    pub available: Option<bool>,
    /// 1-based page number
    pub page: Option<u32>,
    /// Number of products per page
    pub page_size: Option<u32>,
}

impl ProductFilters {
    // == From Pairs ==
    /// Parses raw `name=value` query pairs.
    ///
    /// Unknown parameters are ignored and blank values count as absent.
    /// A parameter given twice is rejected so that the result never depends
    /// on the order of the pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filters = Self::default();
        let mut seen: Vec<String> = Vec::new();

        for (name, value) in pairs {
            let name = name.as_ref();
            let value = value.as_ref().trim();

            if !matches!(
                name,
                "category" | "price_min" | "price_max" | "available" | "page" | "page_size"
            ) {
                continue;
            }
            if seen.iter().any(|s| s == name) {
                return Err(format!("Parameter '{}' given more than once", name));
            }
            seen.push(name.to_string());

            if value.is_empty() {
                continue;
            }

            match name {
                "category" => filters.category = Some(value.to_string()),
                "price_min" => filters.price_min = Some(parse_number(name, value)?),
                "price_max" => filters.price_max = Some(parse_number(name, value)?),
                "available" => filters.available = Some(parse_flag(name, value)?),
                "page" => filters.page = Some(parse_count(name, value)?),
                "page_size" => filters.page_size = Some(parse_count(name, value)?),
                _ => {}
            }
        }

        Ok(filters)
    }

    // == Validate ==
    /// Returns an error message if the filters are unusable, None if valid.
    pub fn validate(&self) -> Option<String> {
        for (name, bound) in [("price_min", self.price_min), ("price_max", self.price_max)] {
            if let Some(value) = bound {
                if !value.is_finite() || value < 0.0 {
                    return Some(format!("'{}' must be a non-negative number", name));
                }
            }
        }
        if self.page == Some(0) {
            return Some("'page' must be at least 1".to_string());
        }
        match self.page_size {
            Some(0) => Some("'page_size' must be at least 1".to_string()),
            Some(size) if size > MAX_PAGE_SIZE => Some(format!(
                "'page_size' must not exceed {}",
                MAX_PAGE_SIZE
            )),
            _ => None,
        }
    }

    /// Normalized category: trimmed, lowercased, None when blank.
    pub fn category(&self) -> Option<String> {
        self.category
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .map(category_key)
    }

    /// Requested page, defaulting to the first.
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(DEFAULT_PAGE)
    }

    /// Requested page size, defaulting to [`DEFAULT_PAGE_SIZE`].
    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Number of matching products to skip before the requested page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(self.page_size())
    }

    // == Matches ==
    /// Checks whether a product satisfies every present filter.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = self.category() {
            if category_key(&product.category) != category {
                return false;
            }
        }
        if self.price_min.is_some_and(|min| product.price < min) {
            return false;
        }
        if self.price_max.is_some_and(|max| product.price > max) {
            return false;
        }
        if self.available.is_some_and(|flag| product.available != flag) {
            return false;
        }
        true
    }
}

// == Category Key ==
/// Case-folded form of a category used for filtering and cache keys.
///
/// Stores compare against this value rather than folding in the query
/// language, so every store matches the same set of products.
pub fn category_key(category: &str) -> String {
    category.trim().to_lowercase()
}

// == Parsing Helpers ==
fn parse_number(name: &str, value: &str) -> Result<f64, String> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("'{}' must be a number, got '{}'", name, value))
}

fn parse_count(name: &str, value: &str) -> Result<u32, String> {
    value
        .parse::<u32>()
        .map_err(|_| format!("'{}' must be a positive integer, got '{}'", name, value))
}

fn parse_flag(name: &str, value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(format!("'{}' must be true or false, got '{}'", name, value)),
    }
}
