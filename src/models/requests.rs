//! Request DTOs for the catalog API
//!
//! Defines the structure of incoming create and update bodies.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::product::{Product, ProductId};

// == Field Limits ==
const MAX_NAME_LENGTH: usize = 200;
const MAX_CATEGORY_LENGTH: usize = 100;

/// Request body for creating a product (POST /api/products)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    /// Display name
    pub name: String,
    /// Category name
    pub category: String,
    /// Unit price
    pub price: f64,
    /// Units in stock
    #[serde(default)]
    pub stock: u32,
    /// Optional description
    #[serde(default)]
    pub description: String,
    /// Defaults to available
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

impl NewProduct {
    /// Convenience constructor with default stock, description and availability.
    pub fn new(name: impl Into<String>, category: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            price,
            stock: 0,
            description: String::new(),
            available: true,
        }
    }

    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_name(&self.name)
            .or_else(|| validate_category(&self.category))
            .or_else(|| validate_price(self.price))
    }

    /// Builds the stored record once the store has assigned an id.
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name.trim().to_string(),
            category: self.category.trim().to_string(),
            price: self.price,
            stock: self.stock,
            description: self.description,
            available: self.available,
            updated_at: Utc::now(),
        }
    }
}

/// Request body for updating a product (PUT/PATCH /api/products/:id)
///
/// Only the fields present in the body are changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub available: Option<bool>,
}

impl ProductPatch {
    /// Patch that only changes the price.
    pub fn price(price: f64) -> Self {
        Self {
            price: Some(price),
            ..Default::default()
        }
    }

    /// True when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.description.is_none()
            && self.available.is_none()
    }

    /// Validates the present fields.
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.is_empty() {
            return Some("Update must change at least one field".to_string());
        }
        self.name
            .as_deref()
            .and_then(validate_name)
            .or_else(|| self.category.as_deref().and_then(validate_category))
            .or_else(|| self.price.and_then(validate_price))
    }

    // == Apply ==
    /// Applies the present fields to a product and refreshes its timestamp.
    pub fn apply(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.trim().to_string();
        }
        if let Some(category) = &self.category {
            product.category = category.trim().to_string();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
        if let Some(available) = self.available {
            product.available = available;
        }
        product.updated_at = Utc::now();
    }
}

// == Field Validation ==
fn validate_name(name: &str) -> Option<String> {
    let name = name.trim();
    if name.is_empty() {
        return Some("'name' is required".to_string());
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Some(format!(
            "'name' exceeds maximum length of {} characters",
            MAX_NAME_LENGTH
        ));
    }
    None
}

fn validate_category(category: &str) -> Option<String> {
    let category = category.trim();
    if category.is_empty() {
        return Some("'category' is required".to_string());
    }
    if category.chars().count() > MAX_CATEGORY_LENGTH {
        return Some(format!(
            "'category' exceeds maximum length of {} characters",
            MAX_CATEGORY_LENGTH
        ));
    }
    None
}

fn validate_price(price: f64) -> Option<String> {
    if !price.is_finite() || price < 0.0 {
        return Some("'price' must be a non-negative number".to_string());
    }
    None
}
