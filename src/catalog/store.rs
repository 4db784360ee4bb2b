//! Persistent Store Port
//!
//! The authoritative home of product records. The cache only ever holds
//! copies of what a [`ProductStore`] returns.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::models::{NewProduct, Product, ProductFilters, ProductId, ProductPage, ProductPatch};

/// Durable product storage.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Point lookup.
    async fn find(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Filtered, paginated listing ordered by id.
    async fn query(&self, filters: &ProductFilters) -> Result<ProductPage, StoreError>;

    /// Inserts a product and returns it with its assigned id.
    async fn insert(&self, product: NewProduct) -> Result<Product, StoreError>;

    /// Applies a patch, returning the updated product or None if absent.
    async fn update(
        &self,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, StoreError>;

    /// Removes a product, returning whether it existed.
    async fn remove(&self, id: ProductId) -> Result<bool, StoreError>;
}

// == Memory Product Store ==
/// Product store held in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryProductStore {
    inner: Arc<RwLock<MemoryTable>>,
}

#[derive(Debug, Default)]
struct MemoryTable {
    rows: BTreeMap<ProductId, Product>,
    last_id: ProductId,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn find(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn query(&self, filters: &ProductFilters) -> Result<ProductPage, StoreError> {
        let table = self.inner.read().await;
        let matching: Vec<&Product> = table
            .rows
            .values()
            .filter(|product| filters.matches(product))
            .collect();

        let count = matching.len() as u64;
        let results = matching
            .into_iter()
            .skip(filters.offset() as usize)
            .take(filters.page_size() as usize)
            .cloned()
            .collect();

        Ok(ProductPage::new(results, count, filters))
    }

    async fn insert(&self, product: NewProduct) -> Result<Product, StoreError> {
        let mut table = self.inner.write().await;
        table.last_id += 1;
        let product = product.into_product(table.last_id);
        table.rows.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update(
        &self,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, StoreError> {
        let mut table = self.inner.write().await;
        Ok(table.rows.get_mut(&id).map(|product| {
            patch.apply(product);
            product.clone()
        }))
    }

    async fn remove(&self, id: ProductId) -> Result<bool, StoreError> {
        Ok(self.inner.write().await.rows.remove(&id).is_some())
    }
}
