//! Catalog Service
//!
//! The five product operations. Reads go through the cache; writes go to
//! the store first and then purge whatever they made stale. Every call is
//! timed and counted with its cache outcome.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{error, info};

use super::store::ProductStore;
use crate::cache::{
    keys, CacheClient, InvalidationCoordinator, Lookup, ReadThroughCache, DEFAULT_LIST_TTL_SECS,
};
use crate::error::{CatalogError, Result, StoreError};
use crate::models::{NewProduct, Product, ProductFilters, ProductId, ProductPage, ProductPatch};
use crate::observability::{ErrorReporter, MetricsSink};

// == Catalog Service ==
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn ProductStore>,
    cache: ReadThroughCache,
    invalidation: InvalidationCoordinator,
    metrics: Arc<dyn MetricsSink>,
    reporter: Arc<dyn ErrorReporter>,
    list_ttl: Duration,
}

impl CatalogService {
    /// Wires the service over a store and a shared cache client.
    pub fn new(
        store: Arc<dyn ProductStore>,
        client: CacheClient,
        metrics: Arc<dyn MetricsSink>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self {
            store,
            cache: ReadThroughCache::new(client.clone()),
            invalidation: InvalidationCoordinator::new(client, metrics.clone(), reporter.clone()),
            metrics,
            reporter,
            list_ttl: Duration::from_secs(DEFAULT_LIST_TTL_SECS),
        }
    }

    /// Overrides the expiry of cached listings.
    pub fn with_list_ttl(mut self, ttl: Duration) -> Self {
        self.list_ttl = ttl;
        self
    }

    /// The cache client shared by reads and invalidation.
    pub fn cache_client(&self) -> &CacheClient {
        self.cache.client()
    }

    // == List Products ==
    /// Returns one page of products matching `filters`.
    ///
    /// Listings are cached per canonical filter set and expire after the
    /// list TTL even if no write purges them first.
    pub async fn list_products(&self, filters: &ProductFilters) -> Result<Lookup<ProductPage>> {
        if let Some(message) = filters.validate() {
            return Err(CatalogError::Validation(message));
        }

        let started = Instant::now();
        let result = self
            .cache
            .get_or_load(&keys::list_key(filters), Some(self.list_ttl), || async {
                self.store
                    .query(filters)
                    .await
                    .map_err(|err| self.store_failure("list_products", err))
            })
            .await;

        self.observe("list_products", started, hit(&result));
        result
    }

    // == Get Product ==
    /// Returns one product. A missing id is never cached.
    pub async fn get_product(&self, id: ProductId) -> Result<Lookup<Product>> {
        let started = Instant::now();
        let result = self
            .cache
            .get_or_load(&keys::detail_key(id), None, || async {
                self.store
                    .find(id)
                    .await
                    .map_err(|err| self.store_failure("get_product", err))?
                    .ok_or(CatalogError::NotFound(id))
            })
            .await;

        self.observe("get_product", started, hit(&result));
        result
    }

    // == Create Product ==
    pub async fn create_product(&self, product: NewProduct) -> Result<Product> {
        if let Some(message) = product.validate() {
            return Err(CatalogError::Validation(message));
        }

        let started = Instant::now();
        let created = self
            .store
            .insert(product)
            .await
            .map_err(|err| self.store_failure("create_product", err))?;

        // A new product can only show up in listings
        self.invalidation.invalidate_lists().await;

        self.observe("create_product", started, false);
        Ok(created)
    }

    // == Update Product ==
    /// Applies `patch` and purges the product's cached detail and every
    /// cached listing before returning.
    pub async fn update_product(&self, id: ProductId, patch: ProductPatch) -> Result<Product> {
        if let Some(message) = patch.validate() {
            return Err(CatalogError::Validation(message));
        }

        let started = Instant::now();
        let updated = self
            .store
            .update(id, &patch)
            .await
            .map_err(|err| self.store_failure("update_product", err))?
            .ok_or(CatalogError::NotFound(id))?;

        self.invalidation.invalidate_on_write(id).await;

        self.observe("update_product", started, false);
        Ok(updated)
    }

    // == Delete Product ==
    pub async fn delete_product(&self, id: ProductId) -> Result<()> {
        let started = Instant::now();
        let removed = self
            .store
            .remove(id)
            .await
            .map_err(|err| self.store_failure("delete_product", err))?;
        if !removed {
            return Err(CatalogError::NotFound(id));
        }

        self.invalidation.invalidate_on_write(id).await;

        self.observe("delete_product", started, false);
        Ok(())
    }

    fn observe(&self, method: &str, started: Instant, cache_hit: bool) {
        let elapsed = started.elapsed();
        self.metrics.record_call(method, cache_hit, elapsed);
        info!(
            method,
            cache_hit,
            "{} took {:.2}ms",
            method,
            elapsed.as_secs_f64() * 1000.0
        );
    }

    fn store_failure(&self, context: &str, err: StoreError) -> CatalogError {
        error!("{} failed: {}", context, err);
        self.reporter.report(context, &err.to_string());
        CatalogError::Store(err)
    }
}

fn hit<T>(result: &Result<Lookup<T>>) -> bool {
    result.as_ref().map(|lookup| lookup.cache_hit).unwrap_or(false)
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("cache", &self.cache)
            .field("list_ttl", &self.list_ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheBackend, MemoryBackend};
    use crate::catalog::MemoryProductStore;
    use crate::error::CacheError;
    use crate::observability::{LogReporter, PrometheusMetrics};
    use async_trait::async_trait;

    struct Harness {
        service: CatalogService,
        backend: MemoryBackend,
        metrics: Arc<PrometheusMetrics>,
    }

    fn harness() -> Harness {
        let backend = MemoryBackend::new(1_000);
        let metrics = Arc::new(PrometheusMetrics::new().unwrap());
        let service = CatalogService::new(
            Arc::new(MemoryProductStore::new()),
            CacheClient::new(Arc::new(backend.clone())),
            metrics.clone(),
            Arc::new(LogReporter),
        );
        Harness {
            service,
            backend,
            metrics,
        }
    }

    fn books() -> ProductFilters {
        ProductFilters {
            category: Some("books".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_shows_up_in_cached_listing() {
        let h = harness();

        let before = h.service.list_products(&books()).await.unwrap();
        assert!(before.value.results.is_empty());
        assert!(!before.cache_hit);
        assert!(h.service.list_products(&books()).await.unwrap().cache_hit);

        let created = h
            .service
            .create_product(NewProduct::new("Book", "Books", 150.0))
            .await
            .unwrap();

        let after = h.service.list_products(&books()).await.unwrap();
        assert!(!after.cache_hit);
        assert_eq!(after.value.results, vec![created]);
    }

    #[tokio::test]
    async fn test_update_is_visible_on_next_get() {
        let h = harness();
        let created = h
            .service
            .create_product(NewProduct::new("Book", "Books", 150.0))
            .await
            .unwrap();

        assert_eq!(h.service.get_product(created.id).await.unwrap().value.price, 150.0);
        assert!(h.service.get_product(created.id).await.unwrap().cache_hit);

        h.service
            .update_product(created.id, ProductPatch::price(200.0))
            .await
            .unwrap();

        let fresh = h.service.get_product(created.id).await.unwrap();
        assert_eq!(fresh.value.price, 200.0);
        assert!(!fresh.cache_hit);
    }

    #[tokio::test]
    async fn test_update_purges_every_listing() {
        let h = harness();
        let created = h
            .service
            .create_product(NewProduct::new("Book", "Books", 150.0))
            .await
            .unwrap();
        h.service.list_products(&books()).await.unwrap();
        h.service
            .list_products(&ProductFilters::default())
            .await
            .unwrap();
        assert_eq!(h.backend.len().await, 2);

        h.service
            .update_product(created.id, ProductPatch::price(99.0))
            .await
            .unwrap();

        assert_eq!(h.backend.len().await, 0);
        let listing = h.service.list_products(&books()).await.unwrap();
        assert_eq!(listing.value.results[0].price, 99.0);
    }

    #[tokio::test]
    async fn test_close_price_bounds_do_not_share_cached_listing() {
        let h = harness();
        h.service
            .create_product(NewProduct::new("Pen", "Office", 10.002))
            .await
            .unwrap();

        let lower = ProductFilters {
            price_min: Some(10.001),
            ..Default::default()
        };
        let higher = ProductFilters {
            price_min: Some(10.004),
            ..Default::default()
        };

        assert_eq!(h.service.list_products(&lower).await.unwrap().value.count, 1);
        let listing = h.service.list_products(&higher).await.unwrap();
        assert!(!listing.cache_hit);
        assert_eq!(listing.value.count, 0);
    }

    #[tokio::test]
    async fn test_missing_product_is_not_found_and_not_cached() {
        let h = harness();

        for _ in 0..2 {
            let err = h.service.get_product(999).await.unwrap_err();
            assert!(matches!(err, CatalogError::NotFound(999)));
        }
        assert!(!h.backend.contains(&keys::detail_key(999)).await);
    }

    #[tokio::test]
    async fn test_delete_removes_product_and_cache_entries() {
        let h = harness();
        let created = h
            .service
            .create_product(NewProduct::new("Book", "Books", 1.0))
            .await
            .unwrap();
        h.service.get_product(created.id).await.unwrap();

        h.service.delete_product(created.id).await.unwrap();

        assert!(!h.backend.contains(&keys::detail_key(created.id)).await);
        assert!(matches!(
            h.service.get_product(created.id).await,
            Err(CatalogError::NotFound(_))
        ));
        assert!(matches!(
            h.service.delete_product(created.id).await,
            Err(CatalogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_input_never_touches_cache_or_store() {
        let h = harness();

        let bad_filters = ProductFilters {
            price_min: Some(-1.0),
            ..Default::default()
        };
        assert!(matches!(
            h.service.list_products(&bad_filters).await,
            Err(CatalogError::Validation(_))
        ));
        assert!(matches!(
            h.service.create_product(NewProduct::new("", "Books", 1.0)).await,
            Err(CatalogError::Validation(_))
        ));
        assert!(matches!(
            h.service.update_product(1, ProductPatch::default()).await,
            Err(CatalogError::Validation(_))
        ));

        assert_eq!(h.backend.len().await, 0);
        assert_eq!(h.service.cache_client().stats().misses, 0);
    }

    #[tokio::test]
    async fn test_metrics_record_cache_outcome() {
        let h = harness();
        let created = h
            .service
            .create_product(NewProduct::new("Book", "Books", 1.0))
            .await
            .unwrap();
        h.service.get_product(created.id).await.unwrap();
        h.service.get_product(created.id).await.unwrap();

        assert_eq!(h.metrics.request_count("get_product", false), 1);
        assert_eq!(h.metrics.request_count("get_product", true), 1);
        assert_eq!(h.metrics.request_count("create_product", false), 1);
    }

    struct DownBackend;

    #[async_trait]
    impl CacheBackend for DownBackend {
        async fn get(&self, _key: &str) -> std::result::Result<Option<String>, CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }

        async fn set(
            &self,
            _key: &str,
            _value: &str,
            _ttl: Option<Duration>,
        ) -> std::result::Result<(), CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }

        async fn delete(&self, _key: &str) -> std::result::Result<bool, CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }

        async fn delete_prefix(&self, _prefix: &str) -> std::result::Result<usize, CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }

        fn name(&self) -> &'static str {
            "down"
        }
    }

    #[tokio::test]
    async fn test_cache_outage_is_invisible_to_callers() {
        let service = CatalogService::new(
            Arc::new(MemoryProductStore::new()),
            CacheClient::new(Arc::new(DownBackend)),
            Arc::new(PrometheusMetrics::new().unwrap()),
            Arc::new(LogReporter),
        );

        let created = service
            .create_product(NewProduct::new("Book", "Books", 150.0))
            .await
            .unwrap();
        let listing = service.list_products(&books()).await.unwrap();
        assert_eq!(listing.value.results, vec![created.clone()]);
        assert!(!listing.cache_hit);

        service
            .update_product(created.id, ProductPatch::price(200.0))
            .await
            .unwrap();
        assert_eq!(service.get_product(created.id).await.unwrap().value.price, 200.0);

        service.delete_product(created.id).await.unwrap();
        assert!(service.cache_client().stats().errors > 0);
    }
}
