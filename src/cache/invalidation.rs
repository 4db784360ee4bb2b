//! Invalidation Coordinator
//!
//! Purges cache entries made stale by a product write. The detail entry of
//! the written product goes, and so does the whole listing namespace: any
//! filter combination might have matched the product, and membership per
//! filter is not tracked.
//!
//! A purge that fails part way does not fail the write. The store already
//! holds the truth; the failure is logged, counted and reported.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::{keys, CacheClient};
use crate::models::ProductId;
use crate::observability::{ErrorReporter, MetricsSink};

// == Invalidation Report ==
/// What a single invalidation pass managed to remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidationReport {
    /// Whether a cached detail entry existed and was removed
    pub detail_deleted: bool,
    /// Listing keys removed
    pub lists_deleted: usize,
    /// True when every delete reached the backend
    pub complete: bool,
}

// == Invalidation Coordinator ==
#[derive(Clone)]
pub struct InvalidationCoordinator {
    client: CacheClient,
    metrics: Arc<dyn MetricsSink>,
    reporter: Arc<dyn ErrorReporter>,
}

impl InvalidationCoordinator {
    pub fn new(
        client: CacheClient,
        metrics: Arc<dyn MetricsSink>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self {
            client,
            metrics,
            reporter,
        }
    }

    // == Invalidate On Write ==
    /// Purges the product's detail entry and every listing entry.
    ///
    /// Call after the store write has committed.
    pub async fn invalidate_on_write(&self, id: ProductId) -> InvalidationReport {
        let detail = self.client.delete(&keys::detail_key(id)).await;
        let lists = self.client.delete_prefix(&keys::list_prefix()).await;

        self.finish(
            &format!("product {}", id),
            InvalidationReport {
                detail_deleted: detail.deleted > 0,
                lists_deleted: lists.deleted,
                complete: detail.complete && lists.complete,
            },
        )
    }

    // == Invalidate Lists ==
    /// Purges every listing entry; used when a product is created.
    pub async fn invalidate_lists(&self) -> InvalidationReport {
        let lists = self.client.delete_prefix(&keys::list_prefix()).await;

        self.finish(
            "product listings",
            InvalidationReport {
                detail_deleted: false,
                lists_deleted: lists.deleted,
                complete: lists.complete,
            },
        )
    }

    fn finish(&self, target: &str, report: InvalidationReport) -> InvalidationReport {
        let deleted = report.lists_deleted + usize::from(report.detail_deleted);
        self.metrics.record_invalidation(deleted, report.complete);

        if report.complete {
            debug!(
                "Invalidated {} ({} listing keys removed)",
                target, report.lists_deleted
            );
        } else {
            warn!("Cache invalidation for {} incomplete: {:?}", target, report);
            self.reporter.report(
                "invalidate_on_write",
                &format!(
                    "Cache invalidation for {} incomplete; stale entries may be served \
                     until they expire or are purged again",
                    target
                ),
            );
        }

        report
    }
}

impl std::fmt::Debug for InvalidationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvalidationCoordinator")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}
