//! Service Metrics
//!
//! Counters and latency histograms for catalog operations, labeled by
//! method and whether the cache answered. Recording never blocks and never
//! fails the caller.

use std::time::Duration;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Sink for operation metrics.
pub trait MetricsSink: Send + Sync {
    /// Records one catalog operation.
    fn record_call(&self, method: &str, cache_hit: bool, elapsed: Duration);

    /// Records one invalidation pass.
    fn record_invalidation(&self, deleted: usize, complete: bool);
}

// == Prometheus Metrics ==
/// [`MetricsSink`] backed by an instance-owned Prometheus registry.
#[derive(Clone)]
pub struct PrometheusMetrics {
    registry: Registry,
    requests: IntCounterVec,
    latency: HistogramVec,
    invalidations: IntCounterVec,
    purged_keys: IntCounterVec,
}

impl PrometheusMetrics {
    /// Creates and registers all catalog metrics.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new(
                "catalog_product_requests_total",
                "Total product service calls, labeled by method and cache_hit",
            ),
            &["method", "cache_hit"],
        )?;
        let latency = HistogramVec::new(
            HistogramOpts::new(
                "catalog_product_latency_seconds",
                "Latency of product service calls, labeled by method and cache_hit",
            )
            .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["method", "cache_hit"],
        )?;
        let invalidations = IntCounterVec::new(
            Opts::new(
                "catalog_cache_invalidations_total",
                "Cache invalidation passes, labeled by outcome",
            ),
            &["outcome"],
        )?;
        let purged_keys = IntCounterVec::new(
            Opts::new(
                "catalog_cache_purged_keys_total",
                "Cache keys removed by invalidation",
            ),
            &["namespace"],
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(latency.clone()))?;
        registry.register(Box::new(invalidations.clone()))?;
        registry.register(Box::new(purged_keys.clone()))?;

        Ok(Self {
            registry,
            requests,
            latency,
            invalidations,
            purged_keys,
        })
    }

    // == Render ==
    /// Encodes every metric in the Prometheus text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    /// Current count for one method/cache_hit pair.
    pub fn request_count(&self, method: &str, cache_hit: bool) -> u64 {
        self.requests
            .with_label_values(&[method, bool_label(cache_hit)])
            .get()
    }

    /// Total cache keys removed by invalidation.
    pub fn purged_key_count(&self) -> u64 {
        self.purged_keys.with_label_values(&["product"]).get()
    }
}

impl MetricsSink for PrometheusMetrics {
    fn record_call(&self, method: &str, cache_hit: bool, elapsed: Duration) {
        let labels = [method, bool_label(cache_hit)];
        self.requests.with_label_values(&labels).inc();
        self.latency
            .with_label_values(&labels)
            .observe(elapsed.as_secs_f64());
    }

    fn record_invalidation(&self, deleted: usize, complete: bool) {
        let outcome = if complete { "complete" } else { "partial" };
        self.invalidations.with_label_values(&[outcome]).inc();
        self.purged_keys
            .with_label_values(&["product"])
            .inc_by(deleted as u64);
    }
}

impl std::fmt::Debug for PrometheusMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusMetrics").finish_non_exhaustive()
    }
}

fn bool_label(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
