//! Observability Module
//!
//! Metrics and error reporting collaborators of the catalog service.

mod metrics;
mod reporter;

pub use metrics::{MetricsSink, PrometheusMetrics};
pub use reporter::{ErrorEvent, ErrorReporter, LogReporter, WebhookReporter};
