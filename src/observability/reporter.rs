//! Error Reporting
//!
//! Unhandled store failures and incomplete cache purges are reported here.
//! Reporting is fire-and-forget: a reporter that is down never slows or
//! fails the operation being reported.

use chrono::Utc;
use serde::Serialize;
use tracing::{error, warn};

/// Destination for errors worth a human's attention.
pub trait ErrorReporter: Send + Sync {
    /// Reports one error. `context` names the operation that failed.
    fn report(&self, context: &str, message: &str);
}

// == Log Reporter ==
/// Reports through the tracing subscriber only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, context: &str, message: &str) {
        error!(context, "{}", message);
    }
}

// == Webhook Reporter ==
/// Event body posted to the webhook.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEvent {
    pub service: &'static str,
    pub context: String,
    pub message: String,
    pub timestamp: String,
}

/// Posts each error as JSON to an HTTP endpoint, and logs it as well.
#[derive(Debug, Clone)]
pub struct WebhookReporter {
    client: reqwest::Client,
    url: String,
}

impl WebhookReporter {
    /// Creates a reporter posting to `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// Destination URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ErrorReporter for WebhookReporter {
    fn report(&self, context: &str, message: &str) {
        LogReporter.report(context, message);

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("No runtime available, error event for '{}' not sent", context);
            return;
        };

        let event = ErrorEvent {
            service: env!("CARGO_PKG_NAME"),
            context: context.to_string(),
            message: message.to_string(),
            timestamp: Utc::now().to_rfc3339(),
        };
        let request = self.client.post(&self.url).json(&event);

        handle.spawn(async move {
            match request.send().await {
                Ok(response) if !response.status().is_success() => {
                    warn!("Error reporter answered {}", response.status());
                }
                Ok(_) => {}
                Err(err) => warn!("Error reporter unreachable: {}", err),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_reporter_does_not_panic() {
        LogReporter.report("get_product", "database is locked");
    }

    #[test]
    fn test_webhook_without_runtime_is_a_no_op() {
        let reporter = WebhookReporter::new("http://127.0.0.1:1/errors");
        reporter.report("delete_product", "disk full");
        assert_eq!(reporter.url(), "http://127.0.0.1:1/errors");
    }

    #[tokio::test]
    async fn test_webhook_unreachable_destination_is_absorbed() {
        let reporter = WebhookReporter::new("http://127.0.0.1:1/errors");
        reporter.report("update_product", "constraint failed");
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    #[test]
    fn test_error_event_serialize() {
        let event = ErrorEvent {
            service: "catalog_cache",
            context: "invalidate_on_write".to_string(),
            message: "purge incomplete".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("invalidate_on_write"));
        assert!(json.contains("purge incomplete"));
    }
}
