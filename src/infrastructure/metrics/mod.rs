//! Prometheus Metrics Module
//!
//! Application-wide metrics collection.
//!
//! # Metrics Collected
//! - HTTP request counts by method, path, and status
//! - HTTP request latency histograms
//! - Active chat websocket connection gauge
//! - Notification email counter by kind and outcome

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// HTTP request counter - tracks total requests by method, path, and status code
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests").namespace("kportal"),
        &["method", "path", "status"],
    )
    .expect("Failed to create HTTP_REQUESTS_TOTAL metric")
});

/// HTTP request latency histogram - tracks request duration in seconds
pub static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets = vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];
    HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        )
        .namespace("kportal")
        .buckets(buckets),
        &["method", "path"],
    )
    .expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric")
});

/// Active chat websocket connections
pub static CHAT_CONNECTIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new(
            "chat_connections_active",
            "Number of active chat websocket connections",
        )
        .namespace("kportal"),
    )
    .expect("Failed to create CHAT_CONNECTIONS_ACTIVE metric")
});

/// Notification email counter by kind ("password_reset", "follower",
/// "comment") and outcome ("sent", "failed", "skipped")
pub static NOTIFICATION_EMAILS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("notification_emails_total", "Notification emails by outcome")
            .namespace("kportal"),
        &["kind", "outcome"],
    )
    .expect("Failed to create NOTIFICATION_EMAILS_TOTAL metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .expect("Failed to register HTTP_REQUESTS_TOTAL");
    registry
        .register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))
        .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");
    registry
        .register(Box::new(CHAT_CONNECTIONS_ACTIVE.clone()))
        .expect("Failed to register CHAT_CONNECTIONS_ACTIVE");
    registry
        .register(Box::new(NOTIFICATION_EMAILS_TOTAL.clone()))
        .expect("Failed to register NOTIFICATION_EMAILS_TOTAL");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .expect("Failed to encode metrics");
    String::from_utf8(buffer).expect("Metrics should be valid UTF-8")
}

/// Helper to record HTTP request metrics
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration_secs);
}

/// Helper to record a notification email outcome
pub fn record_notification_email(kind: &str, outcome: &str) {
    NOTIFICATION_EMAILS_TOTAL
        .with_label_values(&[kind, outcome])
        .inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_metrics() {
        let _ = &*REGISTRY;
        let metrics = gather_metrics();
        assert!(!metrics.is_empty());
    }

    #[test]
    fn test_record_http_request() {
        record_http_request("GET", "/health", 200, 0.001);
        let metrics = gather_metrics();
        assert!(metrics.contains("http_requests_total"));
    }

    #[test]
    fn test_record_notification_email() {
        record_notification_email("follower", "sent");
        let metrics = gather_metrics();
        assert!(metrics.contains("notification_emails_total"));
    }
}
