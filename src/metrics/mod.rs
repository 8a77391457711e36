//! Prometheus metrics.
//!
//! Request metrics are recorded by the HTTP middleware; engine metrics by the
//! facade. The handle returned by `init_metrics` renders the scrape body for
//! the `/metrics` endpoint.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

use crate::models::{Direction, OrderKind};

/// Metric names as constants for consistency
pub mod names {
    pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "http_requests_in_flight";

    pub const ORDERS_SUBMITTED_TOTAL: &str = "orders_submitted_total";
    pub const ORDERS_CANCELLED_TOTAL: &str = "orders_cancelled_total";
    pub const TRADES_EXECUTED_TOTAL: &str = "trades_executed_total";
    pub const SETTLEMENT_RETRIES_TOTAL: &str = "settlement_retries_total";
}

/// Label keys
pub mod labels {
    pub const METHOD: &str = "method";
    pub const ENDPOINT: &str = "endpoint";
    pub const STATUS: &str = "status";
    pub const DIRECTION: &str = "direction";
    pub const KIND: &str = "kind";
}

/// Install the Prometheus recorder and return the render handle.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(names::HTTP_REQUEST_DURATION_SECONDS.to_string()),
            &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0],
        )
        .expect("histogram buckets are non-empty")
        .install_recorder()
        .expect("failed to install Prometheus recorder")
}

pub fn record_http_request(method: &str, endpoint: &str, status: u16, duration_secs: f64) {
    counter!(
        names::HTTP_REQUESTS_TOTAL,
        labels::METHOD => method.to_string(),
        labels::ENDPOINT => endpoint.to_string(),
        labels::STATUS => status.to_string()
    )
    .increment(1);
    histogram!(
        names::HTTP_REQUEST_DURATION_SECONDS,
        labels::METHOD => method.to_string(),
        labels::ENDPOINT => endpoint.to_string()
    )
    .record(duration_secs);
}

pub fn set_http_requests_in_flight(delta: i64) {
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(delta as f64);
}

pub fn record_order_submitted(direction: Direction, kind: OrderKind) {
    counter!(
        names::ORDERS_SUBMITTED_TOTAL,
        labels::DIRECTION => direction.to_string(),
        labels::KIND => kind.to_string()
    )
    .increment(1);
}

pub fn record_order_cancelled() {
    counter!(names::ORDERS_CANCELLED_TOTAL).increment(1);
}

pub fn record_trades(count: u64) {
    counter!(names::TRADES_EXECUTED_TOTAL).increment(count);
}

pub fn record_settlement_retry() {
    counter!(names::SETTLEMENT_RETRIES_TOTAL).increment(1);
}
