//! Prometheus metrics for the calendar engine.
//!
//! Covers brokerage REST calls, order submissions and the event stream
//! clients. Recording is a no-op until [`init_metrics`] installs the
//! exporter.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{Ipv4Addr, SocketAddr};

/// Configuration for the metrics exporter.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Address to bind the metrics HTTP listener.
    pub listen_addr: SocketAddr,
    /// Histogram buckets for latency measurements (in seconds).
    pub latency_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 9090)),
            // 5ms to 30s
            latency_buckets: vec![
                0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
            ],
        }
    }
}

impl MetricsConfig {
    /// Listener on all interfaces at `port`.
    #[must_use]
    pub fn with_port(port: u16) -> Self {
        Self {
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
            ..Default::default()
        }
    }
}

/// Initialize the Prometheus metrics exporter.
///
/// This starts an HTTP server that exposes metrics at `/metrics`.
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(config.listen_addr)
        .set_buckets(&config.latency_buckets)
        .map_err(|e| MetricsError::Configuration(e.to_string()))?
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(
        addr = %config.listen_addr,
        "Prometheus metrics exporter started"
    );

    Ok(())
}

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to configure metrics exporter.
    #[error("metrics configuration error: {0}")]
    Configuration(String),
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

// ============================================================================
// Brokerage API Metrics
// ============================================================================

/// Record a REST call.
///
/// # Arguments
///
/// * `endpoint` - Endpoint family (e.g., "chains", "orders")
/// * `status` - HTTP status code, or "error" when no response arrived
/// * `latency_seconds` - Round trip in seconds
pub fn record_api_request(endpoint: &str, status: &str, latency_seconds: f64) {
    counter!(
        "tradier_requests_total",
        "endpoint" => endpoint.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        "tradier_request_latency_seconds",
        "endpoint" => endpoint.to_string()
    )
    .record(latency_seconds);
}

// ============================================================================
// Order Metrics
// ============================================================================

/// Record an order submission.
///
/// # Arguments
///
/// * `class` - Order class (e.g., "multileg", "option")
/// * `status` - "submitted", "previewed", "rejected" or "error"
pub fn record_order_submission(class: &str, status: &str) {
    counter!(
        "order_submissions_total",
        "class" => class.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record an order change or cancellation.
///
/// # Arguments
///
/// * `action` - "change" or "cancel"
/// * `status` - "ok" or "error"
pub fn record_order_action(action: &str, status: &str) {
    counter!(
        "order_actions_total",
        "action" => action.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

// ============================================================================
// Stream Metrics
// ============================================================================

/// Stream connection state values.
pub mod stream_state {
    /// Not connected.
    pub const CLOSED: f64 = 0.0;
    /// Transport being opened.
    pub const CONNECTING: f64 = 1.0;
    /// Receiving events.
    pub const OPEN: f64 = 2.0;
    /// Server closed, transport draining.
    pub const CLOSING: f64 = 3.0;
}

/// Update the stream state gauge.
///
/// # Arguments
///
/// * `transport` - "websocket" or "http"
/// * `state` - Numeric state from [`stream_state`]
pub fn record_stream_state(transport: &str, state: f64) {
    gauge!(
        "stream_state",
        "transport" => transport.to_string()
    )
    .set(state);
}

/// Record a delivered stream message.
///
/// # Arguments
///
/// * `transport` - "websocket" or "http"
/// * `event_type` - Event `type` field (e.g., "quote", "trade"), or "unknown"
pub fn record_stream_message(transport: &str, event_type: &str) {
    counter!(
        "stream_messages_total",
        "transport" => transport.to_string(),
        "type" => event_type.to_string()
    )
    .increment(1);
}

/// Record a stream error (server error payload, bad frame, failed transport).
///
/// # Arguments
///
/// * `transport` - "websocket" or "http"
/// * `kind` - Error kind (e.g., "server", "parse", "transport")
pub fn record_stream_error(transport: &str, kind: &str) {
    counter!(
        "stream_errors_total",
        "transport" => transport.to_string(),
        "kind" => kind.to_string()
    )
    .increment(1);
}

/// Record a scheduled reconnect.
///
/// # Arguments
///
/// * `transport` - "websocket" or "http"
pub fn record_stream_reconnect(transport: &str) {
    counter!(
        "stream_reconnects_total",
        "transport" => transport.to_string()
    )
    .increment(1);
}

// ============================================================================
// Tests
// ============================================================================
