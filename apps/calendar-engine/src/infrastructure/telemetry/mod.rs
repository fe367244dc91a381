//! Logging and metrics setup for the binary.
//!
//! Logs go to stderr so that command results on stdout stay machine-readable.
//!
//! # Configuration
//!
//! - `RUST_LOG`: filter directives (default: `calendar_engine=info`)
//! - `METRICS_PORT`: Prometheus listener port (0 or unset disables it)

mod metrics;

use tracing_subscriber::EnvFilter;

pub use metrics::{
    MetricsConfig, MetricsError, init_metrics, record_api_request, record_order_action,
    record_order_submission, record_stream_error, record_stream_message, record_stream_reconnect,
    record_stream_state, stream_state,
};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "calendar_engine=info";

/// Configuration for [`init`].
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Filter directives used when `RUST_LOG` is unset.
    pub default_filter: String,
    /// Emit ANSI colors.
    pub ansi: bool,
    /// Prometheus exporter, when enabled.
    pub metrics: Option<MetricsConfig>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            default_filter: DEFAULT_FILTER.to_string(),
            ansi: false,
            metrics: None,
        }
    }
}

impl TelemetryConfig {
    /// Enable the Prometheus exporter on `port`; 0 leaves it disabled.
    #[must_use]
    pub fn with_metrics_port(mut self, port: u16) -> Self {
        self.metrics = (port != 0).then(|| MetricsConfig::with_port(port));
        self
    }
}

/// Error type for telemetry setup.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to initialize tracing subscriber.
    #[error("failed to initialize tracing subscriber: {0}")]
    Subscriber(String),
    /// Metrics exporter failed to start.
    #[error(transparent)]
    Metrics(#[from] MetricsError),
}

/// Install the tracing subscriber and, if configured, the metrics exporter.
///
/// Call once, from the binary.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(config.ansi)
        .try_init()
        .map_err(|e| TelemetryError::Subscriber(e.to_string()))?;

    if let Some(metrics) = &config.metrics {
        init_metrics(metrics)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_port_zero_disables_exporter() {
        let config = TelemetryConfig::default().with_metrics_port(0);
        assert!(config.metrics.is_none());

        let config = TelemetryConfig::default().with_metrics_port(9464);
        assert_eq!(config.metrics.map(|m| m.listen_addr.port()), Some(9464));
    }

    #[test]
    fn default_filter_targets_crate() {
        assert_eq!(TelemetryConfig::default().default_filter, "calendar_engine=info");
    }
}
