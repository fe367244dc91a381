//! Tradier adapter configuration.

use std::time::Duration;

/// Default HTTP request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Tradier environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TradierEnvironment {
    /// Brokerage production API.
    #[default]
    Production,
    /// Sandbox (delayed data, simulated orders).
    Sandbox,
}

impl TradierEnvironment {
    /// Base URL for the REST API.
    #[must_use]
    pub const fn api_base_url(&self) -> &'static str {
        match self {
            Self::Production => "https://api.tradier.com",
            Self::Sandbox => "https://sandbox.tradier.com",
        }
    }

    /// Base URL for the HTTP streaming API. Only production streams market events.
    #[must_use]
    pub const fn stream_base_url(&self) -> &'static str {
        "https://stream.tradier.com"
    }

    /// WebSocket URL for market events.
    #[must_use]
    pub const fn market_ws_url(&self) -> &'static str {
        "wss://ws.tradier.com/v1/markets/events"
    }

    /// WebSocket URL for account events.
    #[must_use]
    pub const fn account_ws_url(&self) -> &'static str {
        match self {
            Self::Production => "wss://ws.tradier.com/v1/accounts/events",
            Self::Sandbox => "wss://sandbox-ws.tradier.com/v1/accounts/events",
        }
    }

    /// Check if this is the sandbox.
    #[must_use]
    pub const fn is_sandbox(&self) -> bool {
        matches!(self, Self::Sandbox)
    }
}

impl std::fmt::Display for TradierEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Production => write!(f, "PRODUCTION"),
            Self::Sandbox => write!(f, "SANDBOX"),
        }
    }
}

/// Event feed endpoints used by the stream clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEndpoints {
    /// HTTP chunked market events endpoint.
    pub http_market_url: String,
    /// WebSocket market events endpoint.
    pub ws_market_url: String,
    /// WebSocket account events endpoint.
    pub ws_account_url: String,
}

impl StreamEndpoints {
    /// Endpoints for `environment`.
    #[must_use]
    pub fn for_environment(environment: TradierEnvironment) -> Self {
        Self {
            http_market_url: format!("{}/v1/markets/events", environment.stream_base_url()),
            ws_market_url: environment.market_ws_url().to_string(),
            ws_account_url: environment.account_ws_url().to_string(),
        }
    }
}

/// Configuration for the Tradier adapter.
#[derive(Clone)]
pub struct TradierConfig {
    /// Bearer access token.
    pub access_token: String,
    /// Environment.
    pub environment: TradierEnvironment,
    /// REST base URL; defaults to the environment's.
    pub api_base_url: String,
    /// Event feed endpoints; default to the environment's.
    pub streams: StreamEndpoints,
    /// HTTP request timeout.
    pub timeout: Duration,
}

impl TradierConfig {
    /// Create a new configuration.
    #[must_use]
    pub fn new(access_token: impl Into<String>, environment: TradierEnvironment) -> Self {
        Self {
            access_token: access_token.into(),
            environment,
            api_base_url: environment.api_base_url().to_string(),
            streams: StreamEndpoints::for_environment(environment),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the HTTP timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Point the REST client at another base URL.
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Override the event feed endpoints.
    #[must_use]
    pub fn with_streams(mut self, streams: StreamEndpoints) -> Self {
        self.streams = streams;
        self
    }
}

impl std::fmt::Debug for TradierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradierConfig")
            .field("access_token", &"[REDACTED]")
            .field("environment", &self.environment)
            .field("api_base_url", &self.api_base_url)
            .field("streams", &self.streams)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_urls() {
        assert_eq!(
            TradierEnvironment::Production.api_base_url(),
            "https://api.tradier.com"
        );
        assert_eq!(
            TradierEnvironment::Sandbox.api_base_url(),
            "https://sandbox.tradier.com"
        );
        assert!(
            TradierEnvironment::Sandbox
                .account_ws_url()
                .starts_with("wss://sandbox-ws")
        );
        assert!(TradierEnvironment::Sandbox.is_sandbox());
    }

    #[test]
    fn stream_endpoints() {
        let streams = StreamEndpoints::for_environment(TradierEnvironment::Production);
        assert_eq!(
            streams.http_market_url,
            "https://stream.tradier.com/v1/markets/events"
        );
        assert_eq!(streams.ws_market_url, "wss://ws.tradier.com/v1/markets/events");
    }

    #[test]
    fn config_builders() {
        let config = TradierConfig::new("token", TradierEnvironment::Sandbox)
            .with_timeout(Duration::from_secs(5))
            .with_api_base_url("http://127.0.0.1:9000");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.api_base_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn debug_redacts_token() {
        let config = TradierConfig::new("secret-token", TradierEnvironment::Production);
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn environment_display() {
        assert_eq!(TradierEnvironment::Production.to_string(), "PRODUCTION");
        assert_eq!(TradierEnvironment::Sandbox.to_string(), "SANDBOX");
    }
}
