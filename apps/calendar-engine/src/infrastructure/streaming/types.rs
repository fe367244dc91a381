//! Stream Client Types and Configuration

use std::time::Duration;

use thiserror::Error;

use crate::infrastructure::telemetry::stream_state;

/// Stream client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    /// Base of the exponential backoff; attempt `n` waits `initial * 2^n`.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
    /// Maximum reconnection attempts before giving up.
    pub max_reconnect_attempts: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_millis(1000),
            max_backoff: Duration::from_millis(30_000),
            max_reconnect_attempts: 10,
        }
    }
}

/// Transport variant, used as a log and metrics label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// WebSocket text frames.
    WebSocket,
    /// Newline-delimited JSON over a chunked HTTP response.
    Http,
}

impl Transport {
    /// Label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WebSocket => "websocket",
            Self::Http => "http",
        }
    }
}

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamState {
    /// Not connected. Initial and terminal.
    #[default]
    Closed,
    /// Transport being opened.
    Connecting,
    /// Connected; payload sent.
    Open,
    /// Server sent a close frame; waiting for the transport to end.
    Closing,
}

impl StreamState {
    /// Connecting, open or closing.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// Open and receiving.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Gauge value for the stream state metric.
    #[must_use]
    pub const fn gauge_value(self) -> f64 {
        match self {
            Self::Closed => stream_state::CLOSED,
            Self::Connecting => stream_state::CONNECTING,
            Self::Open => stream_state::OPEN,
            Self::Closing => stream_state::CLOSING,
        }
    }
}

/// Event delivered to the consumer, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Transport opened and subscription payload sent.
    Open,
    /// One JSON message from the feed.
    Data(serde_json::Value),
    /// Non-fatal error or terminal failure.
    Error(StreamError),
    /// Transport ended.
    Closed,
    /// Reconnect scheduled.
    Reconnecting {
        /// Attempt number, starting at 1.
        attempt: u32,
        /// Delay before the attempt.
        delay: Duration,
    },
    /// Stopped by the consumer.
    Stopped,
}

/// Stream errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// No session id set.
    #[error("no streaming session; create a session before connecting")]
    NoSession,

    /// Nothing to subscribe to.
    #[error("subscription is empty")]
    EmptySubscription,

    /// Operation not available on this feed.
    #[error("{operation} is not supported on the {feed} feed")]
    WrongFeed {
        /// Operation attempted.
        operation: String,
        /// Feed of this client.
        feed: String,
    },

    /// Server reported an error payload.
    #[error("stream error: {message}")]
    Server {
        /// Error text from the server.
        message: String,
    },

    /// Message parsing failed.
    #[error("failed to parse message: {message}")]
    Parse {
        /// Error details.
        message: String,
    },

    /// Connection failed.
    #[error("connection failed: {message}")]
    ConnectionFailed {
        /// Error details.
        message: String,
    },

    /// Streaming endpoint answered with a non-success status.
    #[error("Streaming failed: {status}")]
    HttpStatus {
        /// Status line.
        status: String,
    },

    /// Connection closed unexpectedly.
    #[error("connection closed: {reason}")]
    ConnectionClosed {
        /// Close reason.
        reason: String,
    },

    /// Send failed.
    #[error("failed to send message: {message}")]
    SendFailed {
        /// Error details.
        message: String,
    },

    /// Reconnection attempts exhausted.
    #[error("max reconnection attempts ({attempts}) exceeded")]
    ReconnectExhausted {
        /// Number of attempts made.
        attempts: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = StreamConfig::default();
        assert_eq!(config.initial_backoff, Duration::from_secs(1));
        assert_eq!(config.max_backoff, Duration::from_secs(30));
        assert_eq!(config.max_reconnect_attempts, 10);
    }

    #[test]
    fn state_checks() {
        assert!(!StreamState::Closed.is_active());
        assert!(StreamState::Connecting.is_active());
        assert!(StreamState::Closing.is_active());
        assert!(StreamState::Open.is_open());
        assert!(!StreamState::Closing.is_open());
    }

    #[test]
    fn error_display() {
        let err = StreamError::ReconnectExhausted { attempts: 10 };
        assert_eq!(err.to_string(), "max reconnection attempts (10) exceeded");
        let err = StreamError::HttpStatus {
            status: "401 Unauthorized".to_string(),
        };
        assert_eq!(err.to_string(), "Streaming failed: 401 Unauthorized");
    }
}
