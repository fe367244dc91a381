//! Stream reconnection settings.

use std::time::Duration;

use super::{ConfigError, EnvSource};
use crate::infrastructure::streaming::StreamConfig;

/// Stream reconnection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSettings {
    /// Backoff base in milliseconds (`STREAM_RECONNECT_INITIAL_MS`).
    pub reconnect_initial_ms: u64,
    /// Backoff cap in milliseconds (`STREAM_RECONNECT_MAX_MS`).
    pub reconnect_max_ms: u64,
    /// Attempts before giving up (`STREAM_MAX_RECONNECT_ATTEMPTS`).
    pub max_reconnect_attempts: u32,
}

impl StreamSettings {
    pub(super) fn load(env: &EnvSource<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            reconnect_initial_ms: env.parse_or("STREAM_RECONNECT_INITIAL_MS", 1000)?,
            reconnect_max_ms: env.parse_or("STREAM_RECONNECT_MAX_MS", 30_000)?,
            max_reconnect_attempts: env.parse_or("STREAM_MAX_RECONNECT_ATTEMPTS", 10)?,
        })
    }

    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        if self.reconnect_initial_ms > self.reconnect_max_ms {
            return Err(ConfigError::ValidationError(format!(
                "STREAM_RECONNECT_INITIAL_MS ({}) exceeds STREAM_RECONNECT_MAX_MS ({})",
                self.reconnect_initial_ms, self.reconnect_max_ms
            )));
        }
        Ok(())
    }

    /// Stream client configuration.
    #[must_use]
    pub const fn to_stream_config(&self) -> StreamConfig {
        StreamConfig {
            initial_backoff: Duration::from_millis(self.reconnect_initial_ms),
            max_backoff: Duration::from_millis(self.reconnect_max_ms),
            max_reconnect_attempts: self.max_reconnect_attempts,
        }
    }
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            reconnect_initial_ms: 1000,
            reconnect_max_ms: 30_000,
            max_reconnect_attempts: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_stream_config_default() {
        assert_eq!(
            StreamSettings::default().to_stream_config(),
            StreamConfig::default()
        );
    }

    #[test]
    fn rejects_inverted_backoff() {
        let settings = StreamSettings {
            reconnect_initial_ms: 5000,
            reconnect_max_ms: 1000,
            max_reconnect_attempts: 10,
        };
        assert!(settings.validate().is_err());
    }
}
