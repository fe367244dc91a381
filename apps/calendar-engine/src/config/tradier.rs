//! Brokerage API settings.

use std::time::Duration;

use super::{ConfigError, EnvSource};
use crate::infrastructure::tradier::{TradierConfig, TradierEnvironment};

/// Brokerage API settings.
#[derive(Clone, PartialEq, Eq)]
pub struct TradierSettings {
    /// Bearer token (`TRADIER_ACCESS_TOKEN`).
    pub access_token: String,
    /// Use the sandbox (`TRADIER_USE_SANDBOX`).
    pub use_sandbox: bool,
    /// Request timeout in seconds (`TRADIER_TIMEOUT_SECS`).
    pub timeout_secs: u64,
}

impl std::fmt::Debug for TradierSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradierSettings")
            .field("access_token", &"[REDACTED]")
            .field("use_sandbox", &self.use_sandbox)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl TradierSettings {
    pub(super) fn load(env: &EnvSource<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            access_token: env.require("TRADIER_ACCESS_TOKEN")?,
            use_sandbox: env.flag("TRADIER_USE_SANDBOX"),
            timeout_secs: env.parse_or("TRADIER_TIMEOUT_SECS", 30)?,
        })
    }

    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "TRADIER_TIMEOUT_SECS must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Environment selected by the sandbox flag.
    #[must_use]
    pub const fn environment(&self) -> TradierEnvironment {
        if self.use_sandbox {
            TradierEnvironment::Sandbox
        } else {
            TradierEnvironment::Production
        }
    }

    /// Adapter configuration.
    #[must_use]
    pub fn to_tradier_config(&self) -> TradierConfig {
        TradierConfig::new(self.access_token.clone(), self.environment())
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}
