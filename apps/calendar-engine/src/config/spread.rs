//! Spread construction settings.

use super::{ConfigError, EnvSource};
use crate::application::use_cases::{BuilderConfig, DEFAULT_ALLOWED_UNDERLYINGS, DeltaFallback};

/// Target delta used when a command does not give one.
pub const DEFAULT_TARGET_DELTA: f64 = 0.35;

/// Risk-free rate for the delta fallback.
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.05;

/// Spread construction settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadSettings {
    /// Accepted underlyings, upper-cased (`SPREAD_ALLOWED_UNDERLYINGS`).
    pub allowed_underlyings: Vec<String>,
    /// Default target delta (`SPREAD_DEFAULT_TARGET_DELTA`).
    pub default_target_delta: f64,
    /// Volatility for estimating missing deltas; unset disables the
    /// fallback (`SPREAD_FALLBACK_VOLATILITY`).
    pub fallback_volatility: Option<f64>,
    /// Risk-free rate for the fallback (`SPREAD_RISK_FREE_RATE`).
    pub risk_free_rate: f64,
}

impl SpreadSettings {
    pub(super) fn load(env: &EnvSource<'_>) -> Result<Self, ConfigError> {
        let allowed_underlyings = env.list("SPREAD_ALLOWED_UNDERLYINGS").map_or_else(
            || {
                DEFAULT_ALLOWED_UNDERLYINGS
                    .iter()
                    .map(ToString::to_string)
                    .collect()
            },
            |list| list.iter().map(|s| s.to_uppercase()).collect(),
        );
        Ok(Self {
            allowed_underlyings,
            default_target_delta: env.parse_or("SPREAD_DEFAULT_TARGET_DELTA", DEFAULT_TARGET_DELTA)?,
            fallback_volatility: env.parse("SPREAD_FALLBACK_VOLATILITY")?,
            risk_free_rate: env.parse_or("SPREAD_RISK_FREE_RATE", DEFAULT_RISK_FREE_RATE)?,
        })
    }

    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        if !(self.default_target_delta > 0.0 && self.default_target_delta < 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "SPREAD_DEFAULT_TARGET_DELTA must be in (0, 1), got {}",
                self.default_target_delta
            )));
        }
        if let Some(volatility) = self.fallback_volatility
            && volatility <= 0.0
        {
            return Err(ConfigError::ValidationError(format!(
                "SPREAD_FALLBACK_VOLATILITY must be positive, got {volatility}"
            )));
        }
        Ok(())
    }

    /// Builder configuration.
    #[must_use]
    pub fn to_builder_config(&self) -> BuilderConfig {
        BuilderConfig {
            allowed_underlyings: self.allowed_underlyings.clone(),
            delta_fallback: self.fallback_volatility.map(|volatility| DeltaFallback {
                volatility,
                risk_free_rate: self.risk_free_rate,
            }),
        }
    }
}
