//! Configuration for the calendar engine.
//!
//! All settings come from environment variables, optionally seeded from a
//! `.env` file by the binary before [`EngineConfig::from_env`] runs.
//!
//! # Usage
//!
//! ```rust,ignore
//! use calendar_engine::config::EngineConfig;
//!
//! dotenvy::dotenv().ok();
//! let config = EngineConfig::from_env()?;
//! let adapter = TradierAdapter::new(&config.tradier.to_tradier_config())?;
//! ```

mod spread;
mod streams;
mod tradier;

use std::str::FromStr;

use thiserror::Error;

pub use spread::SpreadSettings;
pub use streams::StreamSettings;
pub use tradier::TradierSettings;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Missing required environment variable.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Variable set but not parseable.
    #[error("Invalid value for {name}: '{value}' ({message})")]
    InvalidValue {
        /// Variable name.
        name: String,
        /// Raw value.
        value: String,
        /// Parse error.
        message: String,
    },

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Brokerage API access.
    pub tradier: TradierSettings,
    /// Stream reconnection.
    pub streams: StreamSettings,
    /// Spread construction.
    pub spread: SpreadSettings,
    /// Prometheus listener port; 0 disables the exporter.
    pub metrics_port: u16,
}

impl EngineConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvSource::new(&lookup);
        let config = Self {
            tradier: TradierSettings::load(&env)?,
            streams: StreamSettings::load(&env)?,
            spread: SpreadSettings::load(&env)?,
            metrics_port: env.parse_or("METRICS_PORT", 0)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tradier.validate()?;
        self.streams.validate()?;
        self.spread.validate()
    }
}

/// Typed access to environment variables. Empty values count as unset.
pub(crate) struct EnvSource<'a> {
    lookup: &'a dyn Fn(&str) -> Option<String>,
}

impl<'a> EnvSource<'a> {
    pub(crate) fn new(lookup: &'a dyn Fn(&str) -> Option<String>) -> Self {
        Self { lookup }
    }

    pub(crate) fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    pub(crate) fn require(&self, name: &str) -> Result<String, ConfigError> {
        self.get(name)
            .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
    }

    pub(crate) fn parse<T>(&self, name: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(name)
            .map(|value| {
                value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
                    name: name.to_string(),
                    value: value.clone(),
                    message: e.to_string(),
                })
            })
            .transpose()
    }

    pub(crate) fn parse_or<T>(&self, name: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        Ok(self.parse(name)?.unwrap_or(default))
    }

    /// `true`/`1`/`yes` (any case) are true; other set values are false.
    pub(crate) fn flag(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| {
            matches!(v.to_ascii_lowercase().as_str(), "true" | "1" | "yes")
        })
    }

    /// Comma-separated list.
    pub(crate) fn list(&self, name: &str) -> Option<Vec<String>> {
        self.get(name).map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
    }
}
