//! Spread Request Value Object

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::calendar_spread::errors::SpreadError;
use crate::domain::option_chain::OptionType;

/// Parameters for locating a calendar spread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadRequest {
    underlying: String,
    target_delta: f64,
    option_type: OptionType,
    strike_offset: i32,
    expiration_offset: i32,
    as_of: NaiveDate,
}

impl SpreadRequest {
    /// Request with zero offsets, evaluated as of today (local time).
    #[must_use]
    pub fn new(underlying: impl Into<String>, target_delta: f64, option_type: OptionType) -> Self {
        Self {
            underlying: underlying.into().trim().to_ascii_uppercase(),
            target_delta,
            option_type,
            strike_offset: 0,
            expiration_offset: 0,
            as_of: chrono::Local::now().date_naive(),
        }
    }

    /// Shift the strike by `offset` exchange increments.
    #[must_use]
    pub const fn with_strike_offset(mut self, offset: i32) -> Self {
        self.strike_offset = offset;
        self
    }

    /// Shift both expirations by `offset` positions.
    #[must_use]
    pub const fn with_expiration_offset(mut self, offset: i32) -> Self {
        self.expiration_offset = offset;
        self
    }

    /// Evaluate trading days relative to `date`.
    #[must_use]
    pub const fn as_of(mut self, date: NaiveDate) -> Self {
        self.as_of = date;
        self
    }

    /// Check the delta range and, when `allowed` is non-empty, the underlying.
    pub fn validate(&self, allowed: &[String]) -> Result<(), SpreadError> {
        if self.underlying.is_empty() {
            return Err(SpreadError::InvalidRequest {
                message: "underlying symbol is required".to_string(),
            });
        }
        if !(self.target_delta > 0.0 && self.target_delta < 1.0) {
            return Err(SpreadError::InvalidRequest {
                message: format!(
                    "target delta must be between 0 and 1 (exclusive), got {}",
                    self.target_delta
                ),
            });
        }
        if !allowed.is_empty() && !allowed.iter().any(|s| s == &self.underlying) {
            return Err(SpreadError::InvalidRequest {
                message: format!(
                    "unsupported underlying {}; allowed: {}",
                    self.underlying,
                    allowed.join(", ")
                ),
            });
        }
        Ok(())
    }

    /// Underlying symbol (upper case).
    #[must_use]
    pub fn underlying(&self) -> &str {
        &self.underlying
    }

    /// Target delta magnitude.
    #[must_use]
    pub const fn target_delta(&self) -> f64 {
        self.target_delta
    }

    /// Option type.
    #[must_use]
    pub const fn option_type(&self) -> OptionType {
        self.option_type
    }

    /// Strike offset in increments.
    #[must_use]
    pub const fn strike_offset(&self) -> i32 {
        self.strike_offset
    }

    /// Expiration offset in positions.
    #[must_use]
    pub const fn expiration_offset(&self) -> i32 {
        self.expiration_offset
    }

    /// Evaluation date.
    #[must_use]
    pub const fn evaluation_date(&self) -> NaiveDate {
        self.as_of
    }
}
