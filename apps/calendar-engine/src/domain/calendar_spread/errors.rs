//! Calendar Spread Errors

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::option_chain::OptionType;

/// Failures to resolve or construct a calendar spread.
///
/// Every variant except `InvalidRequest` and `InvalidSpread` describes a
/// market condition (nothing to match right now) rather than a fault.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpreadError {
    /// Fewer than two expirations are listed.
    #[error("Insufficient expirations for {underlying}: {available} listed, need at least 2")]
    InsufficientExpirations {
        /// Underlying symbol.
        underlying: String,
        /// Number of listed expirations.
        available: usize,
    },

    /// No expirations fall in the short or long trading-day windows.
    #[error("No suitable expirations for {underlying}: {message}")]
    NoSuitableExpirations {
        /// Underlying symbol.
        underlying: String,
        /// What was missing.
        message: String,
    },

    /// No contract has a delta of the right sign.
    #[error("No {option_type} contract near delta {target_delta} expiring {expiration}")]
    NoDeltaMatch {
        /// Target delta magnitude.
        target_delta: f64,
        /// Option type searched.
        option_type: OptionType,
        /// Chain expiration searched.
        expiration: NaiveDate,
    },

    /// No contract at the requested strike.
    #[error("No {option_type} contract at strike {strike} expiring {expiration}")]
    StrikeNotFound {
        /// Target strike.
        strike: Decimal,
        /// Option type searched.
        option_type: OptionType,
        /// Chain expiration searched.
        expiration: NaiveDate,
    },

    /// Request parameters are out of range.
    #[error("Invalid spread request: {message}")]
    InvalidRequest {
        /// Reason.
        message: String,
    },

    /// Legs violate the calendar spread invariants.
    #[error("Invalid calendar spread: {message}")]
    InvalidSpread {
        /// Reason.
        message: String,
    },
}

impl SpreadError {
    /// Whether this is a validation error raised before any network call.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidRequest { .. })
    }
}
