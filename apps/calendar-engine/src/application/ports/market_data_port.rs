//! Market Data Port (Driven Port)
//!
//! Interface for fetching option chains, expirations and quotes.
//! This is a secondary/outbound port used by application use cases.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::option_chain::{OptionContract, Quote};

/// Market data error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MarketDataError {
    /// Connection error.
    #[error("Market data connection error: {message}")]
    ConnectionError {
        /// Error details.
        message: String,
    },

    /// Authentication failed.
    #[error("Market data authentication failed")]
    AuthenticationFailed,

    /// Symbol not found.
    #[error("Symbol not found: {symbol}")]
    SymbolNotFound {
        /// The unknown symbol.
        symbol: String,
    },

    /// Rate limited.
    #[error("Rate limited, retry after {retry_after_secs} seconds")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// Response could not be interpreted.
    #[error("Malformed market data response: {message}")]
    MalformedResponse {
        /// Error details.
        message: String,
    },

    /// API error.
    #[error("Market data API error: {message}")]
    ApiError {
        /// Error details.
        message: String,
    },
}

/// Port for fetching option market data.
///
/// Implementations normalize single-item vs list responses; every method
/// returns a plain sequence, empty when the provider reports nothing.
#[async_trait]
pub trait MarketDataPort: Send + Sync {
    /// Listed expiration dates for `underlying`, ascending.
    async fn get_expirations(&self, underlying: &str) -> Result<Vec<NaiveDate>, MarketDataError>;

    /// Listed strikes for one expiration.
    async fn get_strikes(
        &self,
        underlying: &str,
        expiration: NaiveDate,
    ) -> Result<Vec<Decimal>, MarketDataError>;

    /// Chain for one expiration, with greeks.
    async fn get_option_chain(
        &self,
        underlying: &str,
        expiration: NaiveDate,
    ) -> Result<Vec<OptionContract>, MarketDataError>;

    /// Quotes for equity or option symbols.
    async fn get_quotes(
        &self,
        symbols: &[String],
        greeks: bool,
    ) -> Result<Vec<Quote>, MarketDataError>;

    /// All option symbols listed for `underlying`.
    async fn lookup_option_symbols(&self, underlying: &str)
    -> Result<Vec<String>, MarketDataError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = MarketDataError::RateLimited {
            retry_after_secs: 30,
        };
        assert_eq!(err.to_string(), "Rate limited, retry after 30 seconds");
    }
}
