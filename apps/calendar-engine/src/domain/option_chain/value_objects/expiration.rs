//! Expiration dates annotated with trading days.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::option_chain::services::trading_calendar::trading_days_until;

/// An expiration date and the trading days remaining until it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Expiration {
    date: NaiveDate,
    trading_days: u32,
}

impl Expiration {
    /// Create an expiration with a precomputed trading-day count.
    #[must_use]
    pub const fn new(date: NaiveDate, trading_days: u32) -> Self {
        Self { date, trading_days }
    }

    /// Annotate `date` relative to `today`.
    #[must_use]
    pub fn from_today(date: NaiveDate, today: NaiveDate) -> Self {
        Self::new(date, trading_days_until(today, date))
    }

    /// Expiration date.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Weekdays from today until the expiration.
    #[must_use]
    pub const fn trading_days(&self) -> u32 {
        self.trading_days
    }
}

impl std::fmt::Display for Expiration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}d)", self.date, self.trading_days)
    }
}

/// Expirations listed for an underlying, in the order the exchange returns
/// them (ascending by date).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExpirationSet {
    underlying: String,
    entries: Vec<Expiration>,
}

impl ExpirationSet {
    /// Annotate raw expiration dates relative to `today`.
    #[must_use]
    pub fn annotate(underlying: impl Into<String>, dates: &[NaiveDate], today: NaiveDate) -> Self {
        let mut entries: Vec<Expiration> = dates
            .iter()
            .map(|d| Expiration::from_today(*d, today))
            .collect();
        entries.sort_by_key(Expiration::date);
        entries.dedup();
        Self {
            underlying: underlying.into(),
            entries,
        }
    }

    /// Build from already annotated entries.
    #[must_use]
    pub fn from_entries(underlying: impl Into<String>, entries: Vec<Expiration>) -> Self {
        Self {
            underlying: underlying.into(),
            entries,
        }
    }

    /// Underlying symbol.
    #[must_use]
    pub fn underlying(&self) -> &str {
        &self.underlying
    }

    /// All entries.
    #[must_use]
    pub fn entries(&self) -> &[Expiration] {
        &self.entries
    }

    /// Number of expirations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no expirations are listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose trading days fall in `[min, max]`, sorted ascending by
    /// trading days. Ties keep listing order.
    #[must_use]
    pub fn within_trading_days(&self, min: u32, max: u32) -> Vec<Expiration> {
        let mut window: Vec<Expiration> = self
            .entries
            .iter()
            .filter(|e| (min..=max).contains(&e.trading_days))
            .copied()
            .collect();
        window.sort_by_key(Expiration::trading_days);
        window
    }
}
