//! Option Contract Value Object

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Option type (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    /// Call option (right to buy).
    Call,
    /// Put option (right to sell).
    Put,
}

impl OptionType {
    /// Sign applied to a delta magnitude for this type (+1 calls, -1 puts).
    #[must_use]
    pub const fn delta_sign(self) -> f64 {
        match self {
            Self::Call => 1.0,
            Self::Put => -1.0,
        }
    }

    /// Wire representation used by the brokerage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::Put => "put",
        }
    }
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "CALL"),
            Self::Put => write!(f, "PUT"),
        }
    }
}

impl std::str::FromStr for OptionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" | "c" => Ok(Self::Call),
            "put" | "p" => Ok(Self::Put),
            other => Err(format!("unknown option type: {other}")),
        }
    }
}

/// Live greeks reported with a chain snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Greeks {
    /// Delta.
    pub delta: Option<f64>,
    /// Gamma.
    pub gamma: Option<f64>,
    /// Theta (per day).
    pub theta: Option<f64>,
    /// Vega.
    pub vega: Option<f64>,
    /// Rho.
    pub rho: Option<f64>,
    /// Mid implied volatility.
    pub mid_iv: Option<f64>,
}

impl Greeks {
    /// Greeks with only delta populated.
    #[must_use]
    pub const fn with_delta(delta: f64) -> Self {
        Self {
            delta: Some(delta),
            gamma: None,
            theta: None,
            vega: None,
            rho: None,
            mid_iv: None,
        }
    }
}

/// A listed option contract from a chain snapshot. Immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    symbol: String,
    underlying: String,
    strike: Decimal,
    expiration: NaiveDate,
    option_type: OptionType,
    bid: Option<Decimal>,
    ask: Option<Decimal>,
    last: Option<Decimal>,
    greeks: Option<Greeks>,
}

impl OptionContract {
    /// Create a new option contract without quotes or greeks.
    #[must_use]
    pub fn new(
        symbol: impl Into<String>,
        underlying: impl Into<String>,
        strike: Decimal,
        expiration: NaiveDate,
        option_type: OptionType,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            underlying: underlying.into(),
            strike,
            expiration,
            option_type,
            bid: None,
            ask: None,
            last: None,
            greeks: None,
        }
    }

    /// Attach bid/ask/last quotes.
    #[must_use]
    pub const fn with_quotes(
        mut self,
        bid: Option<Decimal>,
        ask: Option<Decimal>,
        last: Option<Decimal>,
    ) -> Self {
        self.bid = bid;
        self.ask = ask;
        self.last = last;
        self
    }

    /// Attach greeks.
    #[must_use]
    pub const fn with_greeks(mut self, greeks: Greeks) -> Self {
        self.greeks = Some(greeks);
        self
    }

    /// OCC symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Underlying symbol.
    #[must_use]
    pub fn underlying(&self) -> &str {
        &self.underlying
    }

    /// Strike price.
    #[must_use]
    pub const fn strike(&self) -> Decimal {
        self.strike
    }

    /// Expiration date.
    #[must_use]
    pub const fn expiration(&self) -> NaiveDate {
        self.expiration
    }

    /// Call or put.
    #[must_use]
    pub const fn option_type(&self) -> OptionType {
        self.option_type
    }

    /// Best bid.
    #[must_use]
    pub const fn bid(&self) -> Option<Decimal> {
        self.bid
    }

    /// Best ask.
    #[must_use]
    pub const fn ask(&self) -> Option<Decimal> {
        self.ask
    }

    /// Last trade price.
    #[must_use]
    pub const fn last(&self) -> Option<Decimal> {
        self.last
    }

    /// Greeks, if the chain was fetched with greeks.
    #[must_use]
    pub const fn greeks(&self) -> Option<&Greeks> {
        self.greeks.as_ref()
    }

    /// Live delta, if reported.
    #[must_use]
    pub fn delta(&self) -> Option<f64> {
        self.greeks.and_then(|g| g.delta)
    }

    /// Live theta, if reported.
    #[must_use]
    pub fn theta(&self) -> Option<f64> {
        self.greeks.and_then(|g| g.theta)
    }

    /// Mid price when both sides are quoted, otherwise last.
    #[must_use]
    pub fn mid(&self) -> Option<Decimal> {
        match (self.bid, self.ask) {
            (Some(bid), Some(ask)) => Some((bid + ask) / Decimal::TWO),
            _ => self.last,
        }
    }
}

impl std::fmt::Display for OptionContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.underlying, self.expiration, self.strike, self.option_type
        )
    }
}
