//! Quote Value Object

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::option_contract::Greeks;

/// Top-of-book quote for an equity or option symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Symbol (equity ticker or OCC option symbol).
    pub symbol: String,
    /// Last trade price.
    pub last: Option<Decimal>,
    /// Best bid.
    pub bid: Option<Decimal>,
    /// Best ask.
    pub ask: Option<Decimal>,
    /// Greeks when requested for an option symbol.
    pub greeks: Option<Greeks>,
}

impl Quote {
    /// Reference price: last, falling back to the bid/ask midpoint.
    #[must_use]
    pub fn reference_price(&self) -> Option<Decimal> {
        self.last.or_else(|| match (self.bid, self.ask) {
            (Some(bid), Some(ask)) => Some((bid + ask) / Decimal::TWO),
            _ => None,
        })
    }
}
