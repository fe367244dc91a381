//! Account Position Value Object

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::occ_symbol::OccSymbol;
use crate::domain::option_chain::OptionType;

/// A position as reported by the account endpoint. Quantity is signed:
/// negative for short holdings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Brokerage position id.
    pub id: Option<u64>,
    /// Equity ticker or OCC option symbol.
    pub symbol: String,
    /// Signed quantity.
    pub quantity: Decimal,
    /// Total cost basis.
    pub cost_basis: Option<Decimal>,
    /// Acquisition timestamp as reported.
    pub date_acquired: Option<String>,
    /// Option type when the source reports it directly.
    pub option_type: Option<OptionType>,
}

impl Position {
    /// Position with only symbol and quantity.
    #[must_use]
    pub fn new(symbol: impl Into<String>, quantity: Decimal) -> Self {
        Self {
            id: None,
            symbol: symbol.into(),
            quantity,
            cost_basis: None,
            date_acquired: None,
            option_type: None,
        }
    }

    /// Parsed OCC components, if this is an option position.
    #[must_use]
    pub fn occ(&self) -> Option<OccSymbol> {
        OccSymbol::parse(&self.symbol)
    }

    /// Whether this holds an option contract.
    #[must_use]
    pub fn is_option(&self) -> bool {
        self.option_type.is_some() || self.occ().is_some()
    }

    /// Short holding.
    #[must_use]
    pub fn is_short(&self) -> bool {
        self.quantity.is_sign_negative() && !self.quantity.is_zero()
    }

    /// Long holding.
    #[must_use]
    pub fn is_long(&self) -> bool {
        self.quantity.is_sign_positive() && !self.quantity.is_zero()
    }

    /// Absolute quantity held.
    #[must_use]
    pub fn held(&self) -> Decimal {
        self.quantity.abs()
    }

    /// Underlying symbol: OCC root for options, the symbol otherwise.
    #[must_use]
    pub fn underlying(&self) -> String {
        self.occ().map_or_else(|| self.symbol.clone(), |occ| occ.root)
    }
}
