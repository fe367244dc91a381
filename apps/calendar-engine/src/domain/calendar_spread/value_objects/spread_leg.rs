//! Spread Leg Value Object

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::option_chain::OptionContract;
use crate::domain::order_composition::OrderSide;

/// Role of a leg within a calendar spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegRole {
    /// Near-dated leg, sold.
    Short,
    /// Far-dated leg, bought.
    Long,
}

impl LegRole {
    /// Side used when opening this leg.
    #[must_use]
    pub const fn opening_side(self) -> OrderSide {
        match self {
            Self::Short => OrderSide::SellToOpen,
            Self::Long => OrderSide::BuyToOpen,
        }
    }

    /// Side used when closing this leg.
    #[must_use]
    pub const fn closing_side(self) -> OrderSide {
        match self {
            Self::Short => OrderSide::BuyToClose,
            Self::Long => OrderSide::SellToClose,
        }
    }
}

/// One leg of a calendar spread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadLeg {
    contract: OptionContract,
    role: LegRole,
    quantity: Decimal,
}

impl SpreadLeg {
    /// Create a leg for a single contract.
    #[must_use]
    pub const fn new(contract: OptionContract, role: LegRole) -> Self {
        Self {
            contract,
            role,
            quantity: Decimal::ONE,
        }
    }

    /// Short leg.
    #[must_use]
    pub const fn short(contract: OptionContract) -> Self {
        Self::new(contract, LegRole::Short)
    }

    /// Long leg.
    #[must_use]
    pub const fn long(contract: OptionContract) -> Self {
        Self::new(contract, LegRole::Long)
    }

    /// Set the contract count.
    #[must_use]
    pub const fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = quantity;
        self
    }

    /// Contract.
    #[must_use]
    pub const fn contract(&self) -> &OptionContract {
        &self.contract
    }

    /// Role.
    #[must_use]
    pub const fn role(&self) -> LegRole {
        self.role
    }

    /// Contract count.
    #[must_use]
    pub const fn quantity(&self) -> Decimal {
        self.quantity
    }

    /// Side when opening.
    #[must_use]
    pub const fn side(&self) -> OrderSide {
        self.role.opening_side()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opening_and_closing_sides_reverse() {
        assert_eq!(LegRole::Short.opening_side(), OrderSide::SellToOpen);
        assert_eq!(LegRole::Long.opening_side(), OrderSide::BuyToOpen);
        assert_eq!(LegRole::Short.closing_side(), OrderSide::BuyToClose);
        assert_eq!(LegRole::Long.closing_side(), OrderSide::SellToClose);
    }

    #[test]
    fn leg_side_follows_role() {
        use crate::domain::option_chain::OptionType;
        use chrono::NaiveDate;

        let contract = OptionContract::new(
            "SPY240119C00450000",
            "SPY",
            Decimal::from(450),
            NaiveDate::from_ymd_opt(2024, 1, 19).unwrap(),
            OptionType::Call,
        );
        let leg = SpreadLeg::short(contract).with_quantity(Decimal::TWO);
        assert_eq!(leg.side(), OrderSide::SellToOpen);
        assert_eq!(leg.quantity(), Decimal::TWO);
    }
}
