//! Calendar Spread Value Object

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::spread_leg::{LegRole, SpreadLeg};
use crate::domain::calendar_spread::errors::SpreadError;
use crate::domain::option_chain::{Expiration, OptionContract, OptionType};

/// A short near-dated leg and a long far-dated leg at the same strike.
///
/// Construction enforces that both legs share strike and option type and
/// that the short leg has strictly fewer trading days to expiration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarSpread {
    short_leg: SpreadLeg,
    long_leg: SpreadLeg,
    short_expiration: Expiration,
    long_expiration: Expiration,
}

impl CalendarSpread {
    /// Build a spread from two contracts and their annotated expirations.
    pub fn new(
        short: OptionContract,
        long: OptionContract,
        short_expiration: Expiration,
        long_expiration: Expiration,
    ) -> Result<Self, SpreadError> {
        if short.strike() != long.strike() {
            return Err(SpreadError::InvalidSpread {
                message: format!(
                    "strikes differ: short {} vs long {}",
                    short.strike(),
                    long.strike()
                ),
            });
        }
        if short.option_type() != long.option_type() {
            return Err(SpreadError::InvalidSpread {
                message: "legs must share option type".to_string(),
            });
        }
        if short_expiration.trading_days() >= long_expiration.trading_days() {
            return Err(SpreadError::InvalidSpread {
                message: format!(
                    "short leg must expire first: {} vs {} trading days",
                    short_expiration.trading_days(),
                    long_expiration.trading_days()
                ),
            });
        }
        Ok(Self {
            short_leg: SpreadLeg::short(short),
            long_leg: SpreadLeg::long(long),
            short_expiration,
            long_expiration,
        })
    }

    /// Set the contract count on both legs.
    #[must_use]
    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.short_leg = self.short_leg.with_quantity(quantity);
        self.long_leg = self.long_leg.with_quantity(quantity);
        self
    }

    /// Short (near) leg.
    #[must_use]
    pub const fn short_leg(&self) -> &SpreadLeg {
        &self.short_leg
    }

    /// Long (far) leg.
    #[must_use]
    pub const fn long_leg(&self) -> &SpreadLeg {
        &self.long_leg
    }

    /// Leg with `role`.
    #[must_use]
    pub const fn leg(&self, role: LegRole) -> &SpreadLeg {
        match role {
            LegRole::Short => &self.short_leg,
            LegRole::Long => &self.long_leg,
        }
    }

    /// Short leg expiration.
    #[must_use]
    pub const fn short_expiration(&self) -> Expiration {
        self.short_expiration
    }

    /// Long leg expiration.
    #[must_use]
    pub const fn long_expiration(&self) -> Expiration {
        self.long_expiration
    }

    /// Shared strike.
    #[must_use]
    pub const fn strike(&self) -> Decimal {
        self.short_leg.contract().strike()
    }

    /// Shared option type.
    #[must_use]
    pub const fn option_type(&self) -> OptionType {
        self.short_leg.contract().option_type()
    }

    /// Underlying symbol.
    #[must_use]
    pub fn underlying(&self) -> &str {
        self.short_leg.contract().underlying()
    }

    /// Per-spread debit at mid prices (long mid minus short mid).
    #[must_use]
    pub fn net_debit(&self) -> Option<Decimal> {
        let long = self.long_leg.contract().mid()?;
        let short = self.short_leg.contract().mid()?;
        Some(long - short)
    }
}

impl std::fmt::Display for CalendarSpread {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} calendar: short {} / long {}",
            self.underlying(),
            self.strike(),
            self.option_type(),
            self.short_expiration,
            self.long_expiration
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn contract(strike: Decimal, day: u32, ty: OptionType) -> OptionContract {
        OptionContract::new(format!("SPY-{day}-{strike}"), "SPY", strike, date(day), ty)
    }

    #[test]
    fn builds_valid_spread() {
        let spread = CalendarSpread::new(
            contract(dec!(450), 18, OptionType::Call),
            contract(dec!(450), 19, OptionType::Call),
            Expiration::new(date(18), 3),
            Expiration::new(date(19), 4),
        )
        .unwrap();
        assert_eq!(spread.strike(), dec!(450));
        assert_eq!(spread.short_leg().role(), LegRole::Short);
        assert_eq!(spread.long_leg().role(), LegRole::Long);
        assert_eq!(spread.underlying(), "SPY");
    }

    #[test]
    fn rejects_mismatched_strikes() {
        let err = CalendarSpread::new(
            contract(dec!(450), 18, OptionType::Call),
            contract(dec!(455), 19, OptionType::Call),
            Expiration::new(date(18), 3),
            Expiration::new(date(19), 4),
        )
        .unwrap_err();
        assert!(matches!(err, SpreadError::InvalidSpread { .. }));
    }

    #[test]
    fn rejects_mismatched_types() {
        assert!(
            CalendarSpread::new(
                contract(dec!(450), 18, OptionType::Call),
                contract(dec!(450), 19, OptionType::Put),
                Expiration::new(date(18), 3),
                Expiration::new(date(19), 4),
            )
            .is_err()
        );
    }

    #[test]
    fn rejects_short_not_before_long() {
        assert!(
            CalendarSpread::new(
                contract(dec!(450), 19, OptionType::Call),
                contract(dec!(450), 19, OptionType::Call),
                Expiration::new(date(19), 4),
                Expiration::new(date(19), 4),
            )
            .is_err()
        );
    }

    #[test]
    fn net_debit_uses_mids() {
        let short = contract(dec!(450), 18, OptionType::Call).with_quotes(
            Some(dec!(1.00)),
            Some(dec!(1.20)),
            None,
        );
        let long = contract(dec!(450), 19, OptionType::Call).with_quotes(
            Some(dec!(1.50)),
            Some(dec!(1.70)),
            None,
        );
        let spread = CalendarSpread::new(
            short,
            long,
            Expiration::new(date(18), 3),
            Expiration::new(date(19), 4),
        )
        .unwrap()
        .with_quantity(dec!(2));
        assert_eq!(spread.net_debit(), Some(dec!(0.50)));
        assert_eq!(spread.long_leg().quantity(), dec!(2));
    }
}
