//! Strike alignment for calendar spreads.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::option_chain::{OptionContract, OptionType};

/// Underlyings listed with $5 strike increments in the near weeklies.
const FIVE_POINT_UNDERLYINGS: [&str; 3] = ["SPY", "QQQ", "DIA"];

/// Floating-point safety margin when comparing strikes.
pub const STRIKE_TOLERANCE: Decimal = dec!(0.01);

/// Strike increment used to apply a strike offset.
#[must_use]
pub fn strike_increment(underlying: &str) -> Decimal {
    if FIVE_POINT_UNDERLYINGS
        .iter()
        .any(|s| s.eq_ignore_ascii_case(underlying))
    {
        dec!(5)
    } else {
        Decimal::ONE
    }
}

/// `base + offset × increment(underlying)`.
#[must_use]
pub fn offset_strike(base: Decimal, offset: i32, underlying: &str) -> Decimal {
    base + Decimal::from(offset) * strike_increment(underlying)
}

/// First contract of `option_type` within tolerance of `strike`.
#[must_use]
pub fn find_at_strike(
    chain: &[OptionContract],
    strike: Decimal,
    option_type: OptionType,
) -> Option<&OptionContract> {
    chain
        .iter()
        .find(|c| c.option_type() == option_type && (c.strike() - strike).abs() < STRIKE_TOLERANCE)
}
