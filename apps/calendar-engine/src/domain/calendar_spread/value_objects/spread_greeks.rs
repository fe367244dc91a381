//! Net greeks of a calendar spread.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::calendar_spread::CalendarSpread;

/// Net delta/theta for `quantity` spreads (long minus short).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpreadGreeks {
    /// Net delta.
    pub net_delta: f64,
    /// Net theta per day.
    pub net_theta: f64,
    /// Net theta accrued over the short leg's remaining trading days.
    pub estimated_theta_proceeds: f64,
}

impl SpreadGreeks {
    /// Compute from leg greeks; missing greeks count as zero.
    #[must_use]
    pub fn for_spread(spread: &CalendarSpread, quantity: Decimal) -> Self {
        let qty = quantity.to_f64().unwrap_or(0.0);
        let short = spread.short_leg().contract();
        let long = spread.long_leg().contract();
        let net_delta = (long.delta().unwrap_or(0.0) - short.delta().unwrap_or(0.0)) * qty;
        let net_theta = (long.theta().unwrap_or(0.0) - short.theta().unwrap_or(0.0)) * qty;
        Self {
            net_delta,
            net_theta,
            estimated_theta_proceeds: net_theta * f64::from(spread.short_expiration().trading_days()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::option_chain::{Expiration, Greeks, OptionContract, OptionType};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn long_minus_short_times_quantity() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        let greeks = |delta, theta| Greeks {
            delta: Some(delta),
            theta: Some(theta),
            ..Greeks::default()
        };
        let short = OptionContract::new("S", "SPY", dec!(450), d(18), OptionType::Call)
            .with_greeks(greeks(0.35, -0.40));
        let long = OptionContract::new("L", "SPY", dec!(450), d(19), OptionType::Call)
            .with_greeks(greeks(0.38, -0.30));
        let spread = CalendarSpread::new(
            short,
            long,
            Expiration::new(d(18), 3),
            Expiration::new(d(19), 4),
        )
        .unwrap();

        let g = SpreadGreeks::for_spread(&spread, dec!(2));
        assert!((g.net_delta - 0.06).abs() < 1e-9);
        assert!((g.net_theta - 0.20).abs() < 1e-9);
        assert!((g.estimated_theta_proceeds - 0.60).abs() < 1e-9);
    }
}
