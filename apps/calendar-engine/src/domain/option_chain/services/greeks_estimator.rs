//! Black-Scholes delta approximation.
//!
//! Only used when a chain snapshot carries no live greeks.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;

use crate::domain::option_chain::value_objects::{OptionContract, OptionType};

/// Calendar days per year used to convert time to expiry.
const DAYS_PER_YEAR: f64 = 365.0;

/// Smallest time to expiry used, so same-day contracts stay finite.
const MIN_YEARS: f64 = 1.0 / (DAYS_PER_YEAR * 24.0);

/// Standard normal CDF.
fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + libm::erf(x / std::f64::consts::SQRT_2))
}

/// Black-Scholes d1 parameter.
fn d1(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> f64 {
    ((s / k).ln() + (r + 0.5 * sigma * sigma) * t) / (sigma * t.sqrt())
}

/// Closed-form delta for a European option.
///
/// Returns `None` for non-positive or non-finite inputs.
#[must_use]
pub fn black_scholes_delta(
    spot: f64,
    strike: f64,
    years: f64,
    rate: f64,
    volatility: f64,
    option_type: OptionType,
) -> Option<f64> {
    if !(spot > 0.0 && strike > 0.0 && volatility > 0.0) || !rate.is_finite() {
        return None;
    }
    let t = years.max(MIN_YEARS);
    let d1_val = d1(spot, strike, t, rate, volatility);
    if !d1_val.is_finite() {
        return None;
    }
    Some(match option_type {
        OptionType::Call => norm_cdf(d1_val),
        OptionType::Put => norm_cdf(d1_val) - 1.0,
    })
}

/// Estimates deltas for contracts of one underlying at a fixed spot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeltaEstimator {
    spot: f64,
    rate: f64,
    volatility: f64,
    as_of: NaiveDate,
}

impl DeltaEstimator {
    /// Create an estimator for `spot` on `as_of`.
    #[must_use]
    pub const fn new(spot: f64, rate: f64, volatility: f64, as_of: NaiveDate) -> Self {
        Self {
            spot,
            rate,
            volatility,
            as_of,
        }
    }

    /// Estimated delta for `contract`.
    #[must_use]
    pub fn estimate(&self, contract: &OptionContract) -> Option<f64> {
        let strike = contract.strike().to_f64()?;
        let days = (contract.expiration() - self.as_of).num_days().max(0);
        let years = days as f64 / DAYS_PER_YEAR;
        black_scholes_delta(
            self.spot,
            strike,
            years,
            self.rate,
            self.volatility,
            contract.option_type(),
        )
    }
}
