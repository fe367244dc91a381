//! Option chain domain services.

pub mod delta_matcher;
pub mod greeks_estimator;
pub mod trading_calendar;

pub use delta_matcher::{find_closest_delta, rank_by_delta, signed_target};
pub use greeks_estimator::{DeltaEstimator, black_scholes_delta};
pub use trading_calendar::{is_weekday, trading_days_until};
