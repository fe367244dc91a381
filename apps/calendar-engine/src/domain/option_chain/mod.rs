//! Option Chain Bounded Context
//!
//! Listed contracts, expirations annotated with trading days, and the pure
//! selection logic that runs over a chain snapshot:
//! - Weekday counting to expiration
//! - Delta matching against a signed target
//! - Black-Scholes delta fallback when live greeks are missing

pub mod services;
pub mod value_objects;

pub use services::{DeltaEstimator, find_closest_delta, trading_days_until};
pub use value_objects::{Expiration, ExpirationSet, Greeks, OptionContract, OptionType, Quote};
