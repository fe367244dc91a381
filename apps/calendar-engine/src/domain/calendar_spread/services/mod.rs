//! Calendar spread domain services.

pub mod expiration_selector;
pub mod strike_selector;

pub use expiration_selector::{ExpirationPair, find_near_trading_days, select_expiration_pair};
pub use strike_selector::{STRIKE_TOLERANCE, find_at_strike, offset_strike, strike_increment};
