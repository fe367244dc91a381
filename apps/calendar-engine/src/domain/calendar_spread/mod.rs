//! Calendar Spread Bounded Context
//!
//! A calendar spread sells a near-dated option and buys a later-dated
//! option of the same type at the same strike. This context owns:
//! - Expiration pair selection (short ~3, long ~4 trading days)
//! - Strike offsets in exchange-specific increments
//! - The spread value object and its net greeks

pub mod errors;
pub mod services;
pub mod value_objects;

pub use errors::SpreadError;
pub use services::{
    ExpirationPair, find_at_strike, find_near_trading_days, offset_strike, select_expiration_pair,
    strike_increment,
};
pub use value_objects::{CalendarSpread, LegRole, SpreadGreeks, SpreadLeg, SpreadRequest};
