//! Positions Bounded Context
//!
//! Account positions are never stored; they are re-read from the brokerage
//! on each operation and classified into calendar spread legs on demand.

pub mod services;
pub mod value_objects;

pub use services::{CalendarPair, ClassifiedPositions, SpreadLegs, classify, legs_to_close};
pub use value_objects::{OccSymbol, Position, is_occ_symbol};
