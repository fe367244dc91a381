//! Position domain services.

pub mod position_classifier;

pub use position_classifier::{
    CalendarPair, ClassifiedPositions, SpreadLegs, classify, legs_to_close, option_positions,
};
