//! Position value objects.

mod occ_symbol;
mod position;

pub use occ_symbol::{OccSymbol, is_occ_symbol};
pub use position::Position;
