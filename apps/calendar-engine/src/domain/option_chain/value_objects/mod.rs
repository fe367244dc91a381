//! Option chain value objects.

mod expiration;
mod option_contract;
mod quote;

pub use expiration::{Expiration, ExpirationSet};
pub use option_contract::{Greeks, OptionContract, OptionType};
pub use quote::Quote;
