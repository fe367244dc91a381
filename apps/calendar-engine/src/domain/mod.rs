//! Domain Layer
//!
//! The innermost layer containing business logic with zero infrastructure dependencies.
//! This layer defines:
//!
//! - **Value Objects**: Immutable domain types with equality by value
//! - **Domain Services**: Stateless selection and composition logic
//!
//! # Bounded Contexts
//!
//! - [`option_chain`]: Contracts, expirations, delta matching, trading days
//! - [`calendar_spread`]: Expiration pair and strike selection, the spread itself
//! - [`order_composition`]: Order payloads, validation, spread order composer
//! - [`positions`]: Account positions, OCC symbols, calendar leg pairing
//! - [`streaming`]: Event feed session tokens

pub mod calendar_spread;
pub mod option_chain;
pub mod order_composition;
pub mod positions;
pub mod streaming;
