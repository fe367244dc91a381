//! Order Composition Bounded Context
//!
//! Brokerage order payloads (single-leg, multileg, OTO/OCO/OTOCO), their
//! pre-submission validation, and the calendar spread composer.

pub mod errors;
pub mod services;
pub mod value_objects;

pub use errors::OrderValidationError;
pub use services::{ClosingOrders, OpenOrderOptions, compose_close, compose_open};
pub use value_objects::{
    AdvancedKind, AdvancedOrder, MultilegOrder, OrderChange, OrderClass, OrderDuration, OrderLeg,
    OrderPayload, OrderSide, OrderType, SingleLegOrder,
};
