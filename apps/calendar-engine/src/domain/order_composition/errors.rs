//! Order Composition Errors

use rust_decimal::Decimal;
use thiserror::Error;

use super::value_objects::{OrderClass, OrderType};

/// Order payloads rejected before submission.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderValidationError {
    /// Quantity must be positive.
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity { quantity: Decimal },

    /// Order type needs a limit price.
    #[error("Price is required for {order_type} orders")]
    MissingPrice { order_type: OrderType },

    /// Order type needs a stop price.
    #[error("Stop price is required for {order_type} orders")]
    MissingStop { order_type: OrderType },

    /// Order type not accepted for this class.
    #[error("Order type {order_type} is not valid for {class} orders")]
    UnsupportedOrderType {
        order_type: OrderType,
        class: OrderClass,
    },

    /// Wrong number of legs or child orders.
    #[error("{class} orders need {expected} legs, got {actual}")]
    InvalidLegCount {
        class: OrderClass,
        expected: usize,
        actual: usize,
    },

    /// Option OCO orders must share one option symbol.
    #[error("OCO orders require the same option symbol: {first} vs {second}")]
    OcoSymbolMismatch { first: String, second: String },

    /// OCO orders must use different order types.
    #[error("OCO orders require different order types, both are {order_type}")]
    OcoSameOrderType { order_type: OrderType },

    /// Tag is too long or has characters the brokerage rejects.
    #[error("Invalid order tag: {tag}")]
    InvalidTag { tag: String },

    /// Required field missing.
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Side does not apply to the instrument.
    #[error("Invalid side {side} for {class} order")]
    InvalidSide { side: String, class: OrderClass },

    /// Modification changes nothing.
    #[error("Order change has no fields to update")]
    EmptyChange,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = OrderValidationError::MissingPrice {
            order_type: OrderType::Limit,
        };
        assert_eq!(err.to_string(), "Price is required for limit orders");

        let err = OrderValidationError::InvalidLegCount {
            class: OrderClass::Otoco,
            expected: 3,
            actual: 2,
        };
        assert_eq!(err.to_string(), "otoco orders need 3 legs, got 2");
    }
}
