//! Modification of a working order.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::order_payload::validate_tag;
use super::order_terms::{OrderClass, OrderDuration, OrderType};
use crate::domain::order_composition::errors::OrderValidationError;

/// Fields to change on an open order. Unset fields are left as they are.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderChange {
    /// New order type.
    pub order_type: Option<OrderType>,
    /// New time in force.
    pub duration: Option<OrderDuration>,
    /// New limit price.
    pub price: Option<Decimal>,
    /// New stop price.
    pub stop: Option<Decimal>,
    /// New tag.
    pub tag: Option<String>,
}

impl OrderChange {
    /// Check the change before submission.
    pub fn validate(&self) -> Result<(), OrderValidationError> {
        if self.order_type.is_none()
            && self.duration.is_none()
            && self.price.is_none()
            && self.stop.is_none()
            && self.tag.is_none()
        {
            return Err(OrderValidationError::EmptyChange);
        }
        if let Some(order_type) = self.order_type {
            if !order_type.is_single_leg() {
                return Err(OrderValidationError::UnsupportedOrderType {
                    order_type,
                    class: OrderClass::Option,
                });
            }
            if order_type.requires_price() && self.price.is_none() {
                return Err(OrderValidationError::MissingPrice { order_type });
            }
            if order_type.requires_stop() && self.stop.is_none() {
                return Err(OrderValidationError::MissingStop { order_type });
            }
        }
        if let Some(tag) = &self.tag {
            validate_tag(tag)?;
        }
        Ok(())
    }
}
