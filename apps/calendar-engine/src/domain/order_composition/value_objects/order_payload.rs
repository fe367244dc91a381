//! Order payloads prior to wire encoding.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::order_terms::{OrderClass, OrderDuration, OrderSide, OrderType};
use crate::domain::order_composition::errors::OrderValidationError;

/// Brokerage limit on tag length.
pub const MAX_TAG_LEN: usize = 255;

/// Validate an order tag: ASCII alphanumerics, `-` and `_`.
pub fn validate_tag(tag: &str) -> Result<(), OrderValidationError> {
    let valid = !tag.is_empty()
        && tag.len() <= MAX_TAG_LEN
        && tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(OrderValidationError::InvalidTag {
            tag: tag.to_string(),
        })
    }
}

fn validate_quantity(quantity: Decimal) -> Result<(), OrderValidationError> {
    if quantity <= Decimal::ZERO {
        return Err(OrderValidationError::InvalidQuantity { quantity });
    }
    Ok(())
}

fn validate_prices(
    order_type: OrderType,
    price: Option<Decimal>,
    stop: Option<Decimal>,
) -> Result<(), OrderValidationError> {
    if order_type.requires_price() && price.is_none() {
        return Err(OrderValidationError::MissingPrice { order_type });
    }
    if order_type.requires_stop() && stop.is_none() {
        return Err(OrderValidationError::MissingStop { order_type });
    }
    Ok(())
}

/// A single equity or option order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleLegOrder {
    /// Underlying (equity) symbol.
    pub symbol: String,
    /// OCC symbol for option orders; `None` for equity orders.
    pub option_symbol: Option<String>,
    /// Side.
    pub side: OrderSide,
    /// Quantity (shares or contracts).
    pub quantity: Decimal,
    /// Order type.
    pub order_type: OrderType,
    /// Time in force.
    pub duration: OrderDuration,
    /// Limit price.
    pub price: Option<Decimal>,
    /// Stop price.
    pub stop: Option<Decimal>,
    /// Client tag.
    pub tag: Option<String>,
}

impl SingleLegOrder {
    /// Market day order for one option contract symbol.
    #[must_use]
    pub fn option_market(
        symbol: impl Into<String>,
        option_symbol: impl Into<String>,
        side: OrderSide,
        quantity: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            option_symbol: Some(option_symbol.into()),
            side,
            quantity,
            order_type: OrderType::Market,
            duration: OrderDuration::Day,
            price: None,
            stop: None,
            tag: None,
        }
    }

    /// Attach a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Equity or option.
    #[must_use]
    pub const fn class(&self) -> OrderClass {
        if self.option_symbol.is_some() {
            OrderClass::Option
        } else {
            OrderClass::Equity
        }
    }

    /// Check fields before submission.
    pub fn validate(&self) -> Result<(), OrderValidationError> {
        if self.symbol.trim().is_empty() {
            return Err(OrderValidationError::MissingField {
                field: "symbol".to_string(),
            });
        }
        validate_quantity(self.quantity)?;
        if !self.order_type.is_single_leg() {
            return Err(OrderValidationError::UnsupportedOrderType {
                order_type: self.order_type,
                class: self.class(),
            });
        }
        if self.side.is_option_side() != self.option_symbol.is_some() {
            return Err(OrderValidationError::InvalidSide {
                side: self.side.to_string(),
                class: self.class(),
            });
        }
        validate_prices(self.order_type, self.price, self.stop)?;
        if let Some(tag) = &self.tag {
            validate_tag(tag)?;
        }
        Ok(())
    }
}

/// One leg of a multileg option order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLeg {
    /// OCC symbol.
    pub option_symbol: String,
    /// Side.
    pub side: OrderSide,
    /// Contracts.
    pub quantity: Decimal,
}

/// Multileg option order on one underlying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultilegOrder {
    /// Underlying symbol.
    pub symbol: String,
    /// Order type.
    pub order_type: OrderType,
    /// Time in force.
    pub duration: OrderDuration,
    /// Net price for priced types.
    pub price: Option<Decimal>,
    /// Legs, in submission order.
    pub legs: Vec<OrderLeg>,
    /// Client tag.
    pub tag: Option<String>,
}

impl MultilegOrder {
    /// Check fields before submission.
    pub fn validate(&self) -> Result<(), OrderValidationError> {
        if self.symbol.trim().is_empty() {
            return Err(OrderValidationError::MissingField {
                field: "symbol".to_string(),
            });
        }
        if self.legs.len() < 2 {
            return Err(OrderValidationError::InvalidLegCount {
                class: OrderClass::Multileg,
                expected: 2,
                actual: self.legs.len(),
            });
        }
        if !self.order_type.is_multileg() {
            return Err(OrderValidationError::UnsupportedOrderType {
                order_type: self.order_type,
                class: OrderClass::Multileg,
            });
        }
        for leg in &self.legs {
            validate_quantity(leg.quantity)?;
            if !leg.side.is_option_side() {
                return Err(OrderValidationError::InvalidSide {
                    side: leg.side.to_string(),
                    class: OrderClass::Multileg,
                });
            }
        }
        validate_prices(self.order_type, self.price, None)?;
        if let Some(tag) = &self.tag {
            validate_tag(tag)?;
        }
        Ok(())
    }
}

/// Conditional order families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvancedKind {
    /// First fill triggers the second order.
    Oto,
    /// First fill cancels the other.
    Oco,
    /// First fill triggers an OCO pair.
    Otoco,
}

impl AdvancedKind {
    /// Number of child orders.
    #[must_use]
    pub const fn order_count(self) -> usize {
        match self {
            Self::Oto | Self::Oco => 2,
            Self::Otoco => 3,
        }
    }

    /// Order class.
    #[must_use]
    pub const fn class(self) -> OrderClass {
        match self {
            Self::Oto => OrderClass::Oto,
            Self::Oco => OrderClass::Oco,
            Self::Otoco => OrderClass::Otoco,
        }
    }
}

/// OTO / OCO / OTOCO order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvancedOrder {
    /// Family.
    pub kind: AdvancedKind,
    /// Child orders in brokerage index order.
    pub orders: Vec<SingleLegOrder>,
    /// Client tag for the whole group.
    pub tag: Option<String>,
}

impl AdvancedOrder {
    /// Check fields before submission.
    pub fn validate(&self) -> Result<(), OrderValidationError> {
        let class = self.kind.class();
        let expected = self.kind.order_count();
        if self.orders.len() != expected {
            return Err(OrderValidationError::InvalidLegCount {
                class,
                expected,
                actual: self.orders.len(),
            });
        }
        for order in &self.orders {
            order.validate()?;
        }
        if self.kind == AdvancedKind::Oco {
            Self::validate_oco_pair(&self.orders[0], &self.orders[1])?;
        }
        if self.kind == AdvancedKind::Otoco {
            Self::validate_oco_pair(&self.orders[1], &self.orders[2])?;
        }
        if let Some(tag) = &self.tag {
            validate_tag(tag)?;
        }
        Ok(())
    }

    fn validate_oco_pair(
        first: &SingleLegOrder,
        second: &SingleLegOrder,
    ) -> Result<(), OrderValidationError> {
        if first.option_symbol != second.option_symbol || first.symbol != second.symbol {
            return Err(OrderValidationError::OcoSymbolMismatch {
                first: first
                    .option_symbol
                    .clone()
                    .unwrap_or_else(|| first.symbol.clone()),
                second: second
                    .option_symbol
                    .clone()
                    .unwrap_or_else(|| second.symbol.clone()),
            });
        }
        if first.order_type == second.order_type {
            return Err(OrderValidationError::OcoSameOrderType {
                order_type: first.order_type,
            });
        }
        Ok(())
    }
}

/// Any order the engine can submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "payload", rename_all = "snake_case")]
pub enum OrderPayload {
    /// Single equity/option order.
    Single(SingleLegOrder),
    /// Multileg option order.
    Multileg(MultilegOrder),
    /// Conditional order group.
    Advanced(AdvancedOrder),
}

impl OrderPayload {
    /// Order class.
    #[must_use]
    pub const fn class(&self) -> OrderClass {
        match self {
            Self::Single(order) => order.class(),
            Self::Multileg(_) => OrderClass::Multileg,
            Self::Advanced(order) => order.kind.class(),
        }
    }

    /// Whether this is a one-cancels-other group.
    #[must_use]
    pub const fn is_oco(&self) -> bool {
        matches!(self, Self::Advanced(order) if matches!(order.kind, AdvancedKind::Oco))
    }

    /// Client tag.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Single(order) => order.tag.as_deref(),
            Self::Multileg(order) => order.tag.as_deref(),
            Self::Advanced(order) => order.tag.as_deref(),
        }
    }

    /// Underlying symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        match self {
            Self::Single(order) => &order.symbol,
            Self::Multileg(order) => &order.symbol,
            Self::Advanced(order) => order.orders.first().map_or("", |o| o.symbol.as_str()),
        }
    }

    /// Check fields before submission.
    pub fn validate(&self) -> Result<(), OrderValidationError> {
        match self {
            Self::Single(order) => order.validate(),
            Self::Multileg(order) => order.validate(),
            Self::Advanced(order) => order.validate(),
        }
    }
}
