//! Form encoding of order payloads.
//!
//! Single-leg orders use flat fields, multileg orders index their legs
//! (`option_symbol[0]`, `side[0]`, ...), and conditional groups index
//! every child field.

use rust_decimal::Decimal;

use crate::domain::order_composition::{
    AdvancedOrder, MultilegOrder, OrderChange, OrderClass, OrderPayload, SingleLegOrder,
};

/// Ordered form fields for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderForm {
    fields: Vec<(String, String)>,
}

impl OrderForm {
    fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.push((key.into(), value.into()));
    }

    fn push_opt(&mut self, key: impl Into<String>, value: Option<impl Into<String>>) {
        if let Some(value) = value {
            self.push(key, value);
        }
    }

    /// Value of `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Fields in insertion order.
    #[must_use]
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Encode an order submission.
    #[must_use]
    pub fn for_payload(payload: &OrderPayload, preview: bool) -> Self {
        let mut form = Self::default();
        match payload {
            OrderPayload::Single(order) => form.single(order),
            OrderPayload::Multileg(order) => form.multileg(order),
            OrderPayload::Advanced(order) => form.advanced(order),
        }
        if preview {
            form.push("preview", "true");
        }
        form
    }

    /// Encode an order modification.
    #[must_use]
    pub fn for_change(change: &OrderChange) -> Self {
        let mut form = Self::default();
        form.push_opt("type", change.order_type.map(|t| t.as_str()));
        form.push_opt("duration", change.duration.map(|d| d.as_str()));
        form.push_opt("price", change.price.map(decimal));
        form.push_opt("stop", change.stop.map(decimal));
        form.push_opt("tag", change.tag.as_deref());
        form
    }

    fn single(&mut self, order: &SingleLegOrder) {
        let class = order.class();
        self.push("class", class.as_str());
        self.push("symbol", order.symbol.as_str());
        if class == OrderClass::Option {
            self.push_opt("option_symbol", order.option_symbol.as_deref());
        }
        self.push("side", order.side.as_str());
        self.push("quantity", decimal(order.quantity));
        self.push("type", order.order_type.as_str());
        self.push("duration", order.duration.as_str());
        self.push_opt("price", order.price.map(decimal));
        self.push_opt("stop", order.stop.map(decimal));
        self.push_opt("tag", order.tag.as_deref());
    }

    fn multileg(&mut self, order: &MultilegOrder) {
        self.push("class", OrderClass::Multileg.as_str());
        self.push("symbol", order.symbol.as_str());
        self.push("type", order.order_type.as_str());
        self.push("duration", order.duration.as_str());
        self.push_opt("price", order.price.map(decimal));
        for (i, leg) in order.legs.iter().enumerate() {
            self.push(format!("option_symbol[{i}]"), leg.option_symbol.as_str());
            self.push(format!("side[{i}]"), leg.side.as_str());
            self.push(format!("quantity[{i}]"), decimal(leg.quantity));
        }
        self.push_opt("tag", order.tag.as_deref());
    }

    fn advanced(&mut self, order: &AdvancedOrder) {
        self.push("class", order.kind.class().as_str());
        for (i, child) in order.orders.iter().enumerate() {
            self.push(format!("symbol[{i}]"), child.symbol.as_str());
            self.push(format!("side[{i}]"), child.side.as_str());
            self.push(format!("quantity[{i}]"), decimal(child.quantity));
            self.push(format!("type[{i}]"), child.order_type.as_str());
            self.push(format!("duration[{i}]"), child.duration.as_str());
            self.push_opt(format!("option_symbol[{i}]"), child.option_symbol.as_deref());
            self.push_opt(format!("price[{i}]"), child.price.map(decimal));
            self.push_opt(format!("stop[{i}]"), child.stop.map(decimal));
            self.push_opt(format!("tag[{i}]"), child.tag.as_deref());
        }
        self.push_opt("tag", order.tag.as_deref());
    }
}

fn decimal(value: Decimal) -> String {
    value.normalize().to_string()
}
