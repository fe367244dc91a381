//! Order value objects.

mod order_change;
mod order_payload;
mod order_terms;

pub use order_change::OrderChange;
pub use order_payload::{
    AdvancedKind, AdvancedOrder, MAX_TAG_LEN, MultilegOrder, OrderLeg, OrderPayload,
    SingleLegOrder, validate_tag,
};
pub use order_terms::{OrderClass, OrderDuration, OrderSide, OrderType};
