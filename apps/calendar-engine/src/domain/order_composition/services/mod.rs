//! Order composition services.

pub mod spread_order_composer;

pub use spread_order_composer::{
    ClosingOrders, OpenOrderOptions, close_tag, compose_close, compose_close_oco, compose_open,
    open_tag,
};
