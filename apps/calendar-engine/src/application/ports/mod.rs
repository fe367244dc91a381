//! Application Ports (Driven)
//!
//! Ports define interfaces for interacting with external systems.
//! The Tradier adapter in `infrastructure::tradier` implements all three.

mod broker_port;
mod market_data_port;
mod stream_session_port;

pub use broker_port::{
    AccountSummary, Balances, BrokerError, BrokerPort, OrderAck, OrderPreview, OrderRecord,
};
pub use market_data_port::{MarketDataError, MarketDataPort};
pub use stream_session_port::{SessionError, StreamSessionPort};
