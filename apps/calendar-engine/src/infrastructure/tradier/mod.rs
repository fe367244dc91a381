//! Tradier brokerage adapter.
//!
//! Implements [`MarketDataPort`], [`BrokerPort`] and [`StreamSessionPort`]
//! over the Tradier REST API.
//!
//! # Configuration
//!
//! - `TRADIER_ACCESS_TOKEN`: bearer token
//! - `TRADIER_USE_SANDBOX`: use `sandbox.tradier.com` (delayed data, simulated orders)
//!
//! [`MarketDataPort`]: crate::application::ports::MarketDataPort
//! [`BrokerPort`]: crate::application::ports::BrokerPort
//! [`StreamSessionPort`]: crate::application::ports::StreamSessionPort

mod adapter;
mod api_types;
mod config;
mod error;
mod http_client;
mod order_form;

pub use adapter::{MAX_GET_QUOTE_SYMBOLS, ORDERS_PAGE_LIMIT, TradierAdapter};
pub use api_types::OneOrMany;
pub use config::{DEFAULT_TIMEOUT, StreamEndpoints, TradierConfig, TradierEnvironment};
pub use error::TradierError;
pub use order_form::OrderForm;
