//! Infrastructure Layer
//!
//! Adapters for the ports defined in the application layer, plus the
//! runtime plumbing around them:
//!
//! - `tradier/`: REST adapter for market data, brokerage and stream sessions
//! - `streaming/`: reconnecting WebSocket and HTTP event feed clients
//! - `telemetry/`: tracing subscriber and Prometheus metrics

pub mod streaming;
pub mod telemetry;
pub mod tradier;
