//! Streaming Bounded Context
//!
//! Session tokens for the brokerage's market and account event feeds.

pub mod session;

pub use session::{SESSION_TTL_SECS, StreamKind, StreamingSession};
