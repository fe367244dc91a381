//! Reconnecting clients for the Tradier event feeds.
//!
//! Two transports share one state machine and backoff policy:
//!
//! - [`WebSocketStreamClient`]: market or account events over text frames
//! - [`HttpStreamClient`]: market events as newline-delimited JSON over a
//!   chunked response
//!
//! Each client runs one background task per connection generation and
//! reports [`StreamEvent`]s on an unbounded channel in arrival order.

mod codec;
mod http_stream_client;
mod reconnect;
mod state;
mod subscription;
mod types;
mod websocket_client;

pub use codec::{FeedMessage, LineBuffer, parse_message};
pub use http_stream_client::HttpStreamClient;
pub use reconnect::ReconnectPolicy;
pub use state::{ConnectDecision, ReconnectDecision, StreamStateMachine};
pub use subscription::{AccountSubscription, MarketSubscription, Subscription};
pub use types::{StreamConfig, StreamError, StreamEvent, StreamState, Transport};
pub use websocket_client::WebSocketStreamClient;
