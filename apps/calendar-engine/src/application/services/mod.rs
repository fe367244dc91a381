//! Application Services
//!
//! Port wrappers shared by several use cases.

mod account_resolver;
mod chain_resolver;
mod session_manager;

pub use account_resolver::resolve_account;
pub use chain_resolver::{ChainPair, OptionChainResolver};
pub use session_manager::{DEFAULT_REFRESH_MARGIN_SECS, StreamingSessionManager};
