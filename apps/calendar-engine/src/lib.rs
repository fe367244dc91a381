// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! Calendar Engine - Rust Core Library
//!
//! Options calendar-spread engine for the Tradier brokerage API.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Selection and composition logic with no I/O
//!   - `option_chain`: Contracts, expirations, delta matching, trading days
//!   - `calendar_spread`: Expiration pair and strike selection
//!   - `order_composition`: Order payloads and the spread order composer
//!   - `positions`: Account positions and OCC symbol parsing
//!   - `streaming`: Event feed session tokens
//!
//! - **Application**: Use cases and orchestration
//!   - `ports`: `MarketDataPort`, `BrokerPort`, `StreamSessionPort`
//!   - `use_cases`: build, estimate, preview, open, close, roll, positions, orders
//!   - `services`: chain resolution, account resolution, session management
//!
//! - **Infrastructure**: Adapters
//!   - `tradier`: REST adapter implementing every port
//!   - `streaming`: reconnecting WebSocket and HTTP event feed clients
//!   - `telemetry`: tracing subscriber and Prometheus metrics

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Cross-cutting
// =============================================================================

/// Environment configuration.
pub mod config;

/// Error taxonomy.
pub mod error;

// =============================================================================
// Re-exports
// =============================================================================

// Domain re-exports
pub use domain::calendar_spread::{CalendarSpread, SpreadError, SpreadRequest};
pub use domain::option_chain::{OptionContract, OptionType};
pub use domain::order_composition::{OrderPayload, OrderValidationError};

// Application re-exports
pub use application::ports::{
    BrokerError, BrokerPort, MarketDataError, MarketDataPort, SessionError, StreamSessionPort,
};
pub use application::use_cases::{
    BuildCalendarSpreadUseCase, CloseCalendarSpreadUseCase, EstimateNextDayUseCase,
    OpenCalendarSpreadUseCase, PreviewCalendarSpreadUseCase, RollCalendarSpreadUseCase,
};

// Infrastructure re-exports
pub use infrastructure::streaming::{
    HttpStreamClient, StreamConfig, StreamError, StreamEvent, StreamState, WebSocketStreamClient,
};
pub use infrastructure::tradier::{TradierAdapter, TradierConfig, TradierEnvironment, TradierError};

// Cross-cutting re-exports
pub use config::{ConfigError, EngineConfig};
pub use error::{Categorized, ErrorCategory, ErrorReport};
