//! Broker Port (Driven Port)
//!
//! Interface for account state and order routing at the brokerage.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order_composition::{OrderChange, OrderPayload};
use crate::domain::positions::Position;

/// Brokerage account summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    /// Account number used in account-scoped endpoints.
    pub account_number: String,
    /// Cash, margin, ...
    pub account_type: Option<String>,
    /// Account status.
    pub status: Option<String>,
    /// Options approval level.
    pub option_level: Option<u8>,
}

/// Account balances snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Balances {
    /// Account number.
    pub account_number: Option<String>,
    /// Account type.
    pub account_type: Option<String>,
    /// Total equity.
    pub total_equity: Option<Decimal>,
    /// Total cash.
    pub total_cash: Option<Decimal>,
    /// Market value of all positions.
    pub market_value: Option<Decimal>,
    /// Long option market value.
    pub option_long_value: Option<Decimal>,
    /// Short option market value.
    pub option_short_value: Option<Decimal>,
    /// Open profit/loss.
    pub open_pl: Option<Decimal>,
    /// Closed profit/loss.
    pub close_pl: Option<Decimal>,
    /// Pending orders.
    pub pending_orders_count: Option<u32>,
}

/// Order as listed by the account orders endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Brokerage order id.
    pub id: u64,
    /// Status (open, filled, canceled, ...).
    pub status: String,
    /// Order class.
    pub class: Option<String>,
    /// Underlying symbol.
    pub symbol: Option<String>,
    /// OCC symbol for option orders.
    pub option_symbol: Option<String>,
    /// Side.
    pub side: Option<String>,
    /// Quantity.
    pub quantity: Option<Decimal>,
    /// Order type.
    pub order_type: Option<String>,
    /// Client tag.
    pub tag: Option<String>,
    /// Creation time as reported.
    pub create_date: Option<String>,
}

/// Cost estimate returned for a preview submission.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderPreview {
    /// Whether the order would be accepted.
    pub result: Option<bool>,
    /// Commission.
    pub commission: Option<Decimal>,
    /// Total cost.
    pub cost: Option<Decimal>,
    /// Fees.
    pub fees: Option<Decimal>,
    /// Margin change.
    pub margin_change: Option<Decimal>,
    /// Strategy recognized by the brokerage.
    pub strategy: Option<String>,
}

/// Acknowledgment from broker after order submission, change or cancel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAck {
    /// Brokerage order id; absent for previews.
    pub order_id: Option<u64>,
    /// Status reported by the brokerage.
    pub status: String,
    /// Preview details when submitted with `preview`.
    pub preview: Option<OrderPreview>,
}

impl OrderAck {
    /// Acknowledgment of an accepted order.
    #[must_use]
    pub fn accepted(order_id: u64) -> Self {
        Self {
            order_id: Some(order_id),
            status: "ok".to_string(),
            preview: None,
        }
    }
}

/// Broker port error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BrokerError {
    /// Connection error.
    #[error("Broker connection error: {message}")]
    ConnectionError {
        /// Error details.
        message: String,
    },

    /// Authentication failed.
    #[error("Broker authentication failed: {message}")]
    AuthenticationFailed {
        /// Error details.
        message: String,
    },

    /// Order rejected by broker.
    #[error("Order rejected: {reason}")]
    OrderRejected {
        /// Rejection reason.
        reason: String,
    },

    /// Order not found.
    #[error("Order not found: {order_id}")]
    OrderNotFound {
        /// The missing order ID.
        order_id: String,
    },

    /// Rejected locally before submission.
    #[error("Invalid order: {message}")]
    InvalidOrder {
        /// Validation failure.
        message: String,
    },

    /// Rate limited.
    #[error("Rate limited by broker")]
    RateLimited,

    /// Response could not be interpreted.
    #[error("Malformed broker response: {message}")]
    MalformedResponse {
        /// Error details.
        message: String,
    },

    /// Unknown error.
    #[error("Broker error: {message}")]
    Unknown {
        /// Error details.
        message: String,
    },
}

impl From<crate::domain::order_composition::OrderValidationError> for BrokerError {
    fn from(err: crate::domain::order_composition::OrderValidationError) -> Self {
        Self::InvalidOrder {
            message: err.to_string(),
        }
    }
}

/// Port for broker interactions.
#[async_trait]
pub trait BrokerPort: Send + Sync {
    /// Accounts attached to the authenticated user's profile.
    async fn get_profile_accounts(&self) -> Result<Vec<AccountSummary>, BrokerError>;

    /// Accounts from the accounts listing endpoint.
    async fn list_accounts(&self) -> Result<Vec<AccountSummary>, BrokerError>;

    /// Current positions.
    async fn get_positions(&self, account_id: &str) -> Result<Vec<Position>, BrokerError>;

    /// Balances.
    async fn get_balances(&self, account_id: &str) -> Result<Balances, BrokerError>;

    /// Orders for the account.
    async fn get_orders(&self, account_id: &str) -> Result<Vec<OrderRecord>, BrokerError>;

    /// Submit (or preview) an order. The payload is validated first.
    async fn submit_order(
        &self,
        account_id: &str,
        order: &OrderPayload,
        preview: bool,
    ) -> Result<OrderAck, BrokerError>;

    /// Modify a working order.
    async fn change_order(
        &self,
        account_id: &str,
        order_id: u64,
        change: &OrderChange,
    ) -> Result<OrderAck, BrokerError>;

    /// Cancel a working order.
    async fn cancel_order(&self, account_id: &str, order_id: u64)
    -> Result<OrderAck, BrokerError>;
}
