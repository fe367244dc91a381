//! Manage Orders Use Case
//!
//! Lists, modifies and cancels working orders in the resolved account.

use std::sync::Arc;

use crate::application::ports::{BrokerError, BrokerPort, OrderAck, OrderRecord};
use crate::application::services::resolve_account;
use crate::domain::order_composition::OrderChange;

/// Use case for working-order maintenance.
pub struct ManageOrdersUseCase<B: BrokerPort> {
    broker: Arc<B>,
}

impl<B: BrokerPort> ManageOrdersUseCase<B> {
    /// Create the use case.
    pub const fn new(broker: Arc<B>) -> Self {
        Self { broker }
    }

    /// Orders in the account.
    pub async fn list(&self) -> Result<Vec<OrderRecord>, BrokerError> {
        let account_id = resolve_account(self.broker.as_ref()).await?;
        self.broker.get_orders(&account_id).await
    }

    /// Modify `order_id`. The change is validated before any request.
    pub async fn change(&self, order_id: u64, change: &OrderChange) -> Result<OrderAck, BrokerError> {
        change.validate()?;
        let account_id = resolve_account(self.broker.as_ref()).await?;
        let ack = self.broker.change_order(&account_id, order_id, change).await?;
        tracing::info!(account = %account_id, order_id, "Order modified");
        Ok(ack)
    }

    /// Cancel `order_id`.
    pub async fn cancel(&self, order_id: u64) -> Result<OrderAck, BrokerError> {
        let account_id = resolve_account(self.broker.as_ref()).await?;
        let ack = self.broker.cancel_order(&account_id, order_id).await?;
        tracing::info!(account = %account_id, order_id, "Order cancelled");
        Ok(ack)
    }
}
