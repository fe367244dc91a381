//! List Positions Use Case

use std::sync::Arc;

use serde::Serialize;

use crate::application::ports::{Balances, BrokerError, BrokerPort};
use crate::application::services::resolve_account;
use crate::domain::positions::{ClassifiedPositions, classify};

/// Option positions grouped into calendar spreads.
#[derive(Debug, Clone, Serialize)]
pub struct PositionsView {
    /// Account read.
    pub account_id: String,
    /// Paired and unpaired legs.
    pub positions: ClassifiedPositions,
    /// Account balances.
    pub balances: Balances,
}

/// Use case for reading positions as calendar spreads.
pub struct ListPositionsUseCase<B: BrokerPort> {
    broker: Arc<B>,
}

impl<B: BrokerPort> ListPositionsUseCase<B> {
    /// Create the use case.
    pub const fn new(broker: Arc<B>) -> Self {
        Self { broker }
    }

    /// Classified positions, optionally limited to one underlying.
    pub async fn execute(&self, underlying: Option<&str>) -> Result<PositionsView, BrokerError> {
        let account_id = resolve_account(self.broker.as_ref()).await?;
        let (positions, balances) = tokio::try_join!(
            self.broker.get_positions(&account_id),
            self.broker.get_balances(&account_id),
        )?;
        Ok(PositionsView {
            positions: classify(&positions, underlying),
            account_id,
            balances,
        })
    }
}
