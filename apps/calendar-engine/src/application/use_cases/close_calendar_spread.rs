//! Close Calendar Spread Use Case
//!
//! Closes the held legs of a spread with two independent single-leg orders.
//! Each leg is submitted on its own; one leg failing does not stop the other.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::application::ports::{BrokerError, BrokerPort, OrderAck};
use crate::application::services::resolve_account;
use crate::domain::calendar_spread::LegRole;
use crate::domain::order_composition::{OrderPayload, OrderValidationError, compose_close};
use crate::domain::positions::{SpreadLegs, legs_to_close};

/// Request to close a spread in one underlying.
#[derive(Debug, Clone)]
pub struct CloseSpreadRequest {
    /// Underlying whose legs are closed.
    pub underlying: String,
    /// Contracts per leg; capped at the held quantity.
    pub quantity: Decimal,
    /// Date used in the order tags.
    pub date: NaiveDate,
}

/// Outcome of one closing order.
#[derive(Debug, Clone, Serialize)]
pub struct LegCloseOutcome {
    /// Leg closed.
    pub role: LegRole,
    /// OCC symbol of the leg.
    pub option_symbol: String,
    /// Contracts ordered.
    pub quantity: Decimal,
    /// Brokerage acknowledgment on success.
    pub ack: Option<OrderAck>,
    /// Failure message.
    pub error: Option<String>,
}

impl LegCloseOutcome {
    /// Whether the order was accepted.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.ack.is_some()
    }
}

/// Result of closing a spread.
#[derive(Debug, Clone, Serialize)]
pub struct CloseSpreadResponse {
    /// Whether every submitted leg was accepted.
    pub ok: bool,
    /// Account the orders went to.
    pub account_id: String,
    /// Per-leg outcomes, short first.
    pub legs: Vec<LegCloseOutcome>,
}

impl CloseSpreadResponse {
    fn new(account_id: String, legs: Vec<LegCloseOutcome>) -> Self {
        Self {
            ok: legs.iter().all(LegCloseOutcome::is_ok),
            account_id,
            legs,
        }
    }

    /// Acknowledgments of accepted legs.
    #[must_use]
    pub fn acks(&self) -> Vec<OrderAck> {
        self.legs.iter().filter_map(|l| l.ack.clone()).collect()
    }

    /// Joined failure messages, if any leg failed.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        let errors: Vec<String> = self
            .legs
            .iter()
            .filter_map(|l| l.error.as_ref().map(|e| format!("{:?} leg: {e}", l.role)))
            .collect();
        (!errors.is_empty()).then(|| errors.join("; "))
    }
}

/// Close failure before any order was submitted.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CloseSpreadError {
    /// No option legs are held in the underlying.
    #[error("No open option positions for {underlying}")]
    NoPositions {
        /// Underlying searched.
        underlying: String,
    },

    /// Closing orders failed local validation.
    #[error(transparent)]
    Validation(#[from] OrderValidationError),

    /// Account or positions could not be read.
    #[error(transparent)]
    Broker(#[from] BrokerError),
}

/// Use case for closing calendar spreads.
pub struct CloseCalendarSpreadUseCase<B: BrokerPort> {
    broker: Arc<B>,
}

impl<B: BrokerPort> CloseCalendarSpreadUseCase<B> {
    /// Create the use case.
    pub const fn new(broker: Arc<B>) -> Self {
        Self { broker }
    }

    /// Resolve the account, find the held legs and close them.
    pub async fn execute(&self, request: &CloseSpreadRequest) -> Result<CloseSpreadResponse, CloseSpreadError> {
        let account_id = resolve_account(self.broker.as_ref()).await?;
        let legs = self.held_legs(&account_id, &request.underlying).await?;
        if legs.is_empty() {
            return Err(CloseSpreadError::NoPositions {
                underlying: request.underlying.clone(),
            });
        }
        self.close_legs(&account_id, &legs, request.quantity, request.date)
            .await
    }

    /// Legs currently held in `underlying`.
    pub async fn held_legs(&self, account_id: &str, underlying: &str) -> Result<SpreadLegs, BrokerError> {
        let positions = self.broker.get_positions(account_id).await?;
        Ok(legs_to_close(&positions, underlying))
    }

    /// Submit closing orders for `legs`, each independently.
    pub async fn close_legs(
        &self,
        account_id: &str,
        legs: &SpreadLegs,
        quantity: Decimal,
        date: NaiveDate,
    ) -> Result<CloseSpreadResponse, CloseSpreadError> {
        let orders = compose_close(legs, quantity, date)?;
        let mut outcomes = Vec::with_capacity(2);

        let pending = [(LegRole::Short, orders.short), (LegRole::Long, orders.long)];
        for (role, order) in pending {
            let Some(order) = order else { continue };
            let option_symbol = order.option_symbol.clone().unwrap_or_default();
            let quantity = order.quantity;
            let payload = OrderPayload::Single(order);

            let outcome = match self.broker.submit_order(account_id, &payload, false).await {
                Ok(ack) => {
                    tracing::info!(
                        account = %account_id,
                        leg = ?role,
                        symbol = %option_symbol,
                        quantity = %quantity,
                        order_id = ?ack.order_id,
                        "Closing order accepted"
                    );
                    LegCloseOutcome {
                        role,
                        option_symbol,
                        quantity,
                        ack: Some(ack),
                        error: None,
                    }
                }
                Err(e) => {
                    tracing::error!(
                        account = %account_id,
                        leg = ?role,
                        symbol = %option_symbol,
                        error = %e,
                        "Closing order failed"
                    );
                    LegCloseOutcome {
                        role,
                        option_symbol,
                        quantity,
                        ack: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            outcomes.push(outcome);
        }

        Ok(CloseSpreadResponse::new(account_id.to_string(), outcomes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::MockBroker;
    use crate::domain::order_composition::OrderSide;
    use crate::domain::positions::Position;
    use rust_decimal_macros::dec;

    fn request(quantity: Decimal) -> CloseSpreadRequest {
        CloseSpreadRequest {
            underlying: "SPY".to_string(),
            quantity,
            date: NaiveDate::from_ymd_opt(2024, 1, 16).unwrap(),
        }
    }

    fn held() -> Vec<Position> {
        vec![
            Position::new("SPY240118C00450000", dec!(-2)),
            Position::new("SPY240119C00450000", dec!(3)),
        ]
    }

    fn singles(broker: &MockBroker) -> Vec<crate::domain::order_composition::SingleLegOrder> {
        broker
            .submitted()
            .into_iter()
            .map(|(payload, _)| match payload {
                OrderPayload::Single(order) => order,
                other => panic!("unexpected payload {other:?}"),
            })
            .collect()
    }

    #[tokio::test]
    async fn closes_both_legs_independently() {
        let broker = Arc::new(MockBroker::new().with_positions(held()));
        let use_case = CloseCalendarSpreadUseCase::new(Arc::clone(&broker));

        let response = use_case.execute(&request(dec!(5))).await.unwrap();
        assert!(response.ok);
        assert_eq!(response.legs.len(), 2);

        let orders = singles(&broker);
        assert_eq!(orders[0].side, OrderSide::BuyToClose);
        assert_eq!(orders[0].quantity, dec!(2));
        assert_eq!(orders[0].tag.as_deref(), Some("CLOSE_SHORT_2024-01-16"));
        assert_eq!(orders[1].side, OrderSide::SellToClose);
        assert_eq!(orders[1].quantity, dec!(3));
        assert_eq!(orders[1].tag.as_deref(), Some("CLOSE_LONG_2024-01-16"));
    }

    #[tokio::test]
    async fn requested_quantity_caps_both_legs() {
        let broker = Arc::new(MockBroker::new().with_positions(held()));
        let use_case = CloseCalendarSpreadUseCase::new(Arc::clone(&broker));
        use_case.execute(&request(dec!(1))).await.unwrap();
        assert!(singles(&broker).iter().all(|o| o.quantity == dec!(1)));
    }

    #[tokio::test]
    async fn one_leg_failing_does_not_stop_the_other() {
        let broker = Arc::new(
            MockBroker::new()
                .with_positions(held())
                .rejecting("CLOSE_SHORT"),
        );
        let use_case = CloseCalendarSpreadUseCase::new(Arc::clone(&broker));

        let response = use_case.execute(&request(dec!(1))).await.unwrap();
        assert!(!response.ok);
        assert!(!response.legs[0].is_ok());
        assert!(response.legs[1].is_ok());
        assert_eq!(response.acks().len(), 1);
        assert!(response.error().unwrap().contains("Short leg"));
    }

    #[tokio::test]
    async fn missing_leg_yields_single_order() {
        let broker = Arc::new(
            MockBroker::new().with_positions(vec![Position::new("SPY240119C00450000", dec!(1))]),
        );
        let use_case = CloseCalendarSpreadUseCase::new(Arc::clone(&broker));
        let response = use_case.execute(&request(dec!(1))).await.unwrap();
        assert_eq!(response.legs.len(), 1);
        assert_eq!(response.legs[0].role, LegRole::Long);
    }

    #[tokio::test]
    async fn nothing_held_is_an_error() {
        let broker = Arc::new(MockBroker::new());
        let use_case = CloseCalendarSpreadUseCase::new(broker);
        let err = use_case.execute(&request(dec!(1))).await.unwrap_err();
        assert!(matches!(err, CloseSpreadError::NoPositions { .. }));
    }

    #[tokio::test]
    async fn invalid_quantity_rejected_before_submission() {
        let broker = Arc::new(MockBroker::new().with_positions(held()));
        let use_case = CloseCalendarSpreadUseCase::new(Arc::clone(&broker));
        let err = use_case.execute(&request(dec!(0))).await.unwrap_err();
        assert!(matches!(err, CloseSpreadError::Validation(_)));
        assert!(broker.submitted().is_empty());
    }
}
