//! Roll Calendar Spread Use Case
//!
//! Closes the legs currently held in the underlying, builds a fresh spread
//! and opens it. The phases run in sequence and are not transactional: a
//! failure after the close leaves the account flat, and the response names
//! the phase that failed together with the closes already acknowledged.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::build_calendar_spread::BuildCalendarSpreadUseCase;
use super::close_calendar_spread::{CloseCalendarSpreadUseCase, LegCloseOutcome};
use super::open_calendar_spread::{
    OpenCalendarSpreadUseCase, OpenSpreadError, OpenSpreadRequest, OpenSpreadResponse,
};
use crate::application::ports::{BrokerPort, MarketDataPort};
use crate::application::services::resolve_account;
use crate::domain::calendar_spread::SpreadError;
use crate::domain::order_composition::OrderValidationError;

/// Roll phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollPhase {
    /// Checking the request before any brokerage call.
    Validate,
    /// Closing the held legs.
    Close,
    /// Building the replacement spread.
    Build,
    /// Submitting the replacement spread.
    Open,
}

impl std::fmt::Display for RollPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validate => write!(f, "validate"),
            Self::Close => write!(f, "close"),
            Self::Build => write!(f, "build"),
            Self::Open => write!(f, "open"),
        }
    }
}

/// Roll request rejected before any brokerage call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RollRequestError {
    /// Spread request failed validation.
    #[error(transparent)]
    Spread(#[from] SpreadError),

    /// Order options failed validation.
    #[error(transparent)]
    Order(#[from] OrderValidationError),

    /// Closing orders are always live, so a previewed roll is refused.
    #[error("Preview is not supported for rolls")]
    Preview,
}

/// Response from rolling a spread.
#[derive(Debug, Clone, Serialize)]
pub struct RollSpreadResponse {
    /// Whether every phase succeeded.
    pub ok: bool,
    /// Closing order outcomes.
    pub closed: Vec<LegCloseOutcome>,
    /// The new spread's submission.
    pub opened: Option<OpenSpreadResponse>,
    /// Phase that failed.
    pub failed_phase: Option<RollPhase>,
    /// Error message if failed.
    pub error: Option<String>,
}

impl RollSpreadResponse {
    /// Create a successful response.
    const fn success(closed: Vec<LegCloseOutcome>, opened: OpenSpreadResponse) -> Self {
        Self {
            ok: true,
            closed,
            opened: Some(opened),
            failed_phase: None,
            error: None,
        }
    }

    /// Create a failure response for `phase`.
    fn failed(phase: RollPhase, closed: Vec<LegCloseOutcome>, error: &str) -> Self {
        let error = if closed.iter().any(LegCloseOutcome::is_ok)
            && !matches!(phase, RollPhase::Validate | RollPhase::Close)
        {
            format!("Close succeeded but {phase} failed: {error}")
        } else {
            format!("Roll failed during {phase}: {error}")
        };
        Self {
            ok: false,
            closed,
            opened: None,
            failed_phase: Some(phase),
            error: Some(error),
        }
    }
}

/// Use case for rolling calendar spreads.
pub struct RollCalendarSpreadUseCase<M: MarketDataPort, B: BrokerPort> {
    broker: Arc<B>,
    close: CloseCalendarSpreadUseCase<B>,
    open: OpenCalendarSpreadUseCase<M, B>,
}

impl<M: MarketDataPort, B: BrokerPort> RollCalendarSpreadUseCase<M, B> {
    /// Create the use case.
    pub fn new(builder: BuildCalendarSpreadUseCase<M>, broker: Arc<B>) -> Self {
        Self {
            close: CloseCalendarSpreadUseCase::new(Arc::clone(&broker)),
            open: OpenCalendarSpreadUseCase::new(builder, Arc::clone(&broker)),
            broker,
        }
    }

    /// Reject a request that would fail after the close phase.
    pub fn validate(&self, request: &OpenSpreadRequest) -> Result<(), RollRequestError> {
        if request.preview {
            return Err(RollRequestError::Preview);
        }
        request
            .spread
            .validate(&self.open.builder().config().allowed_underlyings)?;
        if request.quantity <= Decimal::ZERO {
            return Err(OrderValidationError::InvalidQuantity {
                quantity: request.quantity,
            }
            .into());
        }
        Ok(())
    }

    /// Close held legs (at `request.quantity`), then build and open.
    pub async fn execute(&self, request: &OpenSpreadRequest) -> RollSpreadResponse {
        let underlying = request.spread.underlying();

        if let Err(e) = self.validate(request) {
            tracing::warn!(underlying = %underlying, error = %e, "Roll request rejected");
            return RollSpreadResponse::failed(RollPhase::Validate, vec![], &e.to_string());
        }

        let account_id = match resolve_account(self.broker.as_ref()).await {
            Ok(id) => id,
            Err(e) => return RollSpreadResponse::failed(RollPhase::Close, vec![], &e.to_string()),
        };

        // Close phase
        let legs = match self.close.held_legs(&account_id, underlying).await {
            Ok(legs) => legs,
            Err(e) => return RollSpreadResponse::failed(RollPhase::Close, vec![], &e.to_string()),
        };
        let closed = if legs.is_empty() {
            tracing::warn!(underlying = %underlying, "No legs held, rolling straight into open");
            vec![]
        } else {
            match self
                .close
                .close_legs(
                    &account_id,
                    &legs,
                    request.quantity,
                    request.spread.evaluation_date(),
                )
                .await
            {
                Ok(response) if response.ok => response.legs,
                Ok(response) => {
                    let error = response.error().unwrap_or_default();
                    return RollSpreadResponse::failed(RollPhase::Close, response.legs, &error);
                }
                Err(e) => {
                    return RollSpreadResponse::failed(RollPhase::Close, vec![], &e.to_string());
                }
            }
        };

        // Build phase
        let spread = match self.open.builder().execute(&request.spread).await {
            Ok(spread) => spread,
            Err(e) => {
                tracing::error!(underlying = %underlying, error = %e, "Roll build failed after close");
                return RollSpreadResponse::failed(RollPhase::Build, closed, &e.to_string());
            }
        };

        // Open phase
        match self
            .open
            .submit(&account_id, spread, &request.order_options(), request.preview)
            .await
        {
            Ok(opened) => {
                tracing::info!(
                    underlying = %underlying,
                    closed = closed.len(),
                    order_id = ?opened.ack.order_id,
                    "Calendar spread rolled"
                );
                RollSpreadResponse::success(closed, opened)
            }
            Err(e) => {
                tracing::error!(underlying = %underlying, error = %e, "Roll open failed after close");
                let phase = match &e {
                    OpenSpreadError::Build(_) => RollPhase::Build,
                    OpenSpreadError::Validation(_) | OpenSpreadError::Broker(_) => RollPhase::Open,
                };
                RollSpreadResponse::failed(phase, closed, &e.to_string())
            }
        }
    }
}
