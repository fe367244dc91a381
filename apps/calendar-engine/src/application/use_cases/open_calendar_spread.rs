//! Open Calendar Spread Use Case
//!
//! Builds a spread and submits it as one multileg order (or previews it).

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use super::build_calendar_spread::{BuildCalendarSpreadUseCase, BuildSpreadError};
use crate::application::ports::{BrokerError, BrokerPort, MarketDataPort, OrderAck};
use crate::application::services::resolve_account;
use crate::domain::calendar_spread::{CalendarSpread, SpreadGreeks, SpreadRequest};
use crate::domain::order_composition::services::open_tag;
use crate::domain::order_composition::{
    OpenOrderOptions, OrderDuration, OrderPayload, OrderValidationError, compose_open,
};

/// Request to open a calendar spread.
#[derive(Debug, Clone)]
pub struct OpenSpreadRequest {
    /// Spread selection parameters.
    pub spread: SpreadRequest,
    /// Number of spreads.
    pub quantity: Decimal,
    /// Net limit price; market when absent.
    pub price: Option<Decimal>,
    /// Time in force.
    pub duration: OrderDuration,
    /// Overrides the generated tag.
    pub tag: Option<String>,
    /// Ask the brokerage for a cost preview instead of placing the order.
    pub preview: bool,
}

impl OpenSpreadRequest {
    /// Market day order for `quantity` spreads.
    #[must_use]
    pub const fn new(spread: SpreadRequest, quantity: Decimal) -> Self {
        Self {
            spread,
            quantity,
            price: None,
            duration: OrderDuration::Day,
            tag: None,
            preview: false,
        }
    }

    /// Order options with the default tag filled in.
    #[must_use]
    pub fn order_options(&self) -> OpenOrderOptions {
        let tag = self.tag.clone().unwrap_or_else(|| {
            open_tag(
                self.spread.underlying(),
                self.spread.target_delta(),
                self.spread.option_type(),
                self.spread.evaluation_date(),
            )
        });
        let options = OpenOrderOptions::market(self.quantity)
            .with_duration(self.duration)
            .with_tag(tag);
        match self.price {
            Some(price) => options.with_price(price),
            None => options,
        }
    }
}

/// Result of opening a spread.
#[derive(Debug, Clone, Serialize)]
pub struct OpenSpreadResponse {
    /// Account the order went to.
    pub account_id: String,
    /// The spread that was ordered.
    pub spread: CalendarSpread,
    /// Submitted payload.
    pub order: OrderPayload,
    /// Brokerage acknowledgment.
    pub ack: OrderAck,
    /// Net greeks for the ordered quantity.
    pub greeks: SpreadGreeks,
}

/// Open failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OpenSpreadError {
    /// The spread could not be built.
    #[error(transparent)]
    Build(#[from] BuildSpreadError),

    /// The order failed local validation.
    #[error(transparent)]
    Validation(#[from] OrderValidationError),

    /// The brokerage rejected or failed the submission.
    #[error(transparent)]
    Broker(#[from] BrokerError),
}

/// Use case for opening calendar spreads.
pub struct OpenCalendarSpreadUseCase<M: MarketDataPort, B: BrokerPort> {
    builder: BuildCalendarSpreadUseCase<M>,
    broker: Arc<B>,
}

impl<M: MarketDataPort, B: BrokerPort> OpenCalendarSpreadUseCase<M, B> {
    /// Create the use case.
    pub const fn new(builder: BuildCalendarSpreadUseCase<M>, broker: Arc<B>) -> Self {
        Self { builder, broker }
    }

    /// Spread builder.
    pub const fn builder(&self) -> &BuildCalendarSpreadUseCase<M> {
        &self.builder
    }

    /// Build and submit in the account resolved from the profile.
    pub async fn execute(&self, request: &OpenSpreadRequest) -> Result<OpenSpreadResponse, OpenSpreadError> {
        // Build before touching the account so resolution failures stay cheap.
        let spread = self.builder.execute(&request.spread).await?;
        let account_id = resolve_account(self.broker.as_ref()).await?;
        self.submit(&account_id, spread, &request.order_options(), request.preview)
            .await
    }

    /// Submit an already built spread.
    pub async fn submit(
        &self,
        account_id: &str,
        spread: CalendarSpread,
        options: &OpenOrderOptions,
        preview: bool,
    ) -> Result<OpenSpreadResponse, OpenSpreadError> {
        let spread = spread.with_quantity(options.quantity);
        let order = compose_open(&spread, options)?;

        tracing::info!(
            account = %account_id,
            spread = %spread,
            quantity = %options.quantity,
            price = ?options.price,
            preview,
            "Submitting calendar spread"
        );
        let ack = self.broker.submit_order(account_id, &order, preview).await?;

        Ok(OpenSpreadResponse {
            account_id: account_id.to_string(),
            greeks: SpreadGreeks::for_spread(&spread, options.quantity),
            spread,
            order,
            ack,
        })
    }
}
