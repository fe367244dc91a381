//! Preview Calendar Spread Use Case
//!
//! Shows what a new spread would do to the account's greeks without
//! submitting anything.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use super::build_calendar_spread::{BuildCalendarSpreadUseCase, BuildSpreadError};
use crate::application::ports::{BrokerError, BrokerPort, MarketDataPort};
use crate::application::services::resolve_account;
use crate::domain::calendar_spread::{CalendarSpread, SpreadGreeks, SpreadRequest};
use crate::domain::positions::Position;
use crate::domain::positions::services::option_positions;

/// Net delta and theta of a set of positions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PositionGreeks {
    /// Net delta.
    pub net_delta: f64,
    /// Net theta per day.
    pub net_theta: f64,
}

/// Spread preview.
#[derive(Debug, Clone, Serialize)]
pub struct SpreadPreview {
    /// Spread that would be opened.
    pub spread: CalendarSpread,
    /// Number of spreads.
    pub quantity: Decimal,
    /// Mid-price debit per spread.
    pub net_debit: Option<Decimal>,
    /// Greeks added by the new spread.
    pub spread_greeks: SpreadGreeks,
    /// Greeks of current option positions in the underlying.
    pub current: PositionGreeks,
    /// Totals after the trade.
    pub after: PositionGreeks,
}

/// Use case for previewing a spread against current positions.
pub struct PreviewCalendarSpreadUseCase<M: MarketDataPort, B: BrokerPort> {
    builder: BuildCalendarSpreadUseCase<M>,
    broker: Arc<B>,
}

impl<M: MarketDataPort, B: BrokerPort> PreviewCalendarSpreadUseCase<M, B> {
    /// Create the use case.
    pub const fn new(builder: BuildCalendarSpreadUseCase<M>, broker: Arc<B>) -> Self {
        Self { builder, broker }
    }

    /// Build the spread and combine its greeks with the account's.
    ///
    /// Only the build can fail; position and quote lookups degrade to zero.
    pub async fn execute(
        &self,
        request: &SpreadRequest,
        quantity: Decimal,
    ) -> Result<SpreadPreview, BuildSpreadError> {
        let spread = self.builder.execute(request).await?.with_quantity(quantity);
        let spread_greeks = SpreadGreeks::for_spread(&spread, quantity);
        let current = self.current_greeks(request.underlying()).await;
        let after = PositionGreeks {
            net_delta: current.net_delta + spread_greeks.net_delta,
            net_theta: current.net_theta + spread_greeks.net_theta,
        };

        Ok(SpreadPreview {
            net_debit: spread.net_debit(),
            spread,
            quantity,
            spread_greeks,
            current,
            after,
        })
    }

    async fn current_greeks(&self, underlying: &str) -> PositionGreeks {
        let positions = match self.positions(underlying).await {
            Ok(positions) => positions,
            Err(e) => {
                tracing::warn!(underlying = %underlying, error = %e, "Positions unavailable for preview");
                return PositionGreeks::default();
            }
        };
        if positions.is_empty() {
            return PositionGreeks::default();
        }

        let symbols: Vec<String> = positions.iter().map(|p| p.symbol.clone()).collect();
        let quotes = match self
            .builder
            .resolver()
            .market_data()
            .get_quotes(&symbols, true)
            .await
        {
            Ok(quotes) => quotes,
            Err(e) => {
                tracing::warn!(underlying = %underlying, error = %e, "Position quotes unavailable for preview");
                return PositionGreeks::default();
            }
        };

        positions
            .iter()
            .fold(PositionGreeks::default(), |mut acc, position| {
                let greeks = quotes
                    .iter()
                    .find(|q| q.symbol == position.symbol)
                    .and_then(|q| q.greeks);
                let qty = position.quantity.to_f64().unwrap_or(0.0);
                if let Some(g) = greeks {
                    acc.net_delta += g.delta.unwrap_or(0.0) * qty;
                    acc.net_theta += g.theta.unwrap_or(0.0) * qty;
                }
                acc
            })
    }

    async fn positions(
        &self,
        underlying: &str,
    ) -> Result<Vec<Position>, BrokerError> {
        let account_id = resolve_account(self.broker.as_ref()).await?;
        let positions = self.broker.get_positions(&account_id).await?;
        Ok(option_positions(&positions, Some(underlying)))
    }
}
