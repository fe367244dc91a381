//! Estimate Next-Day Spread Use Case
//!
//! Approximates what a spread will look like tomorrow by pricing today's
//! expirations that sit one trading day closer, at the same strike. The
//! result is read-only: nothing is ever ordered from it.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::application::ports::{MarketDataError, MarketDataPort};
use crate::application::services::OptionChainResolver;
use crate::domain::calendar_spread::{CalendarSpread, find_at_strike, find_near_trading_days};

/// Trading-day slack when looking for the shifted expirations.
pub const NEXT_DAY_TOLERANCE: u32 = 1;

/// Tomorrow's proxy for a spread.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextDaySpreadEstimate {
    /// Proxy spread one trading day closer on both legs.
    pub spread: CalendarSpread,
    /// Mid-price debit of the spread today.
    pub current_net_debit: Option<Decimal>,
    /// Mid-price debit of the proxy.
    pub estimated_net_debit: Option<Decimal>,
}

/// Use case for estimating a spread one trading day forward.
pub struct EstimateNextDayUseCase<M: MarketDataPort> {
    resolver: OptionChainResolver<M>,
}

impl<M: MarketDataPort> EstimateNextDayUseCase<M> {
    /// Create the use case.
    pub const fn new(market_data: Arc<M>) -> Self {
        Self {
            resolver: OptionChainResolver::new(market_data),
        }
    }

    /// Estimate `spread` one trading day forward from `today`.
    ///
    /// `Ok(None)` when no shifted expiration or strike can be found.
    pub async fn execute(
        &self,
        spread: &CalendarSpread,
        today: NaiveDate,
    ) -> Result<Option<NextDaySpreadEstimate>, MarketDataError> {
        let underlying = spread.underlying();
        let short_target = spread.short_expiration().trading_days().saturating_sub(1).max(1);
        let long_target = spread.long_expiration().trading_days().saturating_sub(1).max(2);

        let set = self.resolver.expiration_set(underlying, today).await?;
        let Some(short) = find_near_trading_days(&set, short_target, NEXT_DAY_TOLERANCE, None)
        else {
            tracing::debug!(underlying = %underlying, short_target, "No next-day short expiration");
            return Ok(None);
        };
        let Some(long) =
            find_near_trading_days(&set, long_target, NEXT_DAY_TOLERANCE, Some(short.date()))
        else {
            tracing::debug!(underlying = %underlying, long_target, "No next-day long expiration");
            return Ok(None);
        };

        let chains = self
            .resolver
            .chain_pair(underlying, short.date(), long.date())
            .await?;
        let strike = spread.strike();
        let option_type = spread.option_type();
        let (Some(short_contract), Some(long_contract)) = (
            find_at_strike(&chains.short, strike, option_type),
            find_at_strike(&chains.long, strike, option_type),
        ) else {
            tracing::debug!(underlying = %underlying, strike = %strike, "Strike missing from next-day chains");
            return Ok(None);
        };

        let estimate = match CalendarSpread::new(
            short_contract.clone(),
            long_contract.clone(),
            short,
            long,
        ) {
            Ok(estimate) => estimate,
            Err(e) => {
                tracing::debug!(error = %e, "Next-day legs do not form a spread");
                return Ok(None);
            }
        };

        Ok(Some(NextDaySpreadEstimate {
            current_net_debit: spread.net_debit(),
            estimated_net_debit: estimate.net_debit(),
            spread: estimate,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{MockMarketData, call, call_chain};
    use crate::domain::option_chain::Expiration;
    use rust_decimal_macros::dec;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn spread_3_4() -> CalendarSpread {
        CalendarSpread::new(
            call(date(18), 450, 0.45),
            call(date(19), 450, 0.47),
            Expiration::new(date(18), 3),
            Expiration::new(date(19), 4),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn shifts_both_legs_one_day_closer() {
        let md = MockMarketData::new()
            .with_expirations(vec![date(17), date(18), date(19)])
            .with_chain(date(17), call_chain(date(17)))
            .with_chain(date(18), call_chain(date(18)));
        let use_case = EstimateNextDayUseCase::new(Arc::new(md));

        let estimate = use_case
            .execute(&spread_3_4(), date(15))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(estimate.spread.short_expiration().trading_days(), 2);
        assert_eq!(estimate.spread.long_expiration().trading_days(), 3);
        assert_eq!(estimate.spread.strike(), dec!(450));
        assert!(estimate.current_net_debit.is_some());
    }

    #[tokio::test]
    async fn long_candidate_must_follow_short() {
        // Only one expiration near both targets.
        let md = MockMarketData::new()
            .with_expirations(vec![date(17)])
            .with_chain(date(17), call_chain(date(17)));
        let use_case = EstimateNextDayUseCase::new(Arc::new(md));
        assert!(use_case.execute(&spread_3_4(), date(15)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_strike_yields_none() {
        let md = MockMarketData::new()
            .with_expirations(vec![date(17), date(18)])
            .with_chain(date(17), vec![call(date(17), 445, 0.5)])
            .with_chain(date(18), call_chain(date(18)));
        let use_case = EstimateNextDayUseCase::new(Arc::new(md));
        assert!(use_case.execute(&spread_3_4(), date(15)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let md = MockMarketData::new()
            .with_expirations(vec![date(17), date(18)])
            .failing_chain(date(17));
        let use_case = EstimateNextDayUseCase::new(Arc::new(md));
        assert!(use_case.execute(&spread_3_4(), date(15)).await.is_err());
    }
}
