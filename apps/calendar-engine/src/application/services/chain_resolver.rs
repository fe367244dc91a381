//! Option Chain Resolver
//!
//! Wraps the market data port with the calendar-specific views: annotated
//! expiration sets and concurrent two-expiration chain fetches.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::application::ports::{MarketDataError, MarketDataPort};
use crate::domain::option_chain::{ExpirationSet, OptionContract};

/// Chains for a short and a long expiration fetched together.
#[derive(Debug, Clone)]
pub struct ChainPair {
    /// Near expiration chain.
    pub short: Vec<OptionContract>,
    /// Far expiration chain.
    pub long: Vec<OptionContract>,
}

/// Resolves expirations and chains for an underlying.
pub struct OptionChainResolver<M: MarketDataPort> {
    market_data: Arc<M>,
}

impl<M: MarketDataPort> Clone for OptionChainResolver<M> {
    fn clone(&self) -> Self {
        Self {
            market_data: Arc::clone(&self.market_data),
        }
    }
}

impl<M: MarketDataPort> OptionChainResolver<M> {
    /// Create a resolver over `market_data`.
    pub const fn new(market_data: Arc<M>) -> Self {
        Self { market_data }
    }

    /// Underlying port.
    pub fn market_data(&self) -> &M {
        &self.market_data
    }

    /// Expirations annotated with trading days relative to `today`.
    pub async fn expiration_set(
        &self,
        underlying: &str,
        today: NaiveDate,
    ) -> Result<ExpirationSet, MarketDataError> {
        let dates = self.market_data.get_expirations(underlying).await?;
        let set = ExpirationSet::annotate(underlying, &dates, today);
        tracing::debug!(
            underlying = %underlying,
            expirations = set.len(),
            "Resolved expiration set"
        );
        Ok(set)
    }

    /// Strikes listed for one expiration.
    pub async fn strikes(
        &self,
        underlying: &str,
        expiration: NaiveDate,
    ) -> Result<Vec<Decimal>, MarketDataError> {
        self.market_data.get_strikes(underlying, expiration).await
    }

    /// Chain with greeks for one expiration.
    pub async fn chain(
        &self,
        underlying: &str,
        expiration: NaiveDate,
    ) -> Result<Vec<OptionContract>, MarketDataError> {
        self.market_data
            .get_option_chain(underlying, expiration)
            .await
    }

    /// Both chains, fetched concurrently; fails if either fails.
    pub async fn chain_pair(
        &self,
        underlying: &str,
        short: NaiveDate,
        long: NaiveDate,
    ) -> Result<ChainPair, MarketDataError> {
        let (short_chain, long_chain) = tokio::try_join!(
            self.market_data.get_option_chain(underlying, short),
            self.market_data.get_option_chain(underlying, long),
        )?;
        tracing::debug!(
            underlying = %underlying,
            short = %short,
            long = %long,
            short_contracts = short_chain.len(),
            long_contracts = long_chain.len(),
            "Fetched chain pair"
        );
        Ok(ChainPair {
            short: short_chain,
            long: long_chain,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{MockMarketData, call};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[tokio::test]
    async fn expiration_set_is_annotated() {
        let md = MockMarketData::new().with_expirations(vec![date(17), date(19), date(22)]);
        let resolver = OptionChainResolver::new(Arc::new(md));
        let set = resolver.expiration_set("SPY", date(15)).await.unwrap();
        let days: Vec<u32> = set.entries().iter().map(|e| e.trading_days()).collect();
        assert_eq!(days, vec![2, 4, 5]);
    }

    #[tokio::test]
    async fn chain_pair_fetches_both() {
        let md = MockMarketData::new()
            .with_chain(date(18), vec![call(date(18), 450, 0.35)])
            .with_chain(date(19), vec![call(date(19), 450, 0.38)]);
        let resolver = OptionChainResolver::new(Arc::new(md));
        let pair = resolver.chain_pair("SPY", date(18), date(19)).await.unwrap();
        assert_eq!(pair.short.len(), 1);
        assert_eq!(pair.long[0].expiration(), date(19));
    }

    #[tokio::test]
    async fn chain_pair_propagates_failure() {
        let md = MockMarketData::new().with_chain(date(18), vec![]).failing_chain(date(19));
        let resolver = OptionChainResolver::new(Arc::new(md));
        assert!(resolver.chain_pair("SPY", date(18), date(19)).await.is_err());
    }
}
