//! Build Calendar Spread Use Case
//!
//! Locates a short/long expiration pair, delta-matches the short leg and
//! aligns the long leg on the same strike.

use std::sync::Arc;

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::application::ports::{MarketDataError, MarketDataPort};
use crate::application::services::OptionChainResolver;
use crate::domain::calendar_spread::{
    CalendarSpread, SpreadError, SpreadRequest, find_at_strike, offset_strike,
    select_expiration_pair,
};
use crate::domain::option_chain::{DeltaEstimator, OptionContract, find_closest_delta};

/// Underlyings the engine trades unless configured otherwise.
pub const DEFAULT_ALLOWED_UNDERLYINGS: [&str; 4] = ["SPY", "XSP", "QQQ", "DIA"];

/// Black-Scholes inputs used when the chain lacks live deltas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeltaFallback {
    /// Annualized volatility.
    pub volatility: f64,
    /// Annualized risk-free rate.
    pub risk_free_rate: f64,
}

/// Builder configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Underlyings accepted by request validation; empty allows any.
    pub allowed_underlyings: Vec<String>,
    /// Estimate missing deltas when set.
    pub delta_fallback: Option<DeltaFallback>,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            allowed_underlyings: DEFAULT_ALLOWED_UNDERLYINGS
                .iter()
                .map(ToString::to_string)
                .collect(),
            delta_fallback: None,
        }
    }
}

/// Spread construction failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BuildSpreadError {
    /// No suitable expirations, strikes or deltas, or an invalid request.
    #[error(transparent)]
    Spread(#[from] SpreadError),

    /// Market data could not be fetched.
    #[error(transparent)]
    MarketData(#[from] MarketDataError),
}

/// Use case for building calendar spreads.
pub struct BuildCalendarSpreadUseCase<M: MarketDataPort> {
    resolver: OptionChainResolver<M>,
    config: BuilderConfig,
}

impl<M: MarketDataPort> BuildCalendarSpreadUseCase<M> {
    /// Create a builder with the default configuration.
    pub fn new(market_data: Arc<M>) -> Self {
        Self::with_config(market_data, BuilderConfig::default())
    }

    /// Create a builder with `config`.
    pub const fn with_config(market_data: Arc<M>, config: BuilderConfig) -> Self {
        Self {
            resolver: OptionChainResolver::new(market_data),
            config,
        }
    }

    /// Chain resolver used by this builder.
    pub const fn resolver(&self) -> &OptionChainResolver<M> {
        &self.resolver
    }

    /// Builder configuration.
    pub const fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Build the spread described by `request`.
    pub async fn execute(&self, request: &SpreadRequest) -> Result<CalendarSpread, BuildSpreadError> {
        request.validate(&self.config.allowed_underlyings)?;
        let underlying = request.underlying();

        let set = self
            .resolver
            .expiration_set(underlying, request.evaluation_date())
            .await?;
        let pair = select_expiration_pair(&set, request.expiration_offset())?;

        let chains = self
            .resolver
            .chain_pair(underlying, pair.short.date(), pair.long.date())
            .await?;

        let estimator = self.fallback_estimator(request, &chains.short).await;
        let matched = find_closest_delta(
            &chains.short,
            request.target_delta(),
            request.option_type(),
            estimator.as_ref(),
        )
        .ok_or_else(|| SpreadError::NoDeltaMatch {
            target_delta: request.target_delta(),
            option_type: request.option_type(),
            expiration: pair.short.date(),
        })?;

        let strike = offset_strike(matched.strike(), request.strike_offset(), underlying);
        let not_found = |expiration| SpreadError::StrikeNotFound {
            strike,
            option_type: request.option_type(),
            expiration,
        };

        let short = if request.strike_offset() == 0 {
            matched
        } else {
            find_at_strike(&chains.short, strike, request.option_type())
                .ok_or_else(|| not_found(pair.short.date()))?
        };
        let long = find_at_strike(&chains.long, strike, request.option_type())
            .ok_or_else(|| not_found(pair.long.date()))?;

        let spread = CalendarSpread::new(short.clone(), long.clone(), pair.short, pair.long)?;
        tracing::info!(
            underlying = %underlying,
            strike = %spread.strike(),
            option_type = %spread.option_type(),
            short = %pair.short,
            long = %pair.long,
            short_delta = ?short.delta(),
            "Calendar spread built"
        );
        Ok(spread)
    }

    /// Estimator for contracts lacking deltas, when configured and needed.
    ///
    /// Best effort: a failed underlying quote leaves matching to live deltas.
    async fn fallback_estimator(
        &self,
        request: &SpreadRequest,
        chain: &[OptionContract],
    ) -> Option<DeltaEstimator> {
        let fallback = self.config.delta_fallback?;
        if chain.iter().all(|c| c.delta().is_some()) {
            return None;
        }

        let symbols = vec![request.underlying().to_string()];
        let quotes = match self.resolver.market_data().get_quotes(&symbols, false).await {
            Ok(quotes) => quotes,
            Err(e) => {
                tracing::warn!(
                    underlying = %request.underlying(),
                    error = %e,
                    "Underlying quote failed, delta fallback disabled"
                );
                return None;
            }
        };
        let spot = quotes
            .iter()
            .find(|q| q.symbol.eq_ignore_ascii_case(request.underlying()))
            .and_then(|q| q.reference_price())
            .and_then(|p| p.to_f64())?;

        tracing::debug!(
            underlying = %request.underlying(),
            spot,
            volatility = fallback.volatility,
            "Estimating missing deltas"
        );
        Some(DeltaEstimator::new(
            spot,
            fallback.risk_free_rate,
            fallback.volatility,
            request.evaluation_date(),
        ))
    }
}
