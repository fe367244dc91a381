//! Tradier adapter implementing the market data, broker and stream session ports.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::application::ports::{
    AccountSummary, Balances, BrokerError, BrokerPort, MarketDataError, MarketDataPort, OrderAck,
    OrderRecord, SessionError, StreamSessionPort,
};
use crate::domain::option_chain::{OptionContract, Quote};
use crate::domain::order_composition::{OrderChange, OrderPayload};
use crate::domain::positions::Position;
use crate::domain::streaming::{StreamKind, StreamingSession};
use crate::infrastructure::telemetry::{record_order_action, record_order_submission};

use super::api_types::{
    AccountsEnvelope, BalancesEnvelope, ChainEnvelope, ExpirationsEnvelope, LookupEnvelope,
    OrderResponseEnvelope, OrdersEnvelope, PositionsEnvelope, ProfileEnvelope, QuotesEnvelope,
    SessionEnvelope, StrikesEnvelope,
};
use super::config::{StreamEndpoints, TradierConfig, TradierEnvironment};
use super::error::TradierError;
use super::http_client::TradierHttpClient;
use super::order_form::OrderForm;

/// Symbol lists longer than this are quoted with a POST form.
pub const MAX_GET_QUOTE_SYMBOLS: usize = 100;

/// Orders fetched per listing.
pub const ORDERS_PAGE_LIMIT: u32 = 100;

/// Tradier brokerage adapter.
#[derive(Debug, Clone)]
pub struct TradierAdapter {
    client: TradierHttpClient,
    environment: TradierEnvironment,
    streams: StreamEndpoints,
}

impl TradierAdapter {
    /// Create a new Tradier adapter.
    pub fn new(config: &TradierConfig) -> Result<Self, TradierError> {
        let client = TradierHttpClient::new(config)?;
        Ok(Self {
            client,
            environment: config.environment,
            streams: config.streams.clone(),
        })
    }

    /// Environment the adapter talks to.
    #[must_use]
    pub const fn environment(&self) -> TradierEnvironment {
        self.environment
    }

    /// Event feed endpoints for stream clients.
    #[must_use]
    pub const fn streams(&self) -> &StreamEndpoints {
        &self.streams
    }

    fn orders_path(account_id: &str) -> String {
        format!("/v1/accounts/{account_id}/orders")
    }
}

#[async_trait]
impl MarketDataPort for TradierAdapter {
    async fn get_expirations(&self, underlying: &str) -> Result<Vec<NaiveDate>, MarketDataError> {
        let envelope: ExpirationsEnvelope = self
            .client
            .get(
                "/v1/markets/options/expirations",
                &[("symbol", underlying.to_string())],
            )
            .await?;
        let dates = envelope.into_dates();
        tracing::debug!(underlying, count = dates.len(), "Fetched expirations");
        Ok(dates)
    }

    async fn get_strikes(
        &self,
        underlying: &str,
        expiration: NaiveDate,
    ) -> Result<Vec<Decimal>, MarketDataError> {
        let envelope: StrikesEnvelope = self
            .client
            .get(
                "/v1/markets/options/strikes",
                &[
                    ("symbol", underlying.to_string()),
                    ("expiration", expiration.to_string()),
                ],
            )
            .await?;
        Ok(envelope.into_strikes())
    }

    async fn get_option_chain(
        &self,
        underlying: &str,
        expiration: NaiveDate,
    ) -> Result<Vec<OptionContract>, MarketDataError> {
        let envelope: ChainEnvelope = self
            .client
            .get(
                "/v1/markets/options/chains",
                &[
                    ("symbol", underlying.to_string()),
                    ("expiration", expiration.to_string()),
                    ("greeks", "true".to_string()),
                ],
            )
            .await?;
        let contracts = envelope.into_contracts()?;
        tracing::debug!(
            underlying,
            expiration = %expiration,
            count = contracts.len(),
            "Fetched option chain"
        );
        Ok(contracts)
    }

    async fn get_quotes(
        &self,
        symbols: &[String],
        greeks: bool,
    ) -> Result<Vec<Quote>, MarketDataError> {
        if symbols.is_empty() {
            return Ok(Vec::new());
        }
        let joined = symbols.join(",");
        let envelope: QuotesEnvelope = if symbols.len() > MAX_GET_QUOTE_SYMBOLS {
            let mut form = vec![("symbols".to_string(), joined)];
            if greeks {
                form.push(("greeks".to_string(), "true".to_string()));
            }
            self.client.post_form("/v1/markets/quotes", &form).await?
        } else {
            let mut query = vec![("symbols", joined)];
            if greeks {
                query.push(("greeks", "true".to_string()));
            }
            self.client.get("/v1/markets/quotes", &query).await?
        };
        Ok(envelope.into_quotes())
    }

    async fn lookup_option_symbols(
        &self,
        underlying: &str,
    ) -> Result<Vec<String>, MarketDataError> {
        let envelope: LookupEnvelope = self
            .client
            .get(
                "/v1/markets/options/lookup",
                &[("underlying", underlying.to_string())],
            )
            .await?;
        Ok(envelope.into_symbols())
    }
}

#[async_trait]
impl BrokerPort for TradierAdapter {
    async fn get_profile_accounts(&self) -> Result<Vec<AccountSummary>, BrokerError> {
        let envelope: ProfileEnvelope = self.client.get("/v1/user/profile", &[]).await?;
        Ok(envelope.into_accounts())
    }

    async fn list_accounts(&self) -> Result<Vec<AccountSummary>, BrokerError> {
        let envelope: AccountsEnvelope = self.client.get("/v1/accounts", &[]).await?;
        Ok(envelope.into_accounts())
    }

    async fn get_positions(&self, account_id: &str) -> Result<Vec<Position>, BrokerError> {
        let envelope: PositionsEnvelope = self
            .client
            .get(&format!("/v1/accounts/{account_id}/positions"), &[])
            .await?;
        Ok(envelope.into_positions())
    }

    async fn get_balances(&self, account_id: &str) -> Result<Balances, BrokerError> {
        let envelope: BalancesEnvelope = self
            .client
            .get(&format!("/v1/accounts/{account_id}/balances"), &[])
            .await?;
        Ok(envelope.into_balances()?)
    }

    async fn get_orders(&self, account_id: &str) -> Result<Vec<OrderRecord>, BrokerError> {
        let envelope: OrdersEnvelope = self
            .client
            .get(
                &Self::orders_path(account_id),
                &[
                    ("page", "1".to_string()),
                    ("limit", ORDERS_PAGE_LIMIT.to_string()),
                    ("includeTags", "true".to_string()),
                ],
            )
            .await?;
        Ok(envelope.into_orders())
    }

    async fn submit_order(
        &self,
        account_id: &str,
        order: &OrderPayload,
        preview: bool,
    ) -> Result<OrderAck, BrokerError> {
        let class = order.class();
        if let Err(e) = order.validate() {
            record_order_submission(class.as_str(), "invalid");
            return Err(e.into());
        }

        if !preview && !self.environment.is_sandbox() {
            tracing::warn!(
                account = %account_id,
                class = %class,
                tag = ?order.tag(),
                "Submitting PRODUCTION order - this will execute real trades"
            );
        }

        tracing::info!(
            account = %account_id,
            class = %class,
            symbol = %order.symbol(),
            tag = ?order.tag(),
            preview,
            "Submitting order to Tradier"
        );

        let form = OrderForm::for_payload(order, preview);
        let result: Result<OrderResponseEnvelope, TradierError> = self
            .client
            .post_form(&Self::orders_path(account_id), form.fields())
            .await;

        let ack = match result.and_then(|envelope| envelope.into_ack(preview)) {
            Ok(ack) => ack,
            Err(e) => {
                let status = match e {
                    TradierError::Api { status: 400, .. } => "rejected",
                    _ => "error",
                };
                record_order_submission(class.as_str(), status);
                return Err(e.into());
            }
        };

        record_order_submission(
            class.as_str(),
            if preview { "previewed" } else { "submitted" },
        );
        tracing::info!(
            account = %account_id,
            order_id = ?ack.order_id,
            status = %ack.status,
            preview,
            "Order accepted"
        );
        Ok(ack)
    }

    async fn change_order(
        &self,
        account_id: &str,
        order_id: u64,
        change: &OrderChange,
    ) -> Result<OrderAck, BrokerError> {
        change.validate()?;
        let form = OrderForm::for_change(change);
        let result: Result<OrderResponseEnvelope, TradierError> = self
            .client
            .put_form(
                &format!("{}/{order_id}", Self::orders_path(account_id)),
                form.fields(),
            )
            .await;
        let ack = result
            .and_then(|envelope| envelope.into_ack(false))
            .map_err(|e| {
                record_order_action("change", "error");
                order_error(e, order_id)
            })?;
        record_order_action("change", "ok");
        Ok(ack)
    }

    async fn cancel_order(
        &self,
        account_id: &str,
        order_id: u64,
    ) -> Result<OrderAck, BrokerError> {
        let result: Result<OrderResponseEnvelope, TradierError> = self
            .client
            .delete(&format!("{}/{order_id}", Self::orders_path(account_id)))
            .await;
        let ack = result
            .and_then(|envelope| envelope.into_ack(false))
            .map_err(|e| {
                record_order_action("cancel", "error");
                order_error(e, order_id)
            })?;
        record_order_action("cancel", "ok");
        Ok(ack)
    }
}

/// Order-scoped 404s name the order.
fn order_error(err: TradierError, order_id: u64) -> BrokerError {
    match err {
        TradierError::NotFound { .. } => BrokerError::OrderNotFound {
            order_id: order_id.to_string(),
        },
        other => other.into(),
    }
}

#[async_trait]
impl StreamSessionPort for TradierAdapter {
    async fn create_session(&self, kind: StreamKind) -> Result<StreamingSession, SessionError> {
        let path = match kind {
            StreamKind::Market => "/v1/markets/events/session",
            StreamKind::Account => "/v1/accounts/events/session",
        };
        let envelope: SessionEnvelope = self.client.post_form(path, &[]).await?;
        let (url, session_id) = envelope.into_parts()?;
        tracing::info!(kind = %kind, "Streaming session created");
        Ok(StreamingSession::new(kind, url, session_id, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_exposes_stream_endpoints() {
        let config = TradierConfig::new("token", TradierEnvironment::Sandbox);
        let adapter = TradierAdapter::new(&config).unwrap();
        assert!(adapter.environment().is_sandbox());
        assert_eq!(
            adapter.streams().ws_account_url,
            "wss://sandbox-ws.tradier.com/v1/accounts/events"
        );
    }

    #[test]
    fn order_not_found_names_order() {
        let err = order_error(
            TradierError::NotFound {
                message: "Order not found".to_string(),
            },
            42,
        );
        assert!(matches!(err, BrokerError::OrderNotFound { order_id } if order_id == "42"));

        let err = order_error(TradierError::RateLimited, 42);
        assert!(matches!(err, BrokerError::RateLimited));
    }
}
