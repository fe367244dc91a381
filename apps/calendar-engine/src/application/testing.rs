//! Hand-rolled port mocks shared by application tests.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::application::ports::{
    AccountSummary, Balances, BrokerError, BrokerPort, MarketDataError, MarketDataPort, OrderAck,
    OrderPreview, OrderRecord, SessionError, StreamSessionPort,
};
use crate::domain::option_chain::{Greeks, OptionContract, OptionType, Quote};
use crate::domain::order_composition::{OrderChange, OrderPayload};
use crate::domain::positions::Position;
use crate::domain::streaming::{StreamKind, StreamingSession};

fn contract(
    expiration: NaiveDate,
    strike: i64,
    option_type: OptionType,
    delta: Option<f64>,
) -> OptionContract {
    let flag = match option_type {
        OptionType::Call => 'C',
        OptionType::Put => 'P',
    };
    let symbol = format!("SPY{}{flag}{:08}", expiration.format("%y%m%d"), strike * 1000);
    let mid = Decimal::from(strike) / Decimal::from(100);
    let contract = OptionContract::new(
        symbol,
        "SPY",
        Decimal::from(strike),
        expiration,
        option_type,
    )
    .with_quotes(Some(mid), Some(mid + Decimal::new(2, 2)), Some(mid));
    match delta {
        Some(d) => contract.with_greeks(Greeks {
            delta: Some(d),
            theta: Some(-0.2),
            ..Greeks::default()
        }),
        None => contract,
    }
}

/// SPY call with a live delta.
pub fn call(expiration: NaiveDate, strike: i64, delta: f64) -> OptionContract {
    contract(expiration, strike, OptionType::Call, Some(delta))
}

/// SPY put with a live delta.
pub fn put(expiration: NaiveDate, strike: i64, delta: f64) -> OptionContract {
    contract(expiration, strike, OptionType::Put, Some(delta))
}

/// SPY call without greeks.
pub fn bare_call(expiration: NaiveDate, strike: i64) -> OptionContract {
    contract(expiration, strike, OptionType::Call, None)
}

/// SPY call chain at strikes 440..=460 step 5 with deltas falling by 0.1.
pub fn call_chain(expiration: NaiveDate) -> Vec<OptionContract> {
    [(440, 0.65), (445, 0.55), (450, 0.45), (455, 0.36), (460, 0.25)]
        .into_iter()
        .map(|(strike, delta)| call(expiration, strike, delta))
        .collect()
}

#[derive(Default)]
pub struct MockMarketData {
    expirations: Vec<NaiveDate>,
    chains: HashMap<NaiveDate, Vec<OptionContract>>,
    failing_chains: HashSet<NaiveDate>,
    quotes: HashMap<String, Quote>,
    fail_quotes: bool,
    quote_requests: Mutex<Vec<Vec<String>>>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_expirations(mut self, expirations: Vec<NaiveDate>) -> Self {
        self.expirations = expirations;
        self
    }

    pub fn with_chain(mut self, expiration: NaiveDate, chain: Vec<OptionContract>) -> Self {
        self.chains.insert(expiration, chain);
        self
    }

    pub fn failing_chain(mut self, expiration: NaiveDate) -> Self {
        self.failing_chains.insert(expiration);
        self
    }

    pub fn with_quote(mut self, quote: Quote) -> Self {
        self.quotes.insert(quote.symbol.clone(), quote);
        self
    }

    pub fn failing_quotes(mut self) -> Self {
        self.fail_quotes = true;
        self
    }

    pub fn quote_requests(&self) -> Vec<Vec<String>> {
        self.quote_requests.lock().clone()
    }
}

#[async_trait]
impl MarketDataPort for MockMarketData {
    async fn get_expirations(&self, _underlying: &str) -> Result<Vec<NaiveDate>, MarketDataError> {
        Ok(self.expirations.clone())
    }

    async fn get_strikes(
        &self,
        _underlying: &str,
        expiration: NaiveDate,
    ) -> Result<Vec<Decimal>, MarketDataError> {
        Ok(self
            .chains
            .get(&expiration)
            .map(|c| c.iter().map(OptionContract::strike).collect())
            .unwrap_or_default())
    }

    async fn get_option_chain(
        &self,
        _underlying: &str,
        expiration: NaiveDate,
    ) -> Result<Vec<OptionContract>, MarketDataError> {
        if self.failing_chains.contains(&expiration) {
            return Err(MarketDataError::ConnectionError {
                message: "connection reset".to_string(),
            });
        }
        Ok(self.chains.get(&expiration).cloned().unwrap_or_default())
    }

    async fn get_quotes(
        &self,
        symbols: &[String],
        _greeks: bool,
    ) -> Result<Vec<Quote>, MarketDataError> {
        self.quote_requests.lock().push(symbols.to_vec());
        if self.fail_quotes {
            return Err(MarketDataError::ApiError {
                message: "quotes unavailable".to_string(),
            });
        }
        Ok(symbols
            .iter()
            .filter_map(|s| self.quotes.get(s).cloned())
            .collect())
    }

    async fn lookup_option_symbols(
        &self,
        _underlying: &str,
    ) -> Result<Vec<String>, MarketDataError> {
        Ok(self
            .chains
            .values()
            .flatten()
            .map(|c| c.symbol().to_string())
            .collect())
    }
}

#[derive(Default)]
pub struct MockBroker {
    pub positions: Vec<Position>,
    pub profile_accounts: Vec<AccountSummary>,
    pub listed_accounts: Vec<AccountSummary>,
    pub fail_profile: bool,
    /// Submissions whose tag starts with one of these are rejected.
    pub reject_tags: Vec<String>,
    pub submitted: Mutex<Vec<(OrderPayload, bool)>>,
    pub changed: Mutex<Vec<(u64, OrderChange)>>,
    pub cancelled: Mutex<Vec<u64>>,
}

impl MockBroker {
    pub fn new() -> Self {
        Self {
            profile_accounts: vec![account("VA000001")],
            ..Self::default()
        }
    }

    pub fn with_positions(mut self, positions: Vec<Position>) -> Self {
        self.positions = positions;
        self
    }

    pub fn rejecting(mut self, tag_prefix: &str) -> Self {
        self.reject_tags.push(tag_prefix.to_string());
        self
    }

    pub fn submitted(&self) -> Vec<(OrderPayload, bool)> {
        self.submitted.lock().clone()
    }
}

pub fn account(number: &str) -> AccountSummary {
    AccountSummary {
        account_number: number.to_string(),
        account_type: Some("margin".to_string()),
        status: Some("active".to_string()),
        option_level: Some(3),
    }
}

#[async_trait]
impl BrokerPort for MockBroker {
    async fn get_profile_accounts(&self) -> Result<Vec<AccountSummary>, BrokerError> {
        if self.fail_profile {
            return Err(BrokerError::ConnectionError {
                message: "profile unavailable".to_string(),
            });
        }
        Ok(self.profile_accounts.clone())
    }

    async fn list_accounts(&self) -> Result<Vec<AccountSummary>, BrokerError> {
        Ok(self.listed_accounts.clone())
    }

    async fn get_positions(&self, _account_id: &str) -> Result<Vec<Position>, BrokerError> {
        Ok(self.positions.clone())
    }

    async fn get_balances(&self, account_id: &str) -> Result<Balances, BrokerError> {
        Ok(Balances {
            account_number: Some(account_id.to_string()),
            ..Balances::default()
        })
    }

    async fn get_orders(&self, _account_id: &str) -> Result<Vec<OrderRecord>, BrokerError> {
        Ok(vec![])
    }

    async fn submit_order(
        &self,
        _account_id: &str,
        order: &OrderPayload,
        preview: bool,
    ) -> Result<OrderAck, BrokerError> {
        order.validate()?;
        let tag = order.tag().unwrap_or_default();
        if self.reject_tags.iter().any(|p| tag.starts_with(p.as_str())) {
            return Err(BrokerError::OrderRejected {
                reason: format!("rejected {tag}"),
            });
        }
        let mut submitted = self.submitted.lock();
        submitted.push((order.clone(), preview));
        if preview {
            return Ok(OrderAck {
                order_id: None,
                status: "ok".to_string(),
                preview: Some(OrderPreview {
                    result: Some(true),
                    ..OrderPreview::default()
                }),
            });
        }
        Ok(OrderAck::accepted(1000 + submitted.len() as u64))
    }

    async fn change_order(
        &self,
        _account_id: &str,
        order_id: u64,
        change: &OrderChange,
    ) -> Result<OrderAck, BrokerError> {
        self.changed.lock().push((order_id, change.clone()));
        Ok(OrderAck::accepted(order_id))
    }

    async fn cancel_order(&self, _account_id: &str, order_id: u64) -> Result<OrderAck, BrokerError> {
        if order_id == 0 {
            return Err(BrokerError::OrderNotFound {
                order_id: order_id.to_string(),
            });
        }
        self.cancelled.lock().push(order_id);
        Ok(OrderAck::accepted(order_id))
    }
}

#[derive(Default)]
pub struct MockSessions {
    pub issued: Mutex<u32>,
    pub fail: bool,
}

#[async_trait]
impl StreamSessionPort for MockSessions {
    async fn create_session(&self, kind: StreamKind) -> Result<StreamingSession, SessionError> {
        if self.fail {
            return Err(SessionError::Unauthorized);
        }
        let mut issued = self.issued.lock();
        *issued += 1;
        Ok(StreamingSession::new(
            kind,
            format!("wss://ws.example.test/{kind}"),
            format!("session-{}", *issued),
            Utc::now(),
        ))
    }
}
