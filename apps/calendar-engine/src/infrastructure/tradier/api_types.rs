//! Tradier API request/response types.
//!
//! Tradier collapses one-element lists into a bare object and reports an
//! empty collection as `null` or the string `"null"`. Both shapes are
//! normalized here and nowhere else.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use super::error::TradierError;
use crate::application::ports::{AccountSummary, Balances, OrderAck, OrderPreview, OrderRecord};
use crate::domain::option_chain::{Greeks, OptionContract, OptionType, Quote};
use crate::domain::positions::Position;

// ============================================================================
// Shape normalization
// ============================================================================

/// One item or a list of items.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// A JSON array.
    Many(Vec<T>),
    /// A bare object standing in for a one-element array.
    One(T),
}

impl<T> OneOrMany<T> {
    /// Flatten into a plain vector.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

/// Deserialize `null`, `"null"` or a missing key as `None`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(ref s) if s == "null" => Ok(None),
        other => serde_json::from_value(other)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Flatten an optional wrapper holding an optional list.
fn items<W, T>(wrapper: Option<W>, list: impl FnOnce(W) -> Option<OneOrMany<T>>) -> Vec<T> {
    wrapper
        .and_then(list)
        .map(OneOrMany::into_vec)
        .unwrap_or_default()
}

// ============================================================================
// Errors
// ============================================================================

/// Error body. Tradier uses several shapes depending on the endpoint.
#[derive(Debug, Deserialize)]
pub struct TradierErrorResponse {
    /// Plain `{"error": "..."}`.
    #[serde(default)]
    pub error: Option<String>,
    /// Plain `{"message": "..."}`.
    #[serde(default)]
    pub message: Option<String>,
    /// Gateway fault.
    #[serde(default)]
    pub fault: Option<Fault>,
    /// Order validation errors.
    #[serde(default, deserialize_with = "nullable")]
    pub errors: Option<ErrorList>,
}

/// Gateway fault.
#[derive(Debug, Deserialize)]
pub struct Fault {
    /// Fault description.
    pub faultstring: Option<String>,
}

/// Order validation error list.
#[derive(Debug, Deserialize)]
pub struct ErrorList {
    /// Messages.
    #[serde(default)]
    pub error: Option<OneOrMany<String>>,
}

impl TradierErrorResponse {
    /// First message found, in the order error, message, fault, errors.
    pub fn into_message(self) -> Option<String> {
        self.error
            .or(self.message)
            .or_else(|| self.fault.and_then(|f| f.faultstring))
            .or_else(|| {
                let errors = items(self.errors, |e| e.error);
                (!errors.is_empty()).then(|| errors.join("; "))
            })
    }
}

// ============================================================================
// Market data
// ============================================================================

/// `GET /v1/markets/options/expirations`.
#[derive(Debug, Deserialize)]
pub struct ExpirationsEnvelope {
    #[serde(default, deserialize_with = "nullable")]
    expirations: Option<DateList>,
}

#[derive(Debug, Deserialize)]
struct DateList {
    #[serde(default)]
    date: Option<OneOrMany<NaiveDate>>,
}

impl ExpirationsEnvelope {
    /// Expiration dates, ascending.
    pub fn into_dates(self) -> Vec<NaiveDate> {
        let mut dates = items(self.expirations, |l| l.date);
        dates.sort_unstable();
        dates
    }
}

/// `GET /v1/markets/options/strikes`.
#[derive(Debug, Deserialize)]
pub struct StrikesEnvelope {
    #[serde(default, deserialize_with = "nullable")]
    strikes: Option<StrikeList>,
}

#[derive(Debug, Deserialize)]
struct StrikeList {
    #[serde(default)]
    strike: Option<OneOrMany<Decimal>>,
}

impl StrikesEnvelope {
    /// Strikes as listed.
    pub fn into_strikes(self) -> Vec<Decimal> {
        items(self.strikes, |l| l.strike)
    }
}

/// Greeks as reported by the chain and quote endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct GreeksDto {
    #[serde(default)]
    delta: Option<f64>,
    #[serde(default)]
    gamma: Option<f64>,
    #[serde(default)]
    theta: Option<f64>,
    #[serde(default)]
    vega: Option<f64>,
    #[serde(default)]
    rho: Option<f64>,
    #[serde(default)]
    mid_iv: Option<f64>,
}

impl From<GreeksDto> for Greeks {
    fn from(dto: GreeksDto) -> Self {
        Self {
            delta: dto.delta,
            gamma: dto.gamma,
            theta: dto.theta,
            vega: dto.vega,
            rho: dto.rho,
            mid_iv: dto.mid_iv,
        }
    }
}

/// One contract from `GET /v1/markets/options/chains`.
#[derive(Debug, Deserialize)]
pub struct OptionDto {
    symbol: String,
    underlying: String,
    strike: Decimal,
    expiration_date: NaiveDate,
    option_type: String,
    #[serde(default)]
    bid: Option<Decimal>,
    #[serde(default)]
    ask: Option<Decimal>,
    #[serde(default)]
    last: Option<Decimal>,
    #[serde(default, deserialize_with = "nullable")]
    greeks: Option<GreeksDto>,
}

impl OptionDto {
    fn into_contract(self) -> Result<OptionContract, TradierError> {
        let option_type: OptionType = self
            .option_type
            .parse()
            .map_err(TradierError::JsonParse)?;
        let contract = OptionContract::new(
            self.symbol,
            self.underlying,
            self.strike,
            self.expiration_date,
            option_type,
        )
        .with_quotes(self.bid, self.ask, self.last);
        Ok(match self.greeks {
            Some(greeks) => contract.with_greeks(greeks.into()),
            None => contract,
        })
    }
}

/// `GET /v1/markets/options/chains`.
#[derive(Debug, Deserialize)]
pub struct ChainEnvelope {
    #[serde(default, deserialize_with = "nullable")]
    options: Option<OptionList>,
}

#[derive(Debug, Deserialize)]
struct OptionList {
    #[serde(default)]
    option: Option<OneOrMany<OptionDto>>,
}

impl ChainEnvelope {
    /// Contracts in the chain.
    pub fn into_contracts(self) -> Result<Vec<OptionContract>, TradierError> {
        items(self.options, |l| l.option)
            .into_iter()
            .map(OptionDto::into_contract)
            .collect()
    }
}

/// One entry from `/v1/markets/quotes`.
#[derive(Debug, Deserialize)]
pub struct QuoteDto {
    symbol: String,
    #[serde(default)]
    last: Option<Decimal>,
    #[serde(default)]
    bid: Option<Decimal>,
    #[serde(default)]
    ask: Option<Decimal>,
    #[serde(default, deserialize_with = "nullable")]
    greeks: Option<GreeksDto>,
}

impl From<QuoteDto> for Quote {
    fn from(dto: QuoteDto) -> Self {
        Self {
            symbol: dto.symbol,
            last: dto.last,
            bid: dto.bid,
            ask: dto.ask,
            greeks: dto.greeks.map(Greeks::from),
        }
    }
}

/// `GET|POST /v1/markets/quotes`.
#[derive(Debug, Deserialize)]
pub struct QuotesEnvelope {
    #[serde(default, deserialize_with = "nullable")]
    quotes: Option<QuoteList>,
}

#[derive(Debug, Deserialize)]
struct QuoteList {
    #[serde(default)]
    quote: Option<OneOrMany<QuoteDto>>,
}

impl QuotesEnvelope {
    /// Quotes for the matched symbols.
    pub fn into_quotes(self) -> Vec<Quote> {
        items(self.quotes, |l| l.quote)
            .into_iter()
            .map(Quote::from)
            .collect()
    }
}

/// `GET /v1/markets/options/lookup`.
#[derive(Debug, Deserialize)]
pub struct LookupEnvelope {
    #[serde(default, deserialize_with = "nullable")]
    symbols: Option<OneOrMany<LookupRoot>>,
}

#[derive(Debug, Deserialize)]
struct LookupRoot {
    #[serde(default)]
    options: Vec<String>,
}

impl LookupEnvelope {
    /// Option symbols across all roots.
    pub fn into_symbols(self) -> Vec<String> {
        self.symbols
            .map(OneOrMany::into_vec)
            .unwrap_or_default()
            .into_iter()
            .flat_map(|root| root.options)
            .collect()
    }
}

// ============================================================================
// Accounts
// ============================================================================

/// Account as listed by the profile and accounts endpoints.
#[derive(Debug, Deserialize)]
pub struct AccountDto {
    account_number: String,
    #[serde(default, rename = "type")]
    account_type: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    option_level: Option<u8>,
}

impl From<AccountDto> for AccountSummary {
    fn from(dto: AccountDto) -> Self {
        Self {
            account_number: dto.account_number,
            account_type: dto.account_type,
            status: dto.status,
            option_level: dto.option_level,
        }
    }
}

/// `GET /v1/user/profile`.
#[derive(Debug, Deserialize)]
pub struct ProfileEnvelope {
    #[serde(default, deserialize_with = "nullable")]
    profile: Option<Profile>,
}

#[derive(Debug, Deserialize)]
struct Profile {
    #[serde(default)]
    account: Option<OneOrMany<AccountDto>>,
}

impl ProfileEnvelope {
    /// Accounts attached to the profile.
    pub fn into_accounts(self) -> Vec<AccountSummary> {
        items(self.profile, |p| p.account)
            .into_iter()
            .map(AccountSummary::from)
            .collect()
    }
}

/// `GET /v1/accounts`.
#[derive(Debug, Deserialize)]
pub struct AccountsEnvelope {
    #[serde(default, deserialize_with = "nullable")]
    accounts: Option<AccountList>,
}

#[derive(Debug, Deserialize)]
struct AccountList {
    #[serde(default)]
    account: Option<OneOrMany<AccountDto>>,
}

impl AccountsEnvelope {
    /// Listed accounts.
    pub fn into_accounts(self) -> Vec<AccountSummary> {
        items(self.accounts, |l| l.account)
            .into_iter()
            .map(AccountSummary::from)
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct PositionDto {
    #[serde(default)]
    id: Option<u64>,
    symbol: String,
    quantity: Decimal,
    #[serde(default)]
    cost_basis: Option<Decimal>,
    #[serde(default)]
    date_acquired: Option<String>,
}

impl From<PositionDto> for Position {
    fn from(dto: PositionDto) -> Self {
        Self {
            id: dto.id,
            cost_basis: dto.cost_basis,
            date_acquired: dto.date_acquired,
            ..Self::new(dto.symbol, dto.quantity)
        }
    }
}

/// `GET /v1/accounts/{id}/positions`.
#[derive(Debug, Deserialize)]
pub struct PositionsEnvelope {
    #[serde(default, deserialize_with = "nullable")]
    positions: Option<PositionList>,
}

#[derive(Debug, Deserialize)]
struct PositionList {
    #[serde(default)]
    position: Option<OneOrMany<PositionDto>>,
}

impl PositionsEnvelope {
    /// Positions held; empty for a flat account.
    pub fn into_positions(self) -> Vec<Position> {
        items(self.positions, |l| l.position)
            .into_iter()
            .map(Position::from)
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct BalancesDto {
    #[serde(default)]
    account_number: Option<String>,
    #[serde(default)]
    account_type: Option<String>,
    #[serde(default)]
    total_equity: Option<Decimal>,
    #[serde(default)]
    total_cash: Option<Decimal>,
    #[serde(default)]
    market_value: Option<Decimal>,
    #[serde(default)]
    option_long_value: Option<Decimal>,
    #[serde(default)]
    option_short_value: Option<Decimal>,
    #[serde(default)]
    open_pl: Option<Decimal>,
    #[serde(default)]
    close_pl: Option<Decimal>,
    #[serde(default)]
    pending_orders_count: Option<u32>,
}

/// `GET /v1/accounts/{id}/balances`.
#[derive(Debug, Deserialize)]
pub struct BalancesEnvelope {
    #[serde(default, deserialize_with = "nullable")]
    balances: Option<BalancesDto>,
}

impl BalancesEnvelope {
    /// Balances snapshot.
    pub fn into_balances(self) -> Result<Balances, TradierError> {
        let dto = self
            .balances
            .ok_or_else(|| TradierError::missing("balances"))?;
        Ok(Balances {
            account_number: dto.account_number,
            account_type: dto.account_type,
            total_equity: dto.total_equity,
            total_cash: dto.total_cash,
            market_value: dto.market_value,
            option_long_value: dto.option_long_value,
            option_short_value: dto.option_short_value,
            open_pl: dto.open_pl,
            close_pl: dto.close_pl,
            pending_orders_count: dto.pending_orders_count,
        })
    }
}

// ============================================================================
// Orders
// ============================================================================

#[derive(Debug, Deserialize)]
struct OrderDto {
    id: u64,
    status: String,
    #[serde(default)]
    class: Option<String>,
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    option_symbol: Option<String>,
    #[serde(default)]
    side: Option<String>,
    #[serde(default)]
    quantity: Option<Decimal>,
    #[serde(default, rename = "type")]
    order_type: Option<String>,
    #[serde(default)]
    tag: Option<String>,
    #[serde(default)]
    create_date: Option<String>,
}

impl From<OrderDto> for OrderRecord {
    fn from(dto: OrderDto) -> Self {
        Self {
            id: dto.id,
            status: dto.status,
            class: dto.class,
            symbol: dto.symbol,
            option_symbol: dto.option_symbol,
            side: dto.side,
            quantity: dto.quantity,
            order_type: dto.order_type,
            tag: dto.tag,
            create_date: dto.create_date,
        }
    }
}

/// `GET /v1/accounts/{id}/orders`.
#[derive(Debug, Deserialize)]
pub struct OrdersEnvelope {
    #[serde(default, deserialize_with = "nullable")]
    orders: Option<OrderList>,
}

#[derive(Debug, Deserialize)]
struct OrderList {
    #[serde(default)]
    order: Option<OneOrMany<OrderDto>>,
}

impl OrdersEnvelope {
    /// Orders in the account.
    pub fn into_orders(self) -> Vec<OrderRecord> {
        items(self.orders, |l| l.order)
            .into_iter()
            .map(OrderRecord::from)
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct OrderResultDto {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    result: Option<bool>,
    #[serde(default)]
    commission: Option<Decimal>,
    #[serde(default)]
    cost: Option<Decimal>,
    #[serde(default)]
    fees: Option<Decimal>,
    #[serde(default)]
    margin_change: Option<Decimal>,
    #[serde(default)]
    strategy: Option<String>,
}

/// Response to order submission, modification and cancellation.
#[derive(Debug, Deserialize)]
pub struct OrderResponseEnvelope {
    #[serde(default, deserialize_with = "nullable")]
    order: Option<OrderResultDto>,
}

impl OrderResponseEnvelope {
    /// Acknowledgment; preview details are kept when `preview` was requested.
    pub fn into_ack(self, preview: bool) -> Result<OrderAck, TradierError> {
        let dto = self.order.ok_or_else(|| TradierError::missing("order"))?;
        let preview = preview.then(|| OrderPreview {
            result: dto.result,
            commission: dto.commission,
            cost: dto.cost,
            fees: dto.fees,
            margin_change: dto.margin_change,
            strategy: dto.strategy.clone(),
        });
        Ok(OrderAck {
            order_id: dto.id,
            status: dto.status.unwrap_or_else(|| "ok".to_string()),
            preview,
        })
    }
}

// ============================================================================
// Streaming sessions
// ============================================================================

#[derive(Debug, Deserialize)]
struct StreamDto {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    sessionid: Option<String>,
}

/// `POST /v1/{markets|accounts}/events/session`.
#[derive(Debug, Deserialize)]
pub struct SessionEnvelope {
    #[serde(default, deserialize_with = "nullable")]
    stream: Option<StreamDto>,
}

impl SessionEnvelope {
    /// `(url, session_id)` from the response.
    pub fn into_parts(self) -> Result<(String, String), TradierError> {
        let stream = self.stream.ok_or_else(|| TradierError::missing("stream"))?;
        let url = stream.url.ok_or_else(|| TradierError::missing("stream.url"))?;
        let session_id = stream
            .sessionid
            .ok_or_else(|| TradierError::missing("stream.sessionid"))?;
        Ok((url, session_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn one_or_many_normalizes_bare_object() {
        let one: PositionsEnvelope = serde_json::from_str(
            r#"{"positions":{"position":{"id":1,"symbol":"SPY240119C00450000","quantity":-1.0}}}"#,
        )
        .unwrap();
        let positions = one.into_positions();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].quantity, dec!(-1));

        let many: PositionsEnvelope = serde_json::from_str(
            r#"{"positions":{"position":[{"symbol":"SPY","quantity":100},{"symbol":"QQQ","quantity":5}]}}"#,
        )
        .unwrap();
        assert_eq!(many.into_positions().len(), 2);
    }

    #[test]
    fn null_string_is_empty() {
        let flat: PositionsEnvelope = serde_json::from_str(r#"{"positions":"null"}"#).unwrap();
        assert!(flat.into_positions().is_empty());

        let none: ExpirationsEnvelope = serde_json::from_str(r#"{"expirations":null}"#).unwrap();
        assert!(none.into_dates().is_empty());

        let orders: OrdersEnvelope = serde_json::from_str(r#"{"orders":"null"}"#).unwrap();
        assert!(orders.into_orders().is_empty());
    }

    #[test]
    fn expirations_sorted() {
        let env: ExpirationsEnvelope = serde_json::from_str(
            r#"{"expirations":{"date":["2024-01-19","2024-01-17","2024-01-18"]}}"#,
        )
        .unwrap();
        let dates = env.into_dates();
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2024, 1, 17).unwrap());
        assert_eq!(dates.len(), 3);
    }

    #[test]
    fn single_strike() {
        let env: StrikesEnvelope =
            serde_json::from_str(r#"{"strikes":{"strike":450.0}}"#).unwrap();
        assert_eq!(env.into_strikes(), vec![dec!(450)]);
    }

    #[test]
    fn chain_contract_with_greeks() {
        let env: ChainEnvelope = serde_json::from_str(
            r#"{"options":{"option":{
                "symbol":"SPY240119C00450000","underlying":"SPY","strike":450.0,
                "expiration_date":"2024-01-19","option_type":"call",
                "bid":1.2,"ask":1.3,"last":1.25,
                "greeks":{"delta":0.36,"gamma":0.05,"theta":-0.21,"vega":0.1,"rho":0.01,"mid_iv":0.14,"updated_at":"2024-01-15 20:59:58"}
            }}}"#,
        )
        .unwrap();
        let contracts = env.into_contracts().unwrap();
        assert_eq!(contracts.len(), 1);
        assert_eq!(contracts[0].option_type(), OptionType::Call);
        assert_eq!(contracts[0].delta(), Some(0.36));
        assert_eq!(contracts[0].mid(), Some(dec!(1.25)));
    }

    #[test]
    fn chain_contract_without_greeks() {
        let env: ChainEnvelope = serde_json::from_str(
            r#"{"options":{"option":[{
                "symbol":"SPY240119P00440000","underlying":"SPY","strike":440,
                "expiration_date":"2024-01-19","option_type":"put","greeks":null
            }]}}"#,
        )
        .unwrap();
        let contracts = env.into_contracts().unwrap();
        assert_eq!(contracts[0].option_type(), OptionType::Put);
        assert!(contracts[0].greeks().is_none());
    }

    #[test]
    fn profile_accounts() {
        let env: ProfileEnvelope = serde_json::from_str(
            r#"{"profile":{"id":"id-gcostanza","name":"George Costanza","account":{"account_number":"VA000001","type":"margin","status":"active","option_level":6}}}"#,
        )
        .unwrap();
        let accounts = env.into_accounts();
        assert_eq!(accounts[0].account_number, "VA000001");
        assert_eq!(accounts[0].account_type.as_deref(), Some("margin"));
        assert_eq!(accounts[0].option_level, Some(6));
    }

    #[test]
    fn lookup_flattens_roots() {
        let env: LookupEnvelope = serde_json::from_str(
            r#"{"symbols":[{"rootSymbol":"SPY","options":["SPY240119C00450000","SPY240119P00450000"]}]}"#,
        )
        .unwrap();
        assert_eq!(env.into_symbols().len(), 2);
    }

    #[test]
    fn order_ack_and_preview() {
        let env: OrderResponseEnvelope =
            serde_json::from_str(r#"{"order":{"id":228175,"status":"ok","partner_id":"3a8bbee1"}}"#)
                .unwrap();
        let ack = env.into_ack(false).unwrap();
        assert_eq!(ack.order_id, Some(228_175));
        assert!(ack.preview.is_none());

        let env: OrderResponseEnvelope = serde_json::from_str(
            r#"{"order":{"status":"ok","commission":0.35,"cost":125.35,"fees":0.0,"margin_change":0.0,"result":true,"strategy":"calendar"}}"#,
        )
        .unwrap();
        let ack = env.into_ack(true).unwrap();
        assert_eq!(ack.order_id, None);
        let preview = ack.preview.unwrap();
        assert_eq!(preview.cost, Some(dec!(125.35)));
        assert_eq!(preview.strategy.as_deref(), Some("calendar"));
    }

    #[test]
    fn session_requires_id() {
        let env: SessionEnvelope = serde_json::from_str(
            r#"{"stream":{"url":"https://stream.tradier.com/v1/markets/events","sessionid":"c8638963"}}"#,
        )
        .unwrap();
        let (url, id) = env.into_parts().unwrap();
        assert!(url.ends_with("/v1/markets/events"));
        assert_eq!(id, "c8638963");

        let env: SessionEnvelope = serde_json::from_str(r#"{"stream":{"url":"x"}}"#).unwrap();
        assert!(matches!(
            env.into_parts(),
            Err(TradierError::MissingField { .. })
        ));
    }

    #[test]
    fn error_message_precedence() {
        let body: TradierErrorResponse =
            serde_json::from_str(r#"{"fault":{"faultstring":"Invalid Access Token"}}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Invalid Access Token"));

        let body: TradierErrorResponse = serde_json::from_str(
            r#"{"errors":{"error":["Backoffice rejected override of the order.","Second"]}}"#,
        )
        .unwrap();
        assert_eq!(
            body.into_message().as_deref(),
            Some("Backoffice rejected override of the order.; Second")
        );

        let body: TradierErrorResponse =
            serde_json::from_str(r#"{"error":"a","message":"b"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("a"));
    }
}
