//! Subscription payloads for the market and account event feeds.

use serde_json::{json, Map, Value};

use crate::domain::streaming::StreamKind;

/// Market feed subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketSubscription {
    /// Symbols to stream.
    pub symbols: Vec<String>,
    /// Event types (`trade`, `quote`, `summary`, `timesale`, `tradex`).
    pub filter: Vec<String>,
    /// Newline-delimit messages.
    pub linebreak: bool,
    /// Only valid ticks.
    pub valid_only: bool,
    /// Extra fields on quotes and trades.
    pub advanced_details: bool,
}

impl Default for MarketSubscription {
    fn default() -> Self {
        Self {
            symbols: Vec::new(),
            filter: Vec::new(),
            linebreak: false,
            valid_only: true,
            advanced_details: false,
        }
    }
}

impl MarketSubscription {
    /// Subscription to `symbols` with default options.
    #[must_use]
    pub fn new(symbols: Vec<String>) -> Self {
        Self {
            symbols,
            ..Self::default()
        }
    }

    /// Restrict to the given event types.
    #[must_use]
    pub fn with_filter(mut self, filter: Vec<String>) -> Self {
        self.filter = filter;
        self
    }

    /// Set the line-break flag.
    #[must_use]
    pub const fn with_linebreak(mut self, linebreak: bool) -> Self {
        self.linebreak = linebreak;
        self
    }

    /// Set the valid-only flag.
    #[must_use]
    pub const fn with_valid_only(mut self, valid_only: bool) -> Self {
        self.valid_only = valid_only;
        self
    }

    /// Set the advanced-details flag.
    #[must_use]
    pub const fn with_advanced_details(mut self, advanced_details: bool) -> Self {
        self.advanced_details = advanced_details;
        self
    }

    /// WebSocket payload. Optional flags are omitted when unset;
    /// `validOnly` is always sent.
    #[must_use]
    pub fn ws_payload(&self, session_id: &str) -> Value {
        let mut payload = Map::new();
        payload.insert("symbols".to_string(), json!(self.symbols));
        payload.insert("sessionid".to_string(), json!(session_id));
        if !self.filter.is_empty() {
            payload.insert("filter".to_string(), json!(self.filter));
        }
        if self.linebreak {
            payload.insert("linebreak".to_string(), json!(true));
        }
        payload.insert("validOnly".to_string(), json!(self.valid_only));
        if self.advanced_details {
            payload.insert("advancedDetails".to_string(), json!(true));
        }
        Value::Object(payload)
    }

    /// Query or form parameters for the HTTP feed. Lists are comma-joined;
    /// flags are sent only when true.
    #[must_use]
    pub fn http_params(&self, session_id: &str) -> Vec<(String, String)> {
        let mut params = vec![
            ("sessionid".to_string(), session_id.to_string()),
            ("symbols".to_string(), self.symbols.join(",")),
        ];
        if !self.filter.is_empty() {
            params.push(("filter".to_string(), self.filter.join(",")));
        }
        for (name, set) in [
            ("linebreak", self.linebreak),
            ("validOnly", self.valid_only),
            ("advancedDetails", self.advanced_details),
        ] {
            if set {
                params.push((name.to_string(), "true".to_string()));
            }
        }
        params
    }
}

/// Account feed subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSubscription {
    /// Event types; only `order` exists today.
    pub events: Vec<String>,
    /// Account numbers to leave out.
    pub exclude_accounts: Vec<String>,
}

impl Default for AccountSubscription {
    fn default() -> Self {
        Self {
            events: vec!["order".to_string()],
            exclude_accounts: Vec::new(),
        }
    }
}

impl AccountSubscription {
    /// WebSocket payload.
    #[must_use]
    pub fn ws_payload(&self, session_id: &str) -> Value {
        let mut payload = Map::new();
        payload.insert("events".to_string(), json!(self.events));
        payload.insert("sessionid".to_string(), json!(session_id));
        if !self.exclude_accounts.is_empty() {
            payload.insert("excludeAccounts".to_string(), json!(self.exclude_accounts));
        }
        Value::Object(payload)
    }
}

/// Subscription of one stream client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subscription {
    /// Market events.
    Market(MarketSubscription),
    /// Account events.
    Account(AccountSubscription),
}

impl Subscription {
    /// Feed this subscription belongs to.
    #[must_use]
    pub const fn kind(&self) -> StreamKind {
        match self {
            Self::Market(_) => StreamKind::Market,
            Self::Account(_) => StreamKind::Account,
        }
    }

    /// Nothing to subscribe to.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Market(market) => market.symbols.is_empty(),
            Self::Account(account) => account.events.is_empty(),
        }
    }

    /// WebSocket payload for `session_id`.
    #[must_use]
    pub fn ws_payload(&self, session_id: &str) -> Value {
        match self {
            Self::Market(market) => market.ws_payload(session_id),
            Self::Account(account) => account.ws_payload(session_id),
        }
    }
}
