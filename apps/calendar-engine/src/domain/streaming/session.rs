//! Streaming Session Value Object

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Lifetime of a streaming session token after issuance.
pub const SESSION_TTL_SECS: i64 = 5 * 60;

/// Which event feed a session authorizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    /// Quotes, trades, summaries and time-and-sales.
    Market,
    /// Order and account events.
    Account,
}

impl std::fmt::Display for StreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Market => write!(f, "market"),
            Self::Account => write!(f, "account"),
        }
    }
}

/// A short-lived token authorizing one stream connection.
///
/// Sessions are not renewed automatically; callers check
/// [`StreamingSession::expires_within`] and request a fresh one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamingSession {
    kind: StreamKind,
    url: String,
    session_id: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl StreamingSession {
    /// Session issued at `issued_at`, expiring after the standard TTL.
    #[must_use]
    pub fn new(
        kind: StreamKind,
        url: impl Into<String>,
        session_id: impl Into<String>,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            url: url.into(),
            session_id: session_id.into(),
            issued_at,
            expires_at: issued_at + Duration::seconds(SESSION_TTL_SECS),
        }
    }

    /// Feed kind.
    #[must_use]
    pub const fn kind(&self) -> StreamKind {
        self.kind
    }

    /// Stream URL returned by the brokerage.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Session id sent with every subscription payload.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Issuance time.
    #[must_use]
    pub const fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Expiry time.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Expired as of `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Expires within `margin` of `now`.
    #[must_use]
    pub fn expires_within(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        now + margin >= self.expires_at
    }
}
