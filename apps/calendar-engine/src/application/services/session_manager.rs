//! Streaming Session Manager
//!
//! Requests session tokens for the market and account event feeds and
//! replaces them before they go stale.

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::application::ports::{SessionError, StreamSessionPort};
use crate::domain::streaming::{StreamKind, StreamingSession};

/// Sessions closer than this to expiry are replaced on refresh.
pub const DEFAULT_REFRESH_MARGIN_SECS: i64 = 30;

/// Issues and refreshes streaming sessions.
pub struct StreamingSessionManager<P: StreamSessionPort> {
    port: Arc<P>,
    refresh_margin: Duration,
}

impl<P: StreamSessionPort> StreamingSessionManager<P> {
    /// Manager over `port` with the default refresh margin.
    pub fn new(port: Arc<P>) -> Self {
        Self {
            port,
            refresh_margin: Duration::seconds(DEFAULT_REFRESH_MARGIN_SECS),
        }
    }

    /// Override the refresh margin.
    #[must_use]
    pub const fn with_refresh_margin(mut self, margin: Duration) -> Self {
        self.refresh_margin = margin;
        self
    }

    /// New market-events session.
    pub async fn create_market_session(&self) -> Result<StreamingSession, SessionError> {
        self.create(StreamKind::Market).await
    }

    /// New account-events session.
    pub async fn create_account_session(&self) -> Result<StreamingSession, SessionError> {
        self.create(StreamKind::Account).await
    }

    async fn create(&self, kind: StreamKind) -> Result<StreamingSession, SessionError> {
        let session = self.port.create_session(kind).await?;
        tracing::info!(
            kind = %kind,
            expires_at = %session.expires_at(),
            "Streaming session created"
        );
        Ok(session)
    }

    /// `session` if it is still fresh, otherwise a new one of the same kind.
    pub async fn refresh(&self, session: StreamingSession) -> Result<StreamingSession, SessionError> {
        if session.expires_within(Utc::now(), self.refresh_margin) {
            tracing::debug!(kind = %session.kind(), "Streaming session stale, renewing");
            return self.create(session.kind()).await;
        }
        Ok(session)
    }
}
