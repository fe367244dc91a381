//! Stream Session Port (Driven Port)
//!
//! Issues short-lived session tokens for the event feeds.

use async_trait::async_trait;

use crate::domain::streaming::{StreamKind, StreamingSession};

/// Session creation error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    /// Request failed.
    #[error("Session request failed: {message}")]
    RequestFailed {
        /// Error details.
        message: String,
    },

    /// Token rejected.
    #[error("Session request unauthorized")]
    Unauthorized,

    /// Response missing the session id or url.
    #[error("Malformed session response: {message}")]
    MalformedResponse {
        /// Error details.
        message: String,
    },
}

/// Port for creating streaming sessions.
#[async_trait]
pub trait StreamSessionPort: Send + Sync {
    /// Create a session for `kind`.
    async fn create_session(&self, kind: StreamKind) -> Result<StreamingSession, SessionError>;
}
