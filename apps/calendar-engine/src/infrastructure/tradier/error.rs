//! Tradier-specific error types.

use thiserror::Error;

use crate::application::ports::{BrokerError, MarketDataError, SessionError};
use crate::domain::order_composition::OrderValidationError;

/// Errors from the Tradier adapter.
#[derive(Debug, Error, Clone)]
pub enum TradierError {
    /// HTTP client could not be built or the request could not be sent.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Network error.
    #[error("Network error: {0}")]
    Network(String),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    JsonParse(String),

    /// Successful status with a non-JSON body.
    #[error("Expected JSON response but got: {content_type}")]
    UnexpectedContentType {
        /// Reported content type.
        content_type: String,
    },

    /// Token missing or rejected.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        /// Error details.
        message: String,
    },

    /// 404 from the API.
    #[error(
        "Resource not found (404). {message}. This may indicate: missing account, invalid endpoint, or insufficient API permissions."
    )]
    NotFound {
        /// Error message from the API.
        message: String,
    },

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// Envelope lacks an expected field.
    #[error("Missing field in response: {field}")]
    MissingField {
        /// Dotted path of the missing field.
        field: String,
    },

    /// Order failed local validation.
    #[error("Invalid order: {0}")]
    InvalidOrder(String),
}

impl TradierError {
    /// Missing envelope field.
    pub(crate) fn missing(field: &str) -> Self {
        Self::MissingField {
            field: field.to_string(),
        }
    }
}

impl From<OrderValidationError> for TradierError {
    fn from(err: OrderValidationError) -> Self {
        Self::InvalidOrder(err.to_string())
    }
}

impl From<TradierError> for MarketDataError {
    fn from(err: TradierError) -> Self {
        match err {
            TradierError::Http(message) | TradierError::Network(message) => {
                Self::ConnectionError { message }
            }
            TradierError::AuthenticationFailed { .. } => Self::AuthenticationFailed,
            TradierError::RateLimited => Self::RateLimited {
                retry_after_secs: 60,
            },
            TradierError::JsonParse(_)
            | TradierError::UnexpectedContentType { .. }
            | TradierError::MissingField { .. } => Self::MalformedResponse {
                message: err.to_string(),
            },
            TradierError::NotFound { .. }
            | TradierError::Api { .. }
            | TradierError::InvalidOrder(_) => Self::ApiError {
                message: err.to_string(),
            },
        }
    }
}

impl From<TradierError> for BrokerError {
    fn from(err: TradierError) -> Self {
        match err {
            TradierError::Http(message) | TradierError::Network(message) => {
                Self::ConnectionError { message }
            }
            TradierError::AuthenticationFailed { message } => {
                Self::AuthenticationFailed { message }
            }
            TradierError::RateLimited => Self::RateLimited,
            TradierError::JsonParse(_)
            | TradierError::UnexpectedContentType { .. }
            | TradierError::MissingField { .. } => Self::MalformedResponse {
                message: err.to_string(),
            },
            TradierError::InvalidOrder(message) => Self::InvalidOrder { message },
            TradierError::Api { status: 400, message } => Self::OrderRejected { reason: message },
            TradierError::NotFound { .. } | TradierError::Api { .. } => Self::Unknown {
                message: err.to_string(),
            },
        }
    }
}

impl From<TradierError> for SessionError {
    fn from(err: TradierError) -> Self {
        match err {
            TradierError::AuthenticationFailed { .. } => Self::Unauthorized,
            TradierError::JsonParse(_)
            | TradierError::UnexpectedContentType { .. }
            | TradierError::MissingField { .. } => Self::MalformedResponse {
                message: err.to_string(),
            },
            _ => Self::RequestFailed {
                message: err.to_string(),
            },
        }
    }
}
