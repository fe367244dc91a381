//! Error taxonomy for the calendar engine.
//!
//! Every error type in the crate maps onto one [`ErrorCategory`]:
//!
//! | Category | Meaning | Retried |
//! |----------|---------|---------|
//! | `RESOLUTION` | No expiration, strike or delta match | No |
//! | `TRANSPORT` | Network, non-2xx status, malformed envelope | Stream clients only |
//! | `VALIDATION` | Request or order rejected before any network call | No |
//! | `PARTIAL_FAILURE` | A roll failed after some legs were closed | No |

use serde::{Deserialize, Serialize};

use crate::application::ports::{BrokerError, MarketDataError, SessionError};
use crate::application::use_cases::{
    BuildSpreadError, CloseSpreadError, LegCloseOutcome, OpenSpreadError, RollPhase,
    RollSpreadResponse,
};
use crate::config::ConfigError;
use crate::domain::calendar_spread::SpreadError;
use crate::domain::order_composition::OrderValidationError;
use crate::infrastructure::streaming::StreamError;
use crate::infrastructure::tradier::TradierError;

/// Error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    /// Nothing in the market matched the request.
    Resolution,
    /// The brokerage could not be reached or answered badly.
    Transport,
    /// Rejected before any network call.
    Validation,
    /// A multi-step operation stopped part way.
    PartialFailure,
}

impl ErrorCategory {
    /// Reason string.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Resolution => "RESOLUTION",
            Self::Transport => "TRANSPORT",
            Self::Validation => "VALIDATION",
            Self::PartialFailure => "PARTIAL_FAILURE",
        }
    }

    /// Process exit code for the binary.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation => 2,
            Self::Resolution => 3,
            Self::Transport => 4,
            Self::PartialFailure => 5,
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason())
    }
}

/// Errors that belong to a category.
pub trait Categorized: std::error::Error {
    /// Category of this error.
    fn category(&self) -> ErrorCategory;

    /// Report for output.
    fn report(&self) -> ErrorReport {
        ErrorReport::new(self.category(), self.to_string())
    }
}

impl Categorized for SpreadError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidRequest { .. } | Self::InvalidSpread { .. } => ErrorCategory::Validation,
            Self::InsufficientExpirations { .. }
            | Self::NoSuitableExpirations { .. }
            | Self::NoDeltaMatch { .. }
            | Self::StrikeNotFound { .. } => ErrorCategory::Resolution,
        }
    }
}

impl Categorized for OrderValidationError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::Validation
    }
}

impl Categorized for MarketDataError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::SymbolNotFound { .. } => ErrorCategory::Resolution,
            _ => ErrorCategory::Transport,
        }
    }
}

impl Categorized for BrokerError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidOrder { .. } => ErrorCategory::Validation,
            _ => ErrorCategory::Transport,
        }
    }
}

impl Categorized for SessionError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::Transport
    }
}

impl Categorized for StreamError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::NoSession | Self::EmptySubscription | Self::WrongFeed { .. } => {
                ErrorCategory::Validation
            }
            _ => ErrorCategory::Transport,
        }
    }
}

impl Categorized for TradierError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidOrder(_) => ErrorCategory::Validation,
            _ => ErrorCategory::Transport,
        }
    }
}

impl Categorized for ConfigError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::Validation
    }
}

impl Categorized for BuildSpreadError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::Spread(e) => e.category(),
            Self::MarketData(e) => e.category(),
        }
    }
}

impl Categorized for OpenSpreadError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::Build(e) => e.category(),
            Self::Validation(e) => e.category(),
            Self::Broker(e) => e.category(),
        }
    }
}

impl Categorized for CloseSpreadError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::NoPositions { .. } => ErrorCategory::Resolution,
            Self::Validation(e) => e.category(),
            Self::Broker(e) => e.category(),
        }
    }
}

/// Category of a failed roll: a validation failure when the request was
/// refused up front, a partial failure once any close was acknowledged,
/// else a transport failure.
#[must_use]
pub fn roll_category(response: &RollSpreadResponse) -> Option<ErrorCategory> {
    if response.failed_phase? == RollPhase::Validate {
        Some(ErrorCategory::Validation)
    } else if response.closed.iter().any(LegCloseOutcome::is_ok) {
        Some(ErrorCategory::PartialFailure)
    } else {
        Some(ErrorCategory::Transport)
    }
}

/// Serializable error body printed by the binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Always false.
    pub ok: bool,
    /// Category.
    pub category: ErrorCategory,
    /// Human-readable message.
    pub error: String,
}

impl ErrorReport {
    /// Create a report.
    #[must_use]
    pub fn new(category: ErrorCategory, error: impl Into<String>) -> Self {
        Self {
            ok: false,
            category,
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::domain::option_chain::OptionType;

    #[test]
    fn spread_errors() {
        let err = SpreadError::NoDeltaMatch {
            option_type: OptionType::Call,
            target_delta: 0.35,
            expiration: NaiveDate::from_ymd_opt(2024, 1, 19).unwrap(),
        };
        assert_eq!(err.category(), ErrorCategory::Resolution);

        let err = SpreadError::InvalidRequest {
            message: "bad".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn nested_errors_keep_category() {
        let err = OpenSpreadError::Build(BuildSpreadError::MarketData(
            MarketDataError::ConnectionError {
                message: "reset".to_string(),
            },
        ));
        assert_eq!(err.category(), ErrorCategory::Transport);

        let err = OpenSpreadError::Validation(OrderValidationError::InvalidQuantity {
            quantity: dec!(0),
        });
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn stream_errors() {
        assert_eq!(StreamError::NoSession.category(), ErrorCategory::Validation);
        assert_eq!(
            StreamError::ReconnectExhausted { attempts: 10 }.category(),
            ErrorCategory::Transport
        );
    }

    #[test]
    fn refused_roll_is_a_validation_failure() {
        let response = RollSpreadResponse {
            ok: false,
            closed: vec![],
            opened: None,
            failed_phase: Some(RollPhase::Validate),
            error: Some("Preview is not supported for rolls".to_string()),
        };
        assert_eq!(roll_category(&response), Some(ErrorCategory::Validation));
    }

    #[test]
    fn report_serializes() {
        let report = BrokerError::RateLimited.report();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["category"], "TRANSPORT");
        assert_eq!(json["error"], "Rate limited by broker");
    }

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            ErrorCategory::Resolution,
            ErrorCategory::Transport,
            ErrorCategory::Validation,
            ErrorCategory::PartialFailure,
        ]
        .map(|c| c.exit_code());
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
