//! # Checkout Errors
//!
//! Typed errors of the checkout layer, plus the serializable [`ApiError`]
//! the UI receives.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Splash POS                             │
//! │                                                                         │
//! │  ValidationError (core) ─┐                                              │
//! │  CoreError (core) ───────┼──► CheckoutError ──► ApiError ──► UI toast   │
//! │  SubmissionError ────────┘                                              │
//! │                                                                         │
//! │  Data-integrity issues never get here: they are coerced and logged      │
//! │  by splash_core::sanitize.                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The UI gets `{ "code": "NOT_BALANCED", "message": "..." }` and decides
//! how loud to be about it.

use serde::Serialize;
use splash_core::{CoreError, Money, ValidationError};
use thiserror::Error;

// =============================================================================
// Collaborator Errors
// =============================================================================

/// Failures of the order-creation or catalog collaborators.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmissionError {
    /// Request never reached the backend or the connection dropped.
    #[error("Network error: {0}")]
    Network(String),

    /// Backend answered with an error message.
    #[error("Rejected by server: {0}")]
    Rejected(String),

    /// No answer within the configured timeout.
    #[error("No response after {0} seconds")]
    Timeout(u64),
}

/// Receipt dispatch (printing) failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Receipt dispatch failed: {0}")]
pub struct DispatchError(pub String);

/// Configuration load failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

// =============================================================================
// Checkout Error
// =============================================================================

#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Input rejected at the point of entry.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Pricing rule violation (empty order, unbalanced payments).
    #[error(transparent)]
    Core(CoreError),

    /// Confirm pressed while payments do not balance.
    #[error("Payments do not balance the total: remaining {remaining}")]
    NotBalanced { remaining: Money },

    /// Confirm pressed while a submission is still outstanding.
    #[error("Order submission already in progress")]
    SubmissionInFlight,

    /// No signed-in user to attribute the order to.
    #[error("No signed-in user")]
    NotSignedIn,

    /// Order creation failed; local state is unchanged.
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

impl From<CoreError> for CheckoutError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotBalanced { remaining } => CheckoutError::NotBalanced { remaining },
            CoreError::Validation(e) => CheckoutError::Validation(e),
            other => CheckoutError::Core(other),
        }
    }
}

pub type CheckoutResult<T> = Result<T, CheckoutError>;

// =============================================================================
// API Error
// =============================================================================

/// Error as the UI receives it.
///
/// ```json
/// { "code": "SUBMISSION_FAILED", "message": "Network error: connection reset" }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input rejected (400)
    ValidationError,
    /// Payments do not match the total
    NotBalanced,
    /// Nothing selected
    EmptyOrder,
    /// Double confirm
    InFlight,
    /// Session has no user
    Unauthenticated,
    /// Backend / network failure
    SubmissionFailed,
    /// Backend did not answer in time
    Timeout,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        let code = match &err {
            CheckoutError::Validation(_) => ErrorCode::ValidationError,
            CheckoutError::Core(CoreError::EmptyOrder) => ErrorCode::EmptyOrder,
            CheckoutError::Core(CoreError::NotBalanced { .. }) | CheckoutError::NotBalanced { .. } => {
                ErrorCode::NotBalanced
            }
            CheckoutError::Core(CoreError::Validation(_)) => ErrorCode::ValidationError,
            CheckoutError::SubmissionInFlight => ErrorCode::InFlight,
            CheckoutError::NotSignedIn => ErrorCode::Unauthenticated,
            CheckoutError::Submission(SubmissionError::Timeout(_)) => ErrorCode::Timeout,
            CheckoutError::Submission(_) => ErrorCode::SubmissionFailed,
        };
        ApiError::new(code, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_not_balanced_is_lifted() {
        let err: CheckoutError = CoreError::NotBalanced {
            remaining: Money::from_cents(5000),
        }
        .into();
        assert!(matches!(err, CheckoutError::NotBalanced { remaining } if remaining == Money::from_cents(5000)));
    }

    #[test]
    fn test_core_validation_is_flattened() {
        let err: CheckoutError = CoreError::Validation(ValidationError::DiscountIsNotTender).into();
        assert!(matches!(err, CheckoutError::Validation(ValidationError::DiscountIsNotTender)));
    }

    #[test]
    fn test_api_error_codes() {
        let api: ApiError = CheckoutError::Submission(SubmissionError::Timeout(15)).into();
        assert_eq!(api.code, ErrorCode::Timeout);
        assert_eq!(api.message, "No response after 15 seconds");

        let api: ApiError = CheckoutError::Core(CoreError::EmptyOrder).into();
        assert_eq!(api.code, ErrorCode::EmptyOrder);

        let json = serde_json::to_value(ApiError::from(CheckoutError::SubmissionInFlight)).unwrap();
        assert_eq!(json["code"], "IN_FLIGHT");
    }
}
