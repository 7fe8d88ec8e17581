//! # Error Types
//!
//! Domain-specific error types for splash-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  splash-core errors (this file)                                        │
//! │  ├── CoreError        - Pricing / reconciliation rule violations       │
//! │  └── ValidationError  - Input rejected at the point of entry           │
//! │                                                                         │
//! │  splash-checkout errors (separate crate)                               │
//! │  ├── CheckoutError    - Confirm flow failures                          │
//! │  ├── SubmissionError  - Order submitter / catalog source failures      │
//! │  └── ApiError         - What the UI sees (serialized)                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CheckoutError → ApiError → UI     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Malformed upstream data (unknown item ids, non-numeric prices) is NOT an
//! error here: it is coerced to zero and logged. See [`crate::sanitize`].

use thiserror::Error;

use crate::money::Money;
use crate::types::{ItemRef, PaymentMethod};

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Tendered amounts do not match the payable total.
    ///
    /// ## User Workflow
    /// ```text
    /// final_total 200.00, cash 150.00
    ///      │
    ///      ▼
    /// remaining 50.00 > 0.01
    ///      │
    ///      ▼
    /// NotBalanced { remaining: 50.00 } → confirm stays disabled
    /// ```
    #[error("Payments do not balance the total: remaining {remaining}")]
    NotBalanced { remaining: Money },

    /// Nothing selected, nothing to submit.
    #[error("Order has no tickets or meals")]
    EmptyOrder,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input rejected at the point of entry.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// `discount` was used where a tender is required.
    #[error("discount is not a payment method; enter it as a discount")]
    DiscountIsNotTender,

    /// Manual edit of a tender that is auto-filled.
    #[error("{method} amount follows the order total while it is the only payment method")]
    AmountLocked { method: PaymentMethod },

    /// Amount edit for a method that is not selected.
    #[error("{method} is not selected")]
    MethodNotSelected { method: PaymentMethod },

    /// New selection of an id the catalog does not know.
    #[error("{item} is not in the catalog")]
    UnknownItem { item: ItemRef },

    /// New selection of an archived item.
    #[error("{item} is archived and cannot be added to an order")]
    ArchivedItem { item: ItemRef },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::NotBalanced {
            remaining: Money::from_cents(5000),
        };
        assert_eq!(
            err.to_string(),
            "Payments do not balance the total: remaining 50.00"
        );

        let err = ValidationError::AmountLocked {
            method: PaymentMethod::Cash,
        };
        assert_eq!(
            err.to_string(),
            "cash amount follows the order total while it is the only payment method"
        );

        let err = ValidationError::ArchivedItem {
            item: ItemRef::meal(4),
        };
        assert_eq!(
            err.to_string(),
            "meal#4 is archived and cannot be added to an order"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::DiscountIsNotTender.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
