//! # Sanitization Boundary
//!
//! The single place where untyped input becomes well-typed values.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Where Input Enters                                 │
//! │                                                                         │
//! │  Catalog fetch (JSON)          User keystrokes (JSON / text)           │
//! │  price: "50.00" | 50 | null    quantity: "3" | 3.7 | -1 | ""           │
//! │           │                              │                              │
//! │           └──────────────┬───────────────┘                              │
//! │                          ▼                                              │
//! │              THIS MODULE: coerce, round to cents, floor at 0           │
//! │                          │                                              │
//! │                          ▼                                              │
//! │  Money ≥ 0, u32 quantities ─── everything downstream trusts these      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here fails. Malformed values become zero and a data-integrity
//! warning is logged; the end user never sees them.

use serde_json::Value;
use tracing::warn;

use crate::money::Money;

/// Reads a number or numeric string as cents, keeping the sign.
///
/// Empty strings and `null` are treated as "not entered" and give zero
/// without a warning.
fn signed_cents(value: &Value, field: &str) -> Money {
    let parsed = match value {
        Value::Null => return Money::zero(),
        Value::String(s) if s.trim().is_empty() => return Money::zero(),
        Value::Number(n) => Money::parse_decimal(&n.to_string()),
        Value::String(s) => Money::parse_decimal(s),
        Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    };

    parsed.unwrap_or_else(|| {
        warn!(field, raw = %value, "Non-numeric amount coerced to zero");
        Money::zero()
    })
}

/// Sanitizes a price or tender amount: rounded to cents, never negative.
///
/// ## Example
/// ```rust
/// use serde_json::json;
/// use splash_core::money::Money;
/// use splash_core::sanitize;
///
/// assert_eq!(sanitize::amount(&json!("50.00"), "price"), Money::from_cents(5000));
/// assert_eq!(sanitize::amount(&json!(-3), "price"), Money::zero());
/// assert_eq!(sanitize::amount(&json!("abc"), "price"), Money::zero());
/// ```
pub fn amount(value: &Value, field: &str) -> Money {
    let money = signed_cents(value, field);
    if money.is_negative() {
        warn!(field, raw = %value, "Negative amount coerced to zero");
        return Money::zero();
    }
    money
}

/// Sanitizes a user-requested amount that may legitimately be negative
/// or oversized (the discount field). Only malformed input becomes zero;
/// range handling is left to the caller (see [`crate::totals::validate_discount`]).
pub fn requested_amount(value: &Value, field: &str) -> Money {
    signed_cents(value, field)
}

/// Sanitizes a quantity: fractional values truncate, negatives and
/// malformed input become zero, values beyond `u32::MAX` saturate.
///
/// ## Example
/// ```rust
/// use serde_json::json;
/// use splash_core::sanitize;
///
/// assert_eq!(sanitize::quantity(&json!(3), "quantity"), 3);
/// assert_eq!(sanitize::quantity(&json!("2.9"), "quantity"), 2);
/// assert_eq!(sanitize::quantity(&json!(-1), "quantity"), 0);
/// assert_eq!(sanitize::quantity(&json!(""), "quantity"), 0);
/// ```
pub fn quantity(value: &Value, field: &str) -> u32 {
    let parsed = match value {
        Value::Null => return 0,
        Value::String(s) if s.trim().is_empty() => return 0,
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    };

    match parsed {
        Some(q) if q.is_finite() && q >= 0.0 => {
            // `as` saturates at u32::MAX
            q.trunc() as u32
        }
        Some(q) if q.is_finite() => {
            warn!(field, raw = %value, "Negative quantity coerced to zero");
            0
        }
        _ => {
            warn!(field, raw = %value, "Non-numeric quantity coerced to zero");
            0
        }
    }
}

/// Reads a catalog id that may arrive as a number or a numeric string.
///
/// Returns `None` (and logs) when no integer id can be read.
pub fn item_id(value: &Value) -> Option<i64> {
    let id = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    if id.is_none() {
        warn!(raw = %value, "Catalog entry without a usable id skipped");
    }
    id
}

/// Trims free text and drops it entirely when blank.
pub fn text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Unit Tests
// =============================================================================
