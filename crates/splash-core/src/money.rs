//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  A checkout screen doing float math:                                   │
//! │    120.10 + 79.90 = 199.99999999999997  ❌ "remaining 0.00000000003"    │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    12010 + 7990 = 20000 cents           ✅ remaining is exactly 0       │
//! │                                                                         │
//! │  The 0.01 confirm tolerance becomes "at most one cent".                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Decimal text only exists at the edges: [`Money::parse_decimal`] on the
//! way in, [`fmt::Display`] on the way out. Serialized, `Money` is always a
//! JSON number of major units (`150.0`), so payloads, receipts and reports
//! never mix cents with currency units.
//!
//! ## Usage
//! ```rust
//! use splash_core::money::Money;
//!
//! let ticket = Money::from_cents(5000); // 50.00
//! let three: Money = ticket * 3u32;
//! assert_eq!(three.to_string(), "150.00");
//!
//! assert_eq!(Money::parse_decimal("12.345"), Some(Money::from_cents(1235)));
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: a requested discount or a remaining balance can be
///   negative; stored prices and tenders never are (the sanitizer ensures it)
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Saturating arithmetic**: absurd catalog prices or quantities pin at
///   the i64 bounds instead of overflowing
///
/// ## Where Money Flows
/// ```text
/// CatalogItem.unit_price ──► line total ──► ticket/meal subtotal
///                                                │
///                          discount (clamped) ───┤
///                                                ▼
///                                           final_total ──► tenders
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, TS)]
#[ts(export)]
pub struct Money(#[ts(type = "number")] i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use splash_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.saturating_abs())
    }

    /// Floors the value at zero. Negative amounts become zero.
    ///
    /// ```rust
    /// use splash_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(-550).non_negative(), Money::zero());
    /// assert_eq!(Money::from_cents(550).non_negative().cents(), 550);
    /// ```
    #[inline]
    pub const fn non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            Money(self.0)
        }
    }

    /// Clamps into `[min, max]`. If `max < min`, `min` wins.
    #[inline]
    pub fn clamp_to(self, min: Money, max: Money) -> Money {
        if self < min {
            min
        } else if self > max {
            max.max(min)
        } else {
            self
        }
    }

    /// Multiplies a unit price by a quantity.
    ///
    /// Saturates instead of overflowing; a quantity large enough to matter
    /// here is already malformed input.
    ///
    /// ```rust
    /// use splash_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(5000);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 15000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0.saturating_mul(qty as i64))
    }

    /// Converts to a decimal number of major units, for JSON output only.
    #[inline]
    pub fn to_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Converts a float to cents, rounding half away from zero.
    ///
    /// Returns `None` for NaN, infinities and values outside the i64 range.
    pub fn from_decimal(value: f64) -> Option<Money> {
        if !value.is_finite() {
            return None;
        }
        let cents = (value * 100.0).round();
        if cents > i64::MAX as f64 || cents < i64::MIN as f64 {
            return None;
        }
        Some(Money(cents as i64))
    }

    /// Parses decimal text ("150", "-12.5", "12.345") into cents.
    ///
    /// Digits after the second decimal place round half away from zero,
    /// computed on the text itself so "12.345" is 12.35 and not the
    /// 12.34 a float conversion would give. Exponent notation falls back to
    /// [`Money::from_decimal`].
    ///
    /// ```rust
    /// use splash_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal(" 50.5 "), Some(Money::from_cents(5050)));
    /// assert_eq!(Money::parse_decimal("-3"), Some(Money::from_cents(-300)));
    /// assert_eq!(Money::parse_decimal("abc"), None);
    /// ```
    pub fn parse_decimal(text: &str) -> Option<Money> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if text.contains(['e', 'E']) {
            return text.parse::<f64>().ok().and_then(Money::from_decimal);
        }

        let (negative, digits) = match text.as_bytes()[0] {
            b'-' => (true, &text[1..]),
            b'+' => (false, &text[1..]),
            _ => (false, text),
        };

        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return None;
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }

        let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
        let mut frac_digits = frac.bytes().map(|b| (b - b'0') as i64);
        let tenths = frac_digits.next().unwrap_or(0);
        let hundredths = frac_digits.next().unwrap_or(0);
        let round_up = frac_digits.next().unwrap_or(0) >= 5;

        let mut cents = whole
            .checked_mul(100)?
            .checked_add(tenths * 10 + hundredths)?;
        if round_up {
            cents = cents.checked_add(1)?;
        }

        Some(Money(if negative { -cents } else { cents }))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Two decimals, no currency symbol: "150.00", "-5.50".
///
/// Currency symbols are a display concern of the checkout layer.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(self.0.saturating_neg())
    }
}

/// Multiplication by a line quantity.
impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Serde
// =============================================================================

/// A JSON number of major units: `150.0`, `12.35`.
impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.to_decimal())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Money::from_decimal(value)
            .ok_or_else(|| serde::de::Error::custom(format!("amount out of range: {value}")))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(15000).to_string(), "150.00");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::from_cents(-5).to_string(), "-0.05");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((b - a).cents(), -500);
        assert_eq!((a * 3u32).cents(), 3000);
        assert_eq!((-a).cents(), -1000);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let max = Money::from_cents(i64::MAX);
        assert_eq!(max + max, max);
        assert_eq!(-max - max, Money::from_cents(i64::MIN));
        assert_eq!(-Money::from_cents(i64::MIN), max);
        assert_eq!(Money::from_cents(i64::MIN).abs(), max);

        let mut total = max;
        total += Money::from_cents(1);
        assert_eq!(total, max);

        let lines = [max, max, Money::from_cents(500)];
        assert_eq!(lines.iter().sum::<Money>(), max);
    }

    #[test]
    fn test_sum() {
        let amounts = [Money::from_cents(12010), Money::from_cents(7990)];
        let total: Money = amounts.iter().sum();
        assert_eq!(total, Money::from_cents(20000));
    }

    #[test]
    fn test_clamp_to() {
        let max = Money::from_cents(10000);
        assert_eq!(Money::from_cents(15000).clamp_to(Money::zero(), max), max);
        assert_eq!(Money::from_cents(-1).clamp_to(Money::zero(), max), Money::zero());
        assert_eq!(
            Money::from_cents(2500).clamp_to(Money::zero(), max),
            Money::from_cents(2500)
        );
        // Degenerate range collapses to the lower bound
        assert_eq!(
            Money::from_cents(5).clamp_to(Money::zero(), Money::from_cents(-1)),
            Money::zero()
        );
    }

    #[test]
    fn test_multiply_quantity_saturates() {
        let huge = Money::from_cents(i64::MAX / 2);
        assert_eq!(huge.multiply_quantity(4).cents(), i64::MAX);
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(Money::parse_decimal("50"), Some(Money::from_cents(5000)));
        assert_eq!(Money::parse_decimal("50.00"), Some(Money::from_cents(5000)));
        assert_eq!(Money::parse_decimal(".5"), Some(Money::from_cents(50)));
        assert_eq!(Money::parse_decimal("7."), Some(Money::from_cents(700)));
        assert_eq!(Money::parse_decimal("+1.01"), Some(Money::from_cents(101)));
        assert_eq!(Money::parse_decimal("-12.5"), Some(Money::from_cents(-1250)));
        assert_eq!(Money::parse_decimal("1e2"), Some(Money::from_cents(10000)));

        assert_eq!(Money::parse_decimal(""), None);
        assert_eq!(Money::parse_decimal("."), None);
        assert_eq!(Money::parse_decimal("-"), None);
        assert_eq!(Money::parse_decimal("1,50"), None);
        assert_eq!(Money::parse_decimal("NaN"), None);
    }

    #[test]
    fn test_parse_decimal_rounds_on_text() {
        // 12.345 as f64 is 12.3449999..., the text rule still rounds up
        assert_eq!(Money::parse_decimal("12.345"), Some(Money::from_cents(1235)));
        assert_eq!(Money::parse_decimal("12.344"), Some(Money::from_cents(1234)));
        assert_eq!(Money::parse_decimal("-0.005"), Some(Money::from_cents(-1)));
    }

    #[test]
    fn test_from_decimal() {
        assert_eq!(Money::from_decimal(150.0), Some(Money::from_cents(15000)));
        assert_eq!(Money::from_decimal(0.1 + 0.2), Some(Money::from_cents(30)));
        assert_eq!(Money::from_decimal(f64::NAN), None);
        assert_eq!(Money::from_decimal(f64::INFINITY), None);
    }

    #[test]
    fn test_serializes_as_major_units() {
        #[derive(Serialize, Deserialize)]
        struct Wire {
            amount: Money,
        }

        let json = serde_json::to_string(&Wire {
            amount: Money::from_cents(12035),
        })
        .unwrap();
        assert_eq!(json, r#"{"amount":120.35}"#);

        let back: Wire = serde_json::from_str(r#"{"amount":80.1}"#).unwrap();
        assert_eq!(back.amount, Money::from_cents(8010));

        assert!(serde_json::from_str::<Wire>(r#"{"amount":1e300}"#).is_err());
    }
}
