//! # Order Totals
//!
//! Ticket subtotal + meal subtotal, minus a capped discount.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Totals Pipeline                                    │
//! │                                                                         │
//! │  tickets ──► aggregate ──► ticket_subtotal ──┐                         │
//! │                                              ├──► subtotal             │
//! │  meals ────► aggregate ──► meal_subtotal ────┘        │                │
//! │                                                       ▼                │
//! │  requested discount ──► validate_discount ──► clamp(d, 0, subtotal)    │
//! │                                                       │                │
//! │                                                       ▼                │
//! │                        final_total = max(0, subtotal − discount)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is pure: the same inputs always give the same totals.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::aggregator::{aggregate, LineSummary};
use crate::money::Money;
use crate::price_table::PriceTable;
use crate::selection::Selection;
use crate::types::ItemKind;

/// Derived totals of one order. Recomputed, never edited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderTotals {
    pub ticket_subtotal: Money,
    pub meal_subtotal: Money,
    /// Always within `[0, ticket_subtotal + meal_subtotal]`.
    pub discount_amount: Money,
    /// Always `>= 0`.
    pub final_total: Money,
}

impl OrderTotals {
    /// Combines subtotals with a requested discount.
    ///
    /// Negative subtotals (impossible after sanitization) are floored at zero
    /// before use.
    ///
    /// ## Example
    /// ```rust
    /// use splash_core::money::Money;
    /// use splash_core::totals::OrderTotals;
    ///
    /// let totals = OrderTotals::new(
    ///     Money::from_cents(10000),
    ///     Money::zero(),
    ///     Money::from_cents(15000), // over the cap
    /// );
    /// assert_eq!(totals.discount_amount, Money::from_cents(10000));
    /// assert_eq!(totals.final_total, Money::zero());
    /// ```
    pub fn new(ticket_subtotal: Money, meal_subtotal: Money, requested_discount: Money) -> Self {
        let ticket_subtotal = ticket_subtotal.non_negative();
        let meal_subtotal = meal_subtotal.non_negative();
        let discount_amount = validate_discount(requested_discount, ticket_subtotal, meal_subtotal);
        let final_total = (ticket_subtotal + meal_subtotal - discount_amount).non_negative();

        OrderTotals {
            ticket_subtotal,
            meal_subtotal,
            discount_amount,
            final_total,
        }
    }

    /// Subtotal before discount.
    #[inline]
    pub fn subtotal(&self) -> Money {
        self.ticket_subtotal + self.meal_subtotal
    }
}

/// Clamps a requested discount into `[0, ticket_subtotal + meal_subtotal]`.
///
/// Call this at the point of entry (every keystroke) so a stored discount is
/// always valid.
///
/// ```rust
/// use splash_core::money::Money;
/// use splash_core::totals::validate_discount;
///
/// let t = Money::from_cents(8000);
/// let m = Money::from_cents(2000);
/// assert_eq!(validate_discount(Money::from_cents(-500), t, m), Money::zero());
/// assert_eq!(validate_discount(Money::from_cents(2500), t, m), Money::from_cents(2500));
/// assert_eq!(validate_discount(Money::from_cents(99999), t, m), Money::from_cents(10000));
/// ```
pub fn validate_discount(requested: Money, ticket_subtotal: Money, meal_subtotal: Money) -> Money {
    let cap = (ticket_subtotal + meal_subtotal).non_negative();
    requested.clamp_to(Money::zero(), cap)
}

/// Totals plus the priced lines behind them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PricedOrder {
    pub totals: OrderTotals,
    pub tickets: LineSummary,
    pub meals: LineSummary,
}

/// Prices a whole selection.
pub fn price_order(table: &PriceTable, selection: &Selection, requested_discount: Money) -> PricedOrder {
    let tickets = aggregate(table, ItemKind::Ticket, selection.quantities(ItemKind::Ticket));
    let meals = aggregate(table, ItemKind::Meal, selection.quantities(ItemKind::Meal));
    let totals = OrderTotals::new(tickets.subtotal, meals.subtotal, requested_discount);

    PricedOrder {
        totals,
        tickets,
        meals,
    }
}

/// Totals of a selection. Pure and idempotent.
pub fn compute(table: &PriceTable, selection: &Selection, requested_discount: Money) -> OrderTotals {
    price_order(table, selection, requested_discount).totals
}

// =============================================================================
// Unit Tests
// =============================================================================
