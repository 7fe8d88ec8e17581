//! # Order Submission Payload
//!
//! The JSON body sent to the order-creation collaborator:
//!
//! ```json
//! {
//!   "user_id": 12,
//!   "description": "Family pass",
//!   "tickets": [{ "ticket_type_id": 1, "quantity": 3 }],
//!   "meals": [{ "meal_id": 4, "quantity": 2, "price_at_order": 12.5 }],
//!   "payments": [{ "method": "cash", "amount": 175.0 }]
//! }
//! ```
//!
//! `tickets` and `meals` are left out when empty. Meal prices are frozen at
//! order time; ticket prices are resolved by the backend from the type id.

use serde::{Deserialize, Serialize};
use tracing::warn;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::price_table::PriceTable;
use crate::reconciler::PaymentReconciler;
use crate::selection::Selection;
use crate::totals::OrderTotals;
use crate::types::{ItemKind, ItemRef, PaymentEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TicketOrderLine {
    pub ticket_type_id: i64,
    pub quantity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MealOrderLine {
    pub meal_id: i64,
    pub quantity: u32,
    pub price_at_order: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderSubmission {
    pub user_id: i64,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub tickets: Option<Vec<TicketOrderLine>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub meals: Option<Vec<MealOrderLine>>,
    pub payments: Vec<PaymentEntry>,
}

impl OrderSubmission {
    /// Builds the payload for a balanced order.
    ///
    /// ## Errors
    /// - [`CoreError::EmptyOrder`] when nothing is selected
    /// - [`CoreError::NotBalanced`] when `|remaining| > 0.01`
    pub fn build(
        user_id: i64,
        description: &str,
        table: &PriceTable,
        selection: &Selection,
        totals: &OrderTotals,
        reconciler: &PaymentReconciler,
    ) -> CoreResult<Self> {
        if selection.is_empty() {
            return Err(CoreError::EmptyOrder);
        }
        reconciler.ensure_balanced()?;

        let tickets: Vec<TicketOrderLine> = selection
            .lines(ItemKind::Ticket)
            .map(|line| TicketOrderLine {
                ticket_type_id: line.item_id,
                quantity: line.quantity,
            })
            .collect();

        let meals: Vec<MealOrderLine> = selection
            .lines(ItemKind::Meal)
            .map(|line| {
                let price_at_order = table.price(ItemRef::meal(line.item_id)).unwrap_or_else(|| {
                    warn!(meal_id = line.item_id, "Meal missing from catalog, submitting price 0");
                    Money::zero()
                });
                MealOrderLine {
                    meal_id: line.item_id,
                    quantity: line.quantity,
                    price_at_order,
                }
            })
            .collect();

        Ok(OrderSubmission {
            user_id,
            description: description.trim().to_string(),
            tickets: (!tickets.is_empty()).then_some(tickets),
            meals: (!meals.is_empty()).then_some(meals),
            payments: reconciler.payments(totals.discount_amount),
        })
    }
}

/// What the order-creation collaborator answers on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SubmittedOrder {
    /// Only used for display and the receipt.
    pub order_id: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
