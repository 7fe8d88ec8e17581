//! # Checkout Session
//!
//! The order being rung up: selection, discount, tenders, description.
//!
//! ## Session Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Session Operations                                   │
//! │                                                                         │
//! │  Cashier Action            Session Method          Effect               │
//! │  ──────────────            ──────────────          ──────               │
//! │                                                                         │
//! │  Change quantity ────────► set_quantity() ───────► recompute totals    │
//! │                                                     single tender      │
//! │                                                     follows total      │
//! │                                                                         │
//! │  Enter discount ─────────► set_discount() ───────► clamp, recompute    │
//! │                                                                         │
//! │  Tick payment method ────► select_method() ──────► reconciler state    │
//! │                                                     transition         │
//! │                                                                         │
//! │  Type tender amount ─────► set_amount() ─────────► remaining updates   │
//! │                                                                         │
//! │  Confirm succeeded ──────► clear() ──────────────► back to empty       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutation recomputes the totals synchronously; there is no stale
//! total to read.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use splash_core::aggregator::PricedLine;
use splash_core::types::{ItemRef, PaymentEntry, PaymentMethod};
use splash_core::{
    compute, price_order, sanitize, validate_discount, CoreResult, Money, OrderSubmission,
    OrderTotals, PaymentReconciler, PaymentStatus, PriceTable, PricedOrder, Selection,
    ValidationError,
};
use tracing::debug;
use uuid::Uuid;

/// One checkout in progress.
///
/// ## Invariants
/// - `discount` is always within `[0, ticket_subtotal + meal_subtotal]`
/// - `totals` always reflects the current selection and discount
/// - the reconciler's total is always `totals.final_total`
/// - `revision` changes on every successful cashier edit
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    id: Uuid,
    revision: u64,
    created_at: DateTime<Utc>,
    table: Arc<PriceTable>,
    selection: Selection,
    discount: Money,
    description: String,
    totals: OrderTotals,
    reconciler: PaymentReconciler,
}

impl CheckoutSession {
    pub fn new(table: Arc<PriceTable>) -> Self {
        let session = CheckoutSession {
            id: Uuid::new_v4(),
            revision: 0,
            created_at: Utc::now(),
            table,
            selection: Selection::new(),
            discount: Money::zero(),
            description: String::new(),
            totals: OrderTotals::default(),
            reconciler: PaymentReconciler::new(Money::zero()),
        };
        debug!(session_id = %session.id, "Checkout session opened");
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Edit counter. A payload built at revision `n` describes the session
    /// exactly as long as the revision is still `n`.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn table(&self) -> &Arc<PriceTable> {
        &self.table
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn discount(&self) -> Money {
        self.discount
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn totals(&self) -> OrderTotals {
        self.totals
    }

    pub fn reconciler(&self) -> &PaymentReconciler {
        &self.reconciler
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn recompute(&mut self) {
        self.totals = compute(&self.table, &self.selection, self.discount);
        // a shrinking selection can push a stored discount over the new cap
        self.discount = self.totals.discount_amount;
        self.reconciler.set_total(self.totals.final_total);
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Sets the quantity of one item; 0 removes the line.
    ///
    /// ## Errors
    /// New lines must reference a known, non-archived catalog item. Lines
    /// already in the selection can always be edited or removed.
    pub fn set_quantity(&mut self, item: ItemRef, quantity: u32) -> Result<(), ValidationError> {
        if quantity > 0 && !self.selection.contains(item) {
            match self.table.get(item) {
                None => return Err(ValidationError::UnknownItem { item }),
                Some(entry) if entry.archived => return Err(ValidationError::ArchivedItem { item }),
                Some(_) => {}
            }
        }
        self.selection.set_quantity(item, quantity);
        self.recompute();
        self.touch();
        debug!(session_id = %self.id, %item, quantity, final_total = %self.totals.final_total, "Quantity set");
        Ok(())
    }

    /// Quantity as typed into the UI field.
    pub fn set_quantity_raw(&mut self, item: ItemRef, raw: &Value) -> Result<(), ValidationError> {
        self.set_quantity(item, sanitize::quantity(raw, "quantity"))
    }

    // -------------------------------------------------------------------------
    // Discount
    // -------------------------------------------------------------------------

    /// Stores the discount clamped to `[0, subtotal]` and returns the
    /// stored value.
    pub fn set_discount(&mut self, requested: Money) -> Money {
        self.discount = validate_discount(
            requested,
            self.totals.ticket_subtotal,
            self.totals.meal_subtotal,
        );
        self.recompute();
        self.touch();
        debug!(session_id = %self.id, %requested, applied = %self.discount, "Discount set");
        self.discount
    }

    pub fn set_discount_raw(&mut self, raw: &Value) -> Money {
        self.set_discount(sanitize::requested_amount(raw, "discount"))
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = description.to_string();
        self.touch();
    }

    // -------------------------------------------------------------------------
    // Payments
    // -------------------------------------------------------------------------

    pub fn select_method(&mut self, method: PaymentMethod) -> Result<(), ValidationError> {
        self.reconciler.select(method)?;
        self.touch();
        Ok(())
    }

    /// Returns whether the method was selected.
    pub fn deselect_method(&mut self, method: PaymentMethod) -> bool {
        let removed = self.reconciler.deselect(method);
        if removed {
            self.touch();
        }
        removed
    }

    /// Returns whether the method is selected afterwards.
    pub fn toggle_method(&mut self, method: PaymentMethod) -> Result<bool, ValidationError> {
        let selected = self.reconciler.toggle(method)?;
        self.touch();
        Ok(selected)
    }

    pub fn set_amount(&mut self, method: PaymentMethod, amount: Money) -> Result<(), ValidationError> {
        self.reconciler.set_amount(method, amount)?;
        self.touch();
        Ok(())
    }

    pub fn set_amount_raw(&mut self, method: PaymentMethod, raw: &Value) -> Result<(), ValidationError> {
        self.set_amount(method, sanitize::amount(raw, "amount"))
    }

    pub fn status(&self) -> PaymentStatus {
        self.reconciler.status()
    }

    /// Confirm gating: something selected and `|remaining| ≤ 0.01`.
    pub fn can_confirm(&self) -> bool {
        !self.selection.is_empty() && self.reconciler.is_balanced()
    }

    /// Tender payments plus the discount entry, as submitted.
    pub fn payments(&self) -> Vec<PaymentEntry> {
        self.reconciler.payments(self.totals.discount_amount)
    }

    // -------------------------------------------------------------------------
    // Output
    // -------------------------------------------------------------------------

    /// Totals together with the priced lines (for receipts and display).
    pub fn priced(&self) -> PricedOrder {
        price_order(&self.table, &self.selection, self.discount)
    }

    /// Order payload for the backend.
    ///
    /// ## Errors
    /// - `EmptyOrder` when nothing is selected
    /// - `NotBalanced` when the tenders do not cover the total
    pub fn build_submission(&self, user_id: i64, fallback_description: &str) -> CoreResult<OrderSubmission> {
        let description = sanitize::text(Some(&self.description))
            .unwrap_or_else(|| fallback_description.to_string());
        OrderSubmission::build(
            user_id,
            &description,
            &self.table,
            &self.selection,
            &self.totals,
            &self.reconciler,
        )
    }

    /// Read model for the checkout screen.
    pub fn snapshot(&self) -> SessionSnapshot {
        let priced = self.priced();
        SessionSnapshot {
            session_id: self.id,
            created_at: self.created_at,
            lines: priced
                .tickets
                .lines
                .into_iter()
                .chain(priced.meals.lines)
                .collect(),
            totals: self.totals,
            payments: self.payments(),
            status: self.status(),
            can_confirm: self.can_confirm(),
            description: self.description.clone(),
        }
    }

    /// Resets selection, discount, tenders and description. Keeps the
    /// price table; starts a new session id.
    pub fn clear(&mut self) {
        debug!(session_id = %self.id, "Checkout session cleared");
        self.id = Uuid::new_v4();
        self.created_at = Utc::now();
        self.selection.clear();
        self.discount = Money::zero();
        self.description.clear();
        self.reconciler.clear();
        self.recompute();
        self.touch();
    }

    /// Clears the session only if nothing was edited since `revision`.
    /// Returns whether it cleared.
    pub fn clear_if_unchanged(&mut self, revision: u64) -> bool {
        if self.revision != revision {
            return false;
        }
        self.clear();
        true
    }

    /// Swaps in a freshly loaded catalog. Existing lines are repriced; the
    /// revision is kept since the cashier changed nothing.
    pub fn replace_table(&mut self, table: Arc<PriceTable>) {
        self.table = table;
        self.recompute();
    }
}

/// What the checkout screen renders.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<PricedLine>,
    pub totals: OrderTotals,
    pub payments: Vec<PaymentEntry>,
    pub status: PaymentStatus,
    pub can_confirm: bool,
    pub description: String,
}

/// Shared checkout session.
///
/// ## Thread Safety
/// `Arc<Mutex<CheckoutSession>>`. Closures passed to `with_session*` run
/// under the lock and must not await.
#[derive(Debug, Clone)]
pub struct SessionState {
    session: Arc<Mutex<CheckoutSession>>,
}

impl SessionState {
    pub fn new(table: Arc<PriceTable>) -> Self {
        SessionState {
            session: Arc::new(Mutex::new(CheckoutSession::new(table))),
        }
    }

    /// Executes a function with read access to the session.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let totals = state.with_session(|s| s.totals());
    /// ```
    pub fn with_session<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&CheckoutSession) -> R,
    {
        // a panic inside a closure leaves the session consistent: every
        // mutation recomputes before returning
        let session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        f(&session)
    }

    /// Executes a function with write access to the session.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// state.with_session_mut(|s| s.set_quantity(ItemRef::ticket(1), 3))?;
    /// ```
    pub fn with_session_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut CheckoutSession) -> R,
    {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut session)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use splash_core::types::{CatalogItem, ItemKind};
    use splash_core::ReconcilerState;

    fn cents(c: i64) -> Money {
        Money::from_cents(c)
    }

    fn item(kind: ItemKind, id: i64, price: i64, archived: bool) -> CatalogItem {
        CatalogItem {
            id,
            kind,
            category: Some("Entry".to_string()),
            subcategory: None,
            name: None,
            unit_price: cents(price),
            archived,
        }
    }

    fn session() -> CheckoutSession {
        let table = PriceTable::from_items([
            item(ItemKind::Ticket, 1, 5000, false),
            item(ItemKind::Ticket, 2, 10000, false),
            item(ItemKind::Ticket, 9, 2500, true),
            item(ItemKind::Meal, 1, 1250, false),
        ]);
        CheckoutSession::new(Arc::new(table))
    }

    #[test]
    fn test_single_item_cash_autofill() {
        let mut s = session();
        s.set_quantity(ItemRef::ticket(1), 3).unwrap();
        assert_eq!(s.totals().ticket_subtotal, cents(15000));
        assert_eq!(s.totals().final_total, cents(15000));

        s.select_method(PaymentMethod::Cash).unwrap();
        assert_eq!(s.reconciler().amount(PaymentMethod::Cash), Some(cents(15000)));
        assert!(s.can_confirm());
    }

    #[test]
    fn test_single_tender_follows_quantity_edits() {
        let mut s = session();
        s.set_quantity(ItemRef::ticket(1), 1).unwrap();
        s.select_method(PaymentMethod::Cash).unwrap();

        s.set_quantity(ItemRef::meal(1), 2).unwrap();
        assert_eq!(s.reconciler().amount(PaymentMethod::Cash), Some(cents(7500)));
        assert!(s.can_confirm());
    }

    #[test]
    fn test_discount_over_cap_is_clamped() {
        let mut s = session();
        s.set_quantity(ItemRef::ticket(2), 1).unwrap();

        assert_eq!(s.set_discount(cents(15000)), cents(10000));
        assert_eq!(s.totals().final_total, Money::zero());
        assert_eq!(s.set_discount(cents(-500)), Money::zero());
    }

    #[test]
    fn test_discount_follows_shrinking_selection() {
        let mut s = session();
        s.set_quantity(ItemRef::ticket(1), 2).unwrap();
        s.set_discount(cents(8000));

        s.set_quantity(ItemRef::ticket(1), 1).unwrap();
        assert_eq!(s.discount(), cents(5000));
        assert_eq!(s.totals().final_total, Money::zero());
    }

    #[test]
    fn test_multi_method_split() {
        let mut s = session();
        s.set_quantity(ItemRef::ticket(2), 2).unwrap();
        s.select_method(PaymentMethod::Cash).unwrap();
        s.select_method(PaymentMethod::MobileWallet).unwrap();
        assert_eq!(s.status().state, ReconcilerState::MultipleMethodsSelected);
        assert!(!s.can_confirm());

        s.set_amount(PaymentMethod::Cash, cents(12000)).unwrap();
        s.set_amount_raw(PaymentMethod::MobileWallet, &json!("80.00")).unwrap();
        assert_eq!(s.status().remaining, Money::zero());
        assert!(s.can_confirm());
    }

    #[test]
    fn test_underpayment_blocks_confirm() {
        let mut s = session();
        s.set_quantity(ItemRef::ticket(2), 2).unwrap();
        s.select_method(PaymentMethod::Cash).unwrap();
        s.select_method(PaymentMethod::BankA).unwrap();
        s.set_amount(PaymentMethod::Cash, cents(15000)).unwrap();

        assert_eq!(s.status().remaining, cents(5000));
        assert!(!s.can_confirm());
        assert!(s.build_submission(12, "").is_err());
    }

    #[test]
    fn test_new_unknown_or_archived_items_rejected() {
        let mut s = session();
        assert!(matches!(
            s.set_quantity(ItemRef::ticket(77), 1),
            Err(ValidationError::UnknownItem { .. })
        ));
        assert!(matches!(
            s.set_quantity(ItemRef::ticket(9), 1),
            Err(ValidationError::ArchivedItem { .. })
        ));
        assert!(s.selection().is_empty());
    }

    #[test]
    fn test_line_archived_after_selection_stays_editable() {
        let mut s = session();
        s.set_quantity(ItemRef::ticket(1), 1).unwrap();

        let table = PriceTable::from_items([item(ItemKind::Ticket, 1, 5000, true)]);
        s.replace_table(Arc::new(table));

        s.set_quantity(ItemRef::ticket(1), 4).unwrap();
        assert_eq!(s.totals().ticket_subtotal, cents(20000));
        s.set_quantity(ItemRef::ticket(1), 0).unwrap();
        assert!(s.selection().is_empty());
    }

    #[test]
    fn test_item_removed_from_catalog_contributes_zero() {
        let mut s = session();
        s.set_quantity(ItemRef::ticket(1), 2).unwrap();
        s.set_quantity(ItemRef::meal(1), 1).unwrap();

        let table = PriceTable::from_items([item(ItemKind::Meal, 1, 1250, false)]);
        s.replace_table(Arc::new(table));

        assert_eq!(s.totals().ticket_subtotal, Money::zero());
        assert_eq!(s.totals().final_total, cents(1250));
    }

    #[test]
    fn test_raw_inputs_are_sanitized() {
        let mut s = session();
        s.set_quantity_raw(ItemRef::ticket(1), &json!("2.7")).unwrap();
        assert_eq!(s.selection().quantity(ItemRef::ticket(1)), 2);

        s.set_quantity_raw(ItemRef::ticket(1), &json!("abc")).unwrap();
        assert!(s.selection().is_empty());

        s.set_quantity(ItemRef::ticket(1), 1).unwrap();
        assert_eq!(s.set_discount_raw(&json!("bogus")), Money::zero());
    }

    #[test]
    fn test_submission_uses_fallback_description() {
        let mut s = session();
        s.set_quantity(ItemRef::ticket(1), 1).unwrap();
        s.select_method(PaymentMethod::Cash).unwrap();
        s.set_description("   ");

        let order = s.build_submission(12, "Walk-in").unwrap();
        assert_eq!(order.description, "Walk-in");
        assert_eq!(order.payments, vec![PaymentEntry::new(PaymentMethod::Cash, cents(5000))]);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut s = session();
        let first_id = s.id();
        s.set_quantity(ItemRef::ticket(1), 2).unwrap();
        s.set_discount(cents(1000));
        s.select_method(PaymentMethod::Cash).unwrap();
        s.set_description("Birthday");

        s.clear();
        assert_ne!(s.id(), first_id);
        assert!(s.selection().is_empty());
        assert_eq!(s.discount(), Money::zero());
        assert_eq!(s.totals(), OrderTotals::default());
        assert_eq!(s.status().state, ReconcilerState::NoMethodSelected);
        assert_eq!(s.description(), "");
        assert!(!s.table().is_empty());
    }

    #[test]
    fn test_revision_tracks_edits() {
        let mut s = session();
        let start = s.revision();

        assert!(s.set_quantity(ItemRef::ticket(77), 1).is_err());
        assert!(s.select_method(PaymentMethod::Discount).is_err());
        assert!(!s.deselect_method(PaymentMethod::Cash));
        assert_eq!(s.revision(), start);

        s.set_quantity(ItemRef::ticket(1), 1).unwrap();
        let after_quantity = s.revision();
        assert_ne!(after_quantity, start);

        s.select_method(PaymentMethod::Cash).unwrap();
        assert_ne!(s.revision(), after_quantity);

        let before_reload = s.revision();
        let same_table = Arc::clone(s.table());
        s.replace_table(same_table);
        assert_eq!(s.revision(), before_reload);
    }

    #[test]
    fn test_clear_if_unchanged() {
        let mut s = session();
        s.set_quantity(ItemRef::ticket(1), 1).unwrap();
        let submitted_at = s.revision();

        s.set_quantity(ItemRef::meal(1), 1).unwrap();
        assert!(!s.clear_if_unchanged(submitted_at));
        assert_eq!(s.selection().quantity(ItemRef::meal(1)), 1);

        let current = s.revision();
        assert!(s.clear_if_unchanged(current));
        assert!(s.selection().is_empty());
    }

    #[test]
    fn test_snapshot() {
        let mut s = session();
        s.set_quantity(ItemRef::ticket(1), 1).unwrap();
        s.set_quantity(ItemRef::meal(1), 2).unwrap();

        let snap = s.snapshot();
        assert_eq!(snap.lines.len(), 2);
        assert_eq!(snap.totals.final_total, cents(7500));
        assert!(!snap.can_confirm);
    }

    #[test]
    fn test_session_state_shared() {
        let state = SessionState::new(Arc::new(PriceTable::from_items([item(
            ItemKind::Ticket,
            1,
            5000,
            false,
        )])));
        let other = state.clone();

        state
            .with_session_mut(|s| s.set_quantity(ItemRef::ticket(1), 2))
            .unwrap();
        assert_eq!(other.with_session(|s| s.totals().final_total), cents(10000));
    }
}
