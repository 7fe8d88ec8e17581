//! # Payment Reconciler
//!
//! Tracks the tenders chosen for an order against its final total.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   NoMethodSelected ── select(m) ──► SingleMethodSelected                │
//! │          ▲                           amount(m) = final_total (locked)  │
//! │          │                                 │                            │
//! │   deselect last                      select(m2)                         │
//! │          │                                 ▼                            │
//! │          │                       MultipleMethodsSelected                │
//! │          │                        all amounts reset to 0, editable     │
//! │          │                                 │                            │
//! │          │                  deselect until one is left                  │
//! │          │                                 ▼                            │
//! │          └──────────────────── SingleMethodSelected (re-filled, locked) │
//! │                                                                         │
//! │  `discount` is never a tender: it lowers final_total upstream and is   │
//! │  only appended to the submitted payment list.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Confirm Gating
//! `remaining = final_total − entered_total`; confirmation needs
//! `|remaining| ≤ 0.01` ([`CONFIRM_TOLERANCE`]). Below `-0.01` the order is
//! overpaid, which also blocks confirmation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{PaymentEntry, PaymentMethod};

/// Largest |remaining| that still allows confirmation: one cent.
pub const CONFIRM_TOLERANCE: Money = Money::from_cents(1);

/// How many tenders are selected. Discount never counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReconcilerState {
    NoMethodSelected,
    SingleMethodSelected,
    MultipleMethodsSelected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TenderLine {
    method: PaymentMethod,
    amount: Money,
}

/// Tender selection and split for one checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentReconciler {
    final_total: Money,
    /// Selection order is kept for the submitted payment list.
    tenders: Vec<TenderLine>,
}

impl PaymentReconciler {
    /// Creates a reconciler for a payable total.
    pub fn new(final_total: Money) -> Self {
        PaymentReconciler {
            final_total: final_total.non_negative(),
            tenders: Vec::new(),
        }
    }

    pub fn state(&self) -> ReconcilerState {
        match self.tenders.len() {
            0 => ReconcilerState::NoMethodSelected,
            1 => ReconcilerState::SingleMethodSelected,
            _ => ReconcilerState::MultipleMethodsSelected,
        }
    }

    #[inline]
    pub fn final_total(&self) -> Money {
        self.final_total
    }

    /// Follows a new payable total. A single tender tracks it exactly;
    /// a multi-method split is left as entered.
    pub fn set_total(&mut self, final_total: Money) {
        self.final_total = final_total.non_negative();
        self.refill_single();
    }

    fn refill_single(&mut self) {
        if let [only] = self.tenders.as_mut_slice() {
            only.amount = self.final_total;
        }
    }

    fn position(&self, method: PaymentMethod) -> Option<usize> {
        self.tenders.iter().position(|t| t.method == method)
    }

    fn require_tender(method: PaymentMethod) -> Result<(), ValidationError> {
        if method.is_tender() {
            Ok(())
        } else {
            Err(ValidationError::DiscountIsNotTender)
        }
    }

    /// Adds a tender. Selecting an already selected tender is a no-op.
    ///
    /// ## Example
    /// ```rust
    /// use splash_core::money::Money;
    /// use splash_core::reconciler::{PaymentReconciler, ReconcilerState};
    /// use splash_core::types::PaymentMethod;
    ///
    /// let mut r = PaymentReconciler::new(Money::from_cents(20000));
    /// r.select(PaymentMethod::Cash).unwrap();
    /// assert_eq!(r.amount(PaymentMethod::Cash), Some(Money::from_cents(20000)));
    ///
    /// r.select(PaymentMethod::MobileWallet).unwrap();
    /// assert_eq!(r.state(), ReconcilerState::MultipleMethodsSelected);
    /// assert_eq!(r.amount(PaymentMethod::Cash), Some(Money::zero()));
    /// ```
    pub fn select(&mut self, method: PaymentMethod) -> Result<(), ValidationError> {
        Self::require_tender(method)?;
        if self.position(method).is_some() {
            return Ok(());
        }

        self.tenders.push(TenderLine {
            method,
            amount: Money::zero(),
        });

        match self.tenders.len() {
            1 => self.refill_single(),
            2 => {
                for tender in &mut self.tenders {
                    tender.amount = Money::zero();
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Removes a tender. Returns whether it was selected.
    ///
    /// When exactly one tender survives it is re-filled with the final
    /// total and locked again.
    pub fn deselect(&mut self, method: PaymentMethod) -> bool {
        let Some(index) = self.position(method) else {
            return false;
        };
        self.tenders.remove(index);
        self.refill_single();
        true
    }

    /// Selects the tender if absent, removes it if present.
    pub fn toggle(&mut self, method: PaymentMethod) -> Result<bool, ValidationError> {
        if self.deselect(method) {
            Ok(false)
        } else {
            self.select(method)?;
            Ok(true)
        }
    }

    /// Manual entry of a tender amount. Only allowed with two or more
    /// tenders; negative input is floored at zero.
    pub fn set_amount(&mut self, method: PaymentMethod, amount: Money) -> Result<(), ValidationError> {
        Self::require_tender(method)?;
        let index = self
            .position(method)
            .ok_or(ValidationError::MethodNotSelected { method })?;
        if self.state() == ReconcilerState::SingleMethodSelected {
            return Err(ValidationError::AmountLocked { method });
        }
        self.tenders[index].amount = amount.non_negative();
        Ok(())
    }

    /// Whether the amount field of a selected tender accepts manual input.
    pub fn is_editable(&self, method: PaymentMethod) -> bool {
        self.position(method).is_some() && self.state() == ReconcilerState::MultipleMethodsSelected
    }

    pub fn is_selected(&self, method: PaymentMethod) -> bool {
        self.position(method).is_some()
    }

    /// Current amount of a selected tender.
    pub fn amount(&self, method: PaymentMethod) -> Option<Money> {
        self.position(method).map(|i| self.tenders[i].amount)
    }

    /// Selected tenders in selection order.
    pub fn methods(&self) -> impl Iterator<Item = PaymentMethod> + '_ {
        self.tenders.iter().map(|t| t.method)
    }

    /// Sum of tender amounts (discount excluded by construction).
    pub fn entered_total(&self) -> Money {
        self.tenders.iter().map(|t| t.amount).sum()
    }

    /// `final_total − entered_total`. Negative when overpaid.
    pub fn remaining(&self) -> Money {
        self.final_total - self.entered_total()
    }

    /// Tendered more than the total, beyond the tolerance.
    pub fn is_overpaid(&self) -> bool {
        self.remaining() < -CONFIRM_TOLERANCE
    }

    /// `|remaining| ≤ 0.01`.
    pub fn is_balanced(&self) -> bool {
        self.remaining().abs() <= CONFIRM_TOLERANCE
    }

    /// Same check as [`Self::is_balanced`], as a `Result` for `?`.
    pub fn ensure_balanced(&self) -> CoreResult<()> {
        if self.is_balanced() {
            Ok(())
        } else {
            Err(CoreError::NotBalanced {
                remaining: self.remaining(),
            })
        }
    }

    /// Payment list to submit: tenders with a positive amount in selection
    /// order, then a `discount` entry when `discount > 0`.
    pub fn payments(&self, discount: Money) -> Vec<PaymentEntry> {
        let mut payments: Vec<PaymentEntry> = self
            .tenders
            .iter()
            .filter(|t| t.amount.is_positive())
            .map(|t| PaymentEntry::new(t.method, t.amount))
            .collect();
        if discount.is_positive() {
            payments.push(PaymentEntry::new(PaymentMethod::Discount, discount));
        }
        payments
    }

    /// Drops every tender; keeps the total.
    pub fn clear(&mut self) {
        self.tenders.clear();
    }

    /// Read model for the payment panel.
    pub fn status(&self) -> PaymentStatus {
        PaymentStatus {
            state: self.state(),
            final_total: self.final_total,
            entered_total: self.entered_total(),
            remaining: self.remaining(),
            overpaid: self.is_overpaid(),
            can_confirm: self.is_balanced(),
        }
    }
}

/// Snapshot of the reconciliation, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentStatus {
    pub state: ReconcilerState,
    pub final_total: Money,
    pub entered_total: Money,
    pub remaining: Money,
    pub overpaid: bool,
    pub can_confirm: bool,
}

// =============================================================================
// Unit Tests
// =============================================================================
