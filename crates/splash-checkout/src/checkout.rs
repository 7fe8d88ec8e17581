//! # Checkout Service
//!
//! Ties the session to its collaborators and runs the confirm flow.
//!
//! ## Confirm Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    confirm()                                            │
//! │                                                                         │
//! │  1. in-flight flag set?  ── yes ──► Err(SubmissionInFlight)            │
//! │  2. signed-in user?      ── no  ──► Err(NotSignedIn)                   │
//! │  3. lock session, build payload + receipt inputs, unlock               │
//! │        empty / unbalanced ──────► Err(EmptyOrder / NotBalanced)        │
//! │  4. submit, bounded by submit_timeout                                  │
//! │        failure / timeout ───────► error toast, state KEPT, Err(..)     │
//! │  5. success:                                                           │
//! │        clear session if unedited since step 3, else keep + warn        │
//! │        success toast "Order #N created, total ..."                     │
//! │        dispatch receipt copies (customer, merchant, ...)               │
//! │           dispatch failure ─────► warning toast, order stays confirmed │
//! │  6. in-flight flag released (also on every early return)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No automatic retry. The cashier presses confirm again.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use splash_core::{
    CompletedOrder, PriceTable, ReceiptCopy, ReceiptDocument, ReceiptHeader, SalesSummary,
};
use tracing::{error, info, warn};

use crate::collaborators::{load_price_table, CatalogSource, DocumentDispatch, OrderSubmitter};
use crate::config::CheckoutConfig;
use crate::context::SessionContext;
use crate::error::{CheckoutError, CheckoutResult, SubmissionError};
use crate::notify::Notifier;
use crate::state::SessionState;

/// Outcome of a successful confirm.
#[derive(Debug, Clone)]
pub struct ConfirmedOrder {
    pub order_id: i64,
    /// Customer copy of the receipt.
    pub receipt: ReceiptDocument,
    /// Copies the dispatcher accepted.
    pub copies_dispatched: usize,
}

/// Releases the in-flight flag when dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One register's checkout.
pub struct Checkout<S, D> {
    config: CheckoutConfig,
    context: SessionContext,
    state: SessionState,
    notifier: Notifier,
    submitter: S,
    dispatcher: D,
    in_flight: AtomicBool,
    completed: Mutex<Vec<CompletedOrder>>,
}

impl<S, D> Checkout<S, D>
where
    S: OrderSubmitter,
    D: DocumentDispatch,
{
    pub fn new(
        config: CheckoutConfig,
        context: SessionContext,
        table: Arc<PriceTable>,
        submitter: S,
        dispatcher: D,
    ) -> Self {
        Checkout {
            config,
            context,
            state: SessionState::new(table),
            notifier: Notifier::new(),
            submitter,
            dispatcher,
            in_flight: AtomicBool::new(false),
            completed: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Session handle for the UI commands.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Whether a submission is outstanding (confirm button disabled).
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Confirm gating as the UI shows it.
    pub fn can_confirm(&self) -> bool {
        !self.is_submitting()
            && self.context.user_id().is_some()
            && self.state.with_session(|s| s.can_confirm())
    }

    /// Refetches the catalog and reprices the open session.
    pub async fn reload_catalog<C: CatalogSource>(&self, source: &C) -> Result<(), SubmissionError> {
        match load_price_table(source).await {
            Ok(table) => {
                let table = Arc::new(table);
                self.state.with_session_mut(|s| s.replace_table(table));
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Catalog reload failed");
                self.notifier.error(format!("Could not load catalog: {}", e));
                Err(e)
            }
        }
    }

    /// Submits the open order. See the module docs for the flow.
    pub async fn confirm(&self) -> CheckoutResult<ConfirmedOrder> {
        let _guard = InFlight::acquire(&self.in_flight).ok_or(CheckoutError::SubmissionInFlight)?;

        let user = self.context.current().ok_or(CheckoutError::NotSignedIn)?;

        let (session_id, revision, payload, table, priced, payments) =
            self.state.with_session(|s| {
                let payload = s.build_submission(user.user_id, &self.config.default_description)?;
                Ok::<_, CheckoutError>((
                    s.id(),
                    s.revision(),
                    payload,
                    Arc::clone(s.table()),
                    s.priced(),
                    s.payments(),
                ))
            })?;

        info!(
            %session_id,
            user_id = user.user_id,
            final_total = %priced.totals.final_total,
            payments = payments.len(),
            "Submitting order"
        );

        let timeout = self.config.submit_timeout();
        let submitted = match tokio::time::timeout(timeout, self.submitter.submit(&payload)).await {
            Ok(Ok(submitted)) => submitted,
            Ok(Err(e)) => return Err(self.submission_failed(e)),
            Err(_) => return Err(self.submission_failed(SubmissionError::Timeout(timeout.as_secs()))),
        };

        let order_id = submitted.order_id;
        let issued_at = Utc::now();
        info!(%session_id, order_id, "Order created");

        self.notifier.success(format!(
            "Order #{} created, total {}",
            order_id,
            self.config.format_currency(priced.totals.final_total)
        ));
        if !self.state.with_session_mut(|s| s.clear_if_unchanged(revision)) {
            warn!(%session_id, order_id, "Session edited during submission, kept");
            self.notifier.warning(format!(
                "Order #{} created; edits made while sending were kept and not submitted",
                order_id
            ));
        }

        self.record(CompletedOrder {
            order_id,
            created_at: issued_at,
            ticket_revenue: priced.totals.ticket_subtotal,
            meal_revenue: priced.totals.meal_subtotal,
            payments: payments.clone(),
        });

        let receipt = ReceiptDocument::build(
            order_id,
            &table,
            &priced,
            payments,
            &payload.description,
            Some(&user.user_name),
            issued_at,
        )
        .with_header(self.receipt_header());
        let copies_dispatched = self.dispatch_copies(&receipt);

        Ok(ConfirmedOrder {
            order_id,
            receipt,
            copies_dispatched,
        })
    }

    fn receipt_header(&self) -> ReceiptHeader {
        ReceiptHeader {
            store_name: self.config.store_name.clone(),
            store_address: self.config.store_address.clone(),
            currency_symbol: self.config.currency_symbol.clone(),
        }
    }

    fn submission_failed(&self, err: SubmissionError) -> CheckoutError {
        error!(error = %err, "Order submission failed, session kept");
        self.notifier.error(format!("Order was not created: {}", err));
        CheckoutError::Submission(err)
    }

    fn dispatch_copies(&self, receipt: &ReceiptDocument) -> usize {
        let mut dispatched = 0;
        for copy in ReceiptCopy::sequence(self.config.receipt_copies) {
            match self.dispatcher.dispatch(&receipt.with_copy(copy)) {
                Ok(()) => dispatched += 1,
                Err(e) => {
                    warn!(order_id = receipt.order_id, ?copy, error = %e, "Receipt copy not dispatched");
                    self.notifier.warning(format!(
                        "Order #{} saved, but the receipt could not be printed",
                        receipt.order_id
                    ));
                }
            }
        }
        dispatched
    }

    fn record(&self, order: CompletedOrder) {
        self.completed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(order);
    }

    /// Orders confirmed at this register since startup.
    pub fn completed_orders(&self) -> Vec<CompletedOrder> {
        self.completed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Sales summary over this register's orders, optionally limited to
    /// `[from, to)`.
    pub fn sales_summary(&self, period: Option<(DateTime<Utc>, DateTime<Utc>)>) -> SalesSummary {
        let orders = self.completed.lock().unwrap_or_else(PoisonError::into_inner);
        match period {
            Some((from, to)) => SalesSummary::for_period(orders.iter(), from, to),
            None => SalesSummary::from_orders(orders.iter()),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicI64;
    use std::time::Duration;

    use splash_core::types::{CatalogItem, ItemKind, ItemRef, PaymentMethod};
    use splash_core::{Money, OrderSubmission, SubmittedOrder};

    use crate::context::UserSession;
    use crate::error::DispatchError;
    use crate::notify::NotificationLevel;

    fn cents(c: i64) -> Money {
        Money::from_cents(c)
    }

    // -------------------------------------------------------------------------
    // Test doubles
    // -------------------------------------------------------------------------

    #[derive(Default)]
    struct RecordingSubmitter {
        next_id: AtomicI64,
        delay: Option<Duration>,
        fail_with: Option<SubmissionError>,
        seen: Mutex<Vec<OrderSubmission>>,
    }

    impl OrderSubmitter for RecordingSubmitter {
        async fn submit(&self, order: &OrderSubmission) -> Result<SubmittedOrder, SubmissionError> {
            self.seen.lock().unwrap().push(order.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            Ok(SubmittedOrder {
                order_id: 100 + self.next_id.fetch_add(1, Ordering::SeqCst),
            })
        }
    }

    #[derive(Default)]
    struct RecordingPrinter {
        fail: bool,
        printed: Mutex<Vec<ReceiptDocument>>,
    }

    impl DocumentDispatch for RecordingPrinter {
        fn dispatch(&self, document: &ReceiptDocument) -> Result<(), DispatchError> {
            if self.fail {
                return Err(DispatchError("printer offline".to_string()));
            }
            self.printed.lock().unwrap().push(document.clone());
            Ok(())
        }
    }

    fn table() -> Arc<PriceTable> {
        Arc::new(PriceTable::from_items([
            CatalogItem {
                id: 1,
                kind: ItemKind::Ticket,
                category: Some("Slides".to_string()),
                subcategory: Some("Adult".to_string()),
                name: None,
                unit_price: cents(5000),
                archived: false,
            },
            CatalogItem {
                id: 4,
                kind: ItemKind::Meal,
                category: None,
                subcategory: None,
                name: Some("Burger".to_string()),
                unit_price: cents(1250),
                archived: false,
            },
        ]))
    }

    fn checkout(
        submitter: RecordingSubmitter,
        printer: RecordingPrinter,
    ) -> Checkout<RecordingSubmitter, RecordingPrinter> {
        checkout_with(CheckoutConfig::default(), submitter, printer)
    }

    fn checkout_with(
        config: CheckoutConfig,
        submitter: RecordingSubmitter,
        printer: RecordingPrinter,
    ) -> Checkout<RecordingSubmitter, RecordingPrinter> {
        let context = SessionContext::new();
        context.sign_in(UserSession {
            user_id: 12,
            user_name: "Mona".to_string(),
            token: "t".to_string(),
        });
        Checkout::new(config, context, table(), submitter, printer)
    }

    fn ring_up(c: &Checkout<RecordingSubmitter, RecordingPrinter>) {
        c.state().with_session_mut(|s| {
            s.set_quantity(ItemRef::ticket(1), 3).unwrap();
            s.select_method(PaymentMethod::Cash).unwrap();
        });
    }

    // -------------------------------------------------------------------------
    // Tests
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_confirm_success_clears_and_prints_two_copies() {
        let c = checkout(RecordingSubmitter::default(), RecordingPrinter::default());
        let mut toasts = c.notifier().subscribe();
        ring_up(&c);
        assert!(c.can_confirm());

        let confirmed = c.confirm().await.unwrap();
        assert_eq!(confirmed.order_id, 100);
        assert_eq!(confirmed.copies_dispatched, 2);
        assert_eq!(confirmed.receipt.final_total, cents(15000));
        assert_eq!(confirmed.receipt.cashier.as_deref(), Some("Mona"));
        assert_eq!(confirmed.receipt.header.store_name, "Splash Water Park");

        let printed = c.dispatcher.printed.lock().unwrap();
        assert_eq!(printed[0].copy, ReceiptCopy::Customer);
        assert_eq!(printed[1].copy, ReceiptCopy::Merchant);
        drop(printed);

        let sent = c.submitter.seen.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].user_id, 12);
        drop(sent);

        assert!(c.state().with_session(|s| s.selection().is_empty()));
        assert!(!c.is_submitting());

        let toast = toasts.try_recv().unwrap();
        assert_eq!(toast.level, NotificationLevel::Success);
        assert_eq!(toast.message, "Order #100 created, total 150.00");
    }

    #[tokio::test]
    async fn test_failed_submission_preserves_state() {
        let submitter = RecordingSubmitter {
            fail_with: Some(SubmissionError::Network("connection reset".to_string())),
            ..Default::default()
        };
        let c = checkout(submitter, RecordingPrinter::default());
        let mut toasts = c.notifier().subscribe();
        ring_up(&c);

        let err = c.confirm().await.unwrap_err();
        assert!(matches!(err, CheckoutError::Submission(SubmissionError::Network(_))));

        assert_eq!(c.state().with_session(|s| s.selection().quantity(ItemRef::ticket(1))), 3);
        assert!(c.state().with_session(|s| s.can_confirm()));
        assert!(c.dispatcher.printed.lock().unwrap().is_empty());
        assert_eq!(toasts.try_recv().unwrap().level, NotificationLevel::Error);
        assert!(c.completed_orders().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_submission_times_out() {
        let submitter = RecordingSubmitter {
            delay: Some(Duration::from_secs(3600)),
            ..Default::default()
        };
        let c = checkout(submitter, RecordingPrinter::default());
        ring_up(&c);

        let err = c.confirm().await.unwrap_err();
        assert!(matches!(err, CheckoutError::Submission(SubmissionError::Timeout(15))));
        assert!(!c.state().with_session(|s| s.selection().is_empty()));
        assert!(!c.is_submitting());
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_confirm_is_rejected() {
        let submitter = RecordingSubmitter {
            delay: Some(Duration::from_secs(1)),
            ..Default::default()
        };
        let c = checkout(submitter, RecordingPrinter::default());
        ring_up(&c);

        let (first, second) = tokio::join!(c.confirm(), c.confirm());
        assert!(first.is_ok());
        assert!(matches!(second, Err(CheckoutError::SubmissionInFlight)));
        assert_eq!(c.submitter.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edits_during_submission_are_kept() {
        let submitter = RecordingSubmitter {
            delay: Some(Duration::from_secs(1)),
            ..Default::default()
        };
        let c = checkout(submitter, RecordingPrinter::default());
        let mut toasts = c.notifier().subscribe();
        ring_up(&c);

        let edit = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            c.state().with_session_mut(|s| s.set_quantity(ItemRef::meal(4), 1))
        };
        let (confirmed, edited) = tokio::join!(c.confirm(), edit);
        edited.unwrap();
        assert_eq!(confirmed.unwrap().order_id, 100);

        let sent = c.submitter.seen.lock().unwrap();
        assert!(sent[0].meals.is_none());
        drop(sent);

        assert_eq!(c.state().with_session(|s| s.selection().quantity(ItemRef::meal(4))), 1);
        assert_eq!(c.state().with_session(|s| s.selection().quantity(ItemRef::ticket(1))), 3);

        assert_eq!(toasts.try_recv().unwrap().level, NotificationLevel::Success);
        assert_eq!(toasts.try_recv().unwrap().level, NotificationLevel::Warning);
    }

    #[tokio::test]
    async fn test_unbalanced_confirm_is_rejected_without_submitting() {
        let c = checkout(RecordingSubmitter::default(), RecordingPrinter::default());
        c.state().with_session_mut(|s| {
            s.set_quantity(ItemRef::ticket(1), 4).unwrap();
            s.select_method(PaymentMethod::Cash).unwrap();
            s.select_method(PaymentMethod::MobileWallet).unwrap();
            s.set_amount(PaymentMethod::Cash, cents(15000)).unwrap();
        });
        assert!(!c.can_confirm());

        let err = c.confirm().await.unwrap_err();
        assert!(matches!(err, CheckoutError::NotBalanced { remaining } if remaining == cents(5000)));
        assert!(c.submitter.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_order_and_signed_out() {
        let c = checkout(RecordingSubmitter::default(), RecordingPrinter::default());
        assert!(matches!(
            c.confirm().await,
            Err(CheckoutError::Core(splash_core::CoreError::EmptyOrder))
        ));

        ring_up(&c);
        c.context().sign_out();
        assert!(!c.can_confirm());
        assert!(matches!(c.confirm().await, Err(CheckoutError::NotSignedIn)));
    }

    #[tokio::test]
    async fn test_printer_failure_keeps_order_confirmed() {
        let printer = RecordingPrinter {
            fail: true,
            ..Default::default()
        };
        let config = CheckoutConfig {
            receipt_copies: 1,
            ..Default::default()
        };
        let c = checkout_with(config, RecordingSubmitter::default(), printer);
        let mut toasts = c.notifier().subscribe();
        ring_up(&c);

        let confirmed = c.confirm().await.unwrap();
        assert_eq!(confirmed.copies_dispatched, 0);
        assert!(c.state().with_session(|s| s.selection().is_empty()));

        assert_eq!(toasts.try_recv().unwrap().level, NotificationLevel::Success);
        assert_eq!(toasts.try_recv().unwrap().level, NotificationLevel::Warning);
    }

    #[tokio::test]
    async fn test_sales_summary_over_confirmed_orders() {
        let c = checkout(RecordingSubmitter::default(), RecordingPrinter::default());

        ring_up(&c);
        c.confirm().await.unwrap();

        c.state().with_session_mut(|s| {
            s.set_quantity(ItemRef::meal(4), 2).unwrap();
            s.set_discount(cents(500));
            s.select_method(PaymentMethod::Postponed).unwrap();
        });
        c.confirm().await.unwrap();

        let summary = c.sales_summary(None);
        assert_eq!(summary.order_count, 2);
        assert_eq!(summary.ticket_revenue, cents(15000));
        assert_eq!(summary.meal_revenue, cents(2500));
        assert_eq!(summary.discount_total, cents(500));
        assert_eq!(summary.postponed, cents(2000));
        assert_eq!(summary.difference, Money::zero());
        assert!(summary.is_balanced());
    }
}
