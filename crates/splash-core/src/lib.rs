//! # splash-core: Pure Pricing Logic for Splash POS
//!
//! Order pricing and payment reconciliation for the water park checkout.
//! Every function is deterministic and free of I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Splash POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Checkout screens (UI shell)                  │   │
//! │  │   Ticket picker ─► Meal picker ─► Payment panel ─► Receipt     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          splash-checkout (session, submit, notify)              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ splash-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │  price_table ─► aggregator ─► totals ─► reconciler              │   │
//! │  │  sanitize       selection     order     receipt    report       │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`types`] - Catalog items, payment methods, payment entries
//! - [`sanitize`] - The one boundary where loose input becomes typed values
//! - [`price_table`] - Catalog snapshot lookup
//! - [`selection`] - Ticket / meal quantities of the order being built
//! - [`aggregator`] - Line item subtotals
//! - [`totals`] - Subtotals, capped discount, final total
//! - [`reconciler`] - Tender selection, split, confirm gating
//! - [`order`] - Order submission payload
//! - [`receipt`] - Receipt document for printing
//! - [`report`] - Revenue reconciliation over completed orders
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use splash_core::{compute, Money, PaymentMethod, PaymentReconciler, PriceTable, Selection};
//! use splash_core::types::{CatalogItem, ItemKind, ItemRef};
//!
//! let table = PriceTable::from_items([CatalogItem {
//!     id: 1,
//!     kind: ItemKind::Ticket,
//!     category: Some("Slides".into()),
//!     subcategory: Some("Adult".into()),
//!     name: None,
//!     unit_price: Money::from_cents(5000),
//!     archived: false,
//! }]);
//!
//! let mut selection = Selection::new();
//! selection.set_quantity(ItemRef::ticket(1), 3);
//!
//! let totals = compute(&table, &selection, Money::zero());
//! assert_eq!(totals.final_total.to_string(), "150.00");
//!
//! let mut payments = PaymentReconciler::new(totals.final_total);
//! payments.select(PaymentMethod::Cash).unwrap();
//! assert!(payments.is_balanced());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod aggregator;
pub mod error;
pub mod money;
pub mod order;
pub mod price_table;
pub mod receipt;
pub mod reconciler;
pub mod report;
pub mod sanitize;
pub mod selection;
pub mod totals;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use order::{OrderSubmission, SubmittedOrder};
pub use price_table::PriceTable;
pub use receipt::{ReceiptCopy, ReceiptDocument, ReceiptHeader};
pub use reconciler::{PaymentReconciler, PaymentStatus, ReconcilerState, CONFIRM_TOLERANCE};
pub use report::{CompletedOrder, SalesSummary};
pub use selection::Selection;
pub use totals::{compute, price_order, validate_discount, OrderTotals, PricedOrder};
pub use types::*;
