//! # External Collaborators
//!
//! The checkout never speaks HTTP or drives a printer itself. It is handed
//! implementations of these traits.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CatalogSource     fetch(kind)        ──► Vec<RawCatalogItem>          │
//! │  OrderSubmitter    submit(&payload)   ──► SubmittedOrder { order_id }  │
//! │  DocumentDispatch  dispatch(&receipt) ──► printed / saved / shown       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::future::Future;

use splash_core::types::{ItemKind, RawCatalogItem};
use splash_core::{OrderSubmission, PriceTable, ReceiptDocument, SubmittedOrder};
use tracing::info;

use crate::error::{DispatchError, SubmissionError};

/// Catalog service (ticket types and meals).
pub trait CatalogSource {
    fn fetch(
        &self,
        kind: ItemKind,
    ) -> impl Future<Output = Result<Vec<RawCatalogItem>, SubmissionError>> + Send;
}

/// Order-creation backend. Must resolve exactly once per call.
pub trait OrderSubmitter {
    fn submit(
        &self,
        order: &OrderSubmission,
    ) -> impl Future<Output = Result<SubmittedOrder, SubmissionError>> + Send;
}

/// Receipt output (printer, PDF, screen). Called once per copy.
pub trait DocumentDispatch: Send + Sync {
    fn dispatch(&self, document: &ReceiptDocument) -> Result<(), DispatchError>;
}

/// Fetches both catalogs and builds the session's price table.
pub async fn load_price_table<C: CatalogSource>(source: &C) -> Result<PriceTable, SubmissionError> {
    let tickets = source.fetch(ItemKind::Ticket).await?;
    let meals = source.fetch(ItemKind::Meal).await?;
    let table = PriceTable::from_raw(tickets, meals);
    info!(items = table.len(), "Price table loaded");
    Ok(table)
}
