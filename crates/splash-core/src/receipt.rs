//! # Receipt Document
//!
//! Fully computed receipt payload for the document-dispatch collaborator.
//! Layout is not decided here; every value a template needs is, already
//! rounded to two decimals (amounts are cents, serialized as major units).
//!
//! ## Dual Copy
//! ```text
//! confirmed order ──► ReceiptDocument::build ──► copy = Customer ──► dispatch
//!                                          └──► copy = Merchant ──► dispatch
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::aggregator::PricedLine;
use crate::money::Money;
use crate::price_table::PriceTable;
use crate::totals::PricedOrder;
use crate::types::{ItemKind, PaymentEntry};

/// Which printed copy a document is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptCopy {
    Customer,
    Merchant,
}

impl ReceiptCopy {
    /// Copies in print order for a configured copy count.
    ///
    /// ```rust
    /// use splash_core::receipt::ReceiptCopy;
    ///
    /// assert_eq!(ReceiptCopy::sequence(2), vec![ReceiptCopy::Customer, ReceiptCopy::Merchant]);
    /// assert_eq!(ReceiptCopy::sequence(1), vec![ReceiptCopy::Customer]);
    /// ```
    pub fn sequence(copies: u8) -> Vec<ReceiptCopy> {
        (0..copies)
            .map(|i| {
                if i == 0 {
                    ReceiptCopy::Customer
                } else {
                    ReceiptCopy::Merchant
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceiptLine {
    pub kind: ItemKind,
    pub item_id: i64,
    pub label: String,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub quantity: u32,
    pub unit_price: Money,
    pub line_total: Money,
}

/// Store identity printed above the lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceiptHeader {
    pub store_name: String,
    pub store_address: Vec<String>,
    /// Prefix for displayed amounts ("JD "), empty for none.
    pub currency_symbol: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceiptDocument {
    pub header: ReceiptHeader,
    pub order_id: i64,
    pub copy: ReceiptCopy,
    #[ts(as = "String")]
    pub issued_at: DateTime<Utc>,
    pub cashier: Option<String>,
    pub description: String,
    pub lines: Vec<ReceiptLine>,
    pub ticket_subtotal: Money,
    pub meal_subtotal: Money,
    pub discount_amount: Money,
    pub final_total: Money,
    /// Tenders followed by the discount entry, as submitted.
    pub payments: Vec<PaymentEntry>,
}

impl ReceiptDocument {
    /// Builds the customer copy of a confirmed order.
    ///
    /// Lines whose item vanished from the catalog are not printed (they
    /// priced at zero).
    pub fn build(
        order_id: i64,
        table: &PriceTable,
        priced: &PricedOrder,
        payments: Vec<PaymentEntry>,
        description: &str,
        cashier: Option<&str>,
        issued_at: DateTime<Utc>,
    ) -> Self {
        let lines = priced
            .tickets
            .lines
            .iter()
            .chain(priced.meals.lines.iter())
            .map(|line| receipt_line(table, line))
            .collect();

        ReceiptDocument {
            header: ReceiptHeader::default(),
            order_id,
            copy: ReceiptCopy::Customer,
            issued_at,
            cashier: cashier.map(str::to_string),
            description: description.trim().to_string(),
            lines,
            ticket_subtotal: priced.totals.ticket_subtotal,
            meal_subtotal: priced.totals.meal_subtotal,
            discount_amount: priced.totals.discount_amount,
            final_total: priced.totals.final_total,
            payments,
        }
    }

    pub fn with_header(self, header: ReceiptHeader) -> Self {
        ReceiptDocument { header, ..self }
    }

    /// Same document, different copy marker.
    pub fn with_copy(&self, copy: ReceiptCopy) -> Self {
        ReceiptDocument {
            copy,
            ..self.clone()
        }
    }

    /// Sum of tender payments (discount excluded).
    pub fn tendered(&self) -> Money {
        self.payments
            .iter()
            .filter(|p| p.method.is_tender())
            .map(|p| p.amount)
            .sum()
    }
}

fn receipt_line(table: &PriceTable, line: &PricedLine) -> ReceiptLine {
    let item = table.get(line.item);
    ReceiptLine {
        kind: line.item.kind,
        item_id: line.item.id,
        label: item.map(|i| i.label()).unwrap_or_else(|| line.item.to_string()),
        category: item.and_then(|i| i.category.clone()),
        subcategory: item.and_then(|i| i.subcategory.clone()),
        quantity: line.quantity,
        unit_price: line.unit_price,
        line_total: line.line_total,
    }
}
