//! # Line Item Aggregator
//!
//! Reduces `(item, quantity)` pairs to a subtotal using the price table.
//!
//! ```text
//! quantities {1: 3, 2: 0, 99: 1}        price table {1: 50.00}
//!         │                                   │
//!         └──────────────┬────────────────────┘
//!                        ▼
//!      1: 3 × 50.00 = 150.00   (priced)
//!      2: quantity 0            (ignored)
//!     99: not in catalog        (skipped, logged, contributes 0)
//!                        │
//!                        ▼
//!                subtotal 150.00
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;
use ts_rs::TS;

use crate::money::Money;
use crate::price_table::PriceTable;
use crate::types::{ItemKind, ItemRef};

/// A selection line with its price resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricedLine {
    pub item: ItemRef,
    pub quantity: u32,
    pub unit_price: Money,
    pub line_total: Money,
}

/// Result of aggregating one kind of selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineSummary {
    pub subtotal: Money,
    /// Lines that contributed, ordered by id.
    pub lines: Vec<PricedLine>,
    /// Ids with a positive quantity that the catalog does not know.
    pub skipped: Vec<ItemRef>,
}

/// Aggregates the id → quantity map of one kind.
pub fn aggregate(table: &PriceTable, kind: ItemKind, quantities: &BTreeMap<i64, u32>) -> LineSummary {
    let mut summary = LineSummary::default();

    for (&id, &quantity) in quantities {
        if quantity == 0 {
            continue;
        }
        let item = ItemRef { kind, id };
        match table.price(item) {
            Some(unit_price) => {
                let line_total = unit_price.multiply_quantity(quantity);
                summary.subtotal += line_total;
                summary.lines.push(PricedLine {
                    item,
                    quantity,
                    unit_price,
                    line_total,
                });
            }
            None => {
                warn!(%item, quantity, "Selected item missing from catalog, contributing zero");
                summary.skipped.push(item);
            }
        }
    }

    summary
}

/// `Σ quantity × unit_price` for one kind. Unknown ids contribute zero.
///
/// ## Example
/// ```rust
/// use std::collections::BTreeMap;
/// use splash_core::aggregator::subtotal;
/// use splash_core::money::Money;
/// use splash_core::price_table::PriceTable;
/// use splash_core::types::{CatalogItem, ItemKind};
///
/// let table = PriceTable::from_items([CatalogItem {
///     id: 1,
///     kind: ItemKind::Ticket,
///     category: Some("Slides".into()),
///     subcategory: Some("Adult".into()),
///     name: None,
///     unit_price: Money::from_cents(5000),
///     archived: false,
/// }]);
///
/// let quantities = BTreeMap::from([(1, 3), (42, 2)]);
/// assert_eq!(subtotal(&table, ItemKind::Ticket, &quantities), Money::from_cents(15000));
/// ```
pub fn subtotal(table: &PriceTable, kind: ItemKind, quantities: &BTreeMap<i64, u32>) -> Money {
    aggregate(table, kind, quantities).subtotal
}
