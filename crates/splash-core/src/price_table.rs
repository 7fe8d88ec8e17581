//! # Price Table
//!
//! Read-only catalog snapshot: `ItemRef → CatalogItem`.
//!
//! Built once when a checkout screen mounts, then shared (`Arc`) by every
//! computation of the session. Archived items stay in the table so lines
//! selected before archival keep their price; they are only left out of
//! [`PriceTable::pickable`].

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::money::Money;
use crate::sanitize;
use crate::types::{CatalogItem, ItemKind, ItemRef, RawCatalogItem};

#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    items: HashMap<ItemRef, CatalogItem>,
}

impl PriceTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from already-typed catalog items.
    ///
    /// On duplicate ids the last entry wins.
    pub fn from_items(items: impl IntoIterator<Item = CatalogItem>) -> Self {
        let mut table = PriceTable::new();
        for item in items {
            table.insert(item);
        }
        table
    }

    /// Adds raw catalog entries of one kind, sanitizing every field.
    ///
    /// Entries without a readable id are skipped. Prices arriving as strings
    /// or garbage are coerced (see [`sanitize::amount`]).
    ///
    /// ## Example
    /// ```rust
    /// use serde_json::json;
    /// use splash_core::price_table::PriceTable;
    /// use splash_core::types::{ItemKind, ItemRef, RawCatalogItem};
    /// use splash_core::money::Money;
    ///
    /// let raw: Vec<RawCatalogItem> = serde_json::from_value(json!([
    ///     { "id": 1, "category": "Slides", "subcategory": "Adult", "price": "50.00", "archived": false },
    ///     { "id": "2", "category": "Slides", "subcategory": "Child", "price": 30 },
    /// ])).unwrap();
    ///
    /// let mut table = PriceTable::new();
    /// table.extend_raw(ItemKind::Ticket, raw);
    /// assert_eq!(table.price(ItemRef::ticket(2)), Some(Money::from_cents(3000)));
    /// ```
    pub fn extend_raw(&mut self, kind: ItemKind, raw: impl IntoIterator<Item = RawCatalogItem>) {
        let mut added = 0usize;
        for entry in raw {
            let Some(id) = sanitize::item_id(&entry.id) else {
                continue;
            };
            self.insert(CatalogItem {
                id,
                kind,
                category: sanitize::text(entry.category.as_deref()),
                subcategory: sanitize::text(entry.subcategory.as_deref()),
                name: sanitize::text(entry.name.as_deref()),
                unit_price: sanitize::amount(&entry.price, "price"),
                archived: entry.archived.unwrap_or(false),
            });
            added += 1;
        }
        debug!(%kind, added, total = self.items.len(), "Catalog entries loaded");
    }

    /// Builds a table from raw ticket and meal snapshots.
    pub fn from_raw(
        tickets: impl IntoIterator<Item = RawCatalogItem>,
        meals: impl IntoIterator<Item = RawCatalogItem>,
    ) -> Self {
        let mut table = PriceTable::new();
        table.extend_raw(ItemKind::Ticket, tickets);
        table.extend_raw(ItemKind::Meal, meals);
        table
    }

    fn insert(&mut self, mut item: CatalogItem) {
        if item.unit_price.is_negative() {
            warn!(item = %item.item_ref(), "Negative catalog price coerced to zero");
            item.unit_price = Money::zero();
        }
        self.items.insert(item.item_ref(), item);
    }

    /// Unit price of an item, archived or not. `None` for unknown ids.
    #[inline]
    pub fn price(&self, item: ItemRef) -> Option<Money> {
        self.items.get(&item).map(|i| i.unit_price)
    }

    /// Full catalog entry of an item.
    #[inline]
    pub fn get(&self, item: ItemRef) -> Option<&CatalogItem> {
        self.items.get(&item)
    }

    /// Items offered for new selections: one kind, not archived, ordered by
    /// category, subcategory, then id.
    pub fn pickable(&self, kind: ItemKind) -> Vec<&CatalogItem> {
        let mut items: Vec<&CatalogItem> = self
            .items
            .values()
            .filter(|i| i.kind == kind && !i.archived)
            .collect();
        items.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then_with(|| a.subcategory.cmp(&b.subcategory))
                .then_with(|| a.id.cmp(&b.id))
        });
        items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
