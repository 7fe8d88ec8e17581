//! # Selection
//!
//! What the cashier has picked so far: ticket quantities and meal
//! quantities, keyed by catalog id.
//!
//! ## Invariants
//! - A quantity of zero is never stored (setting 0 removes the line)
//! - Lines are ordered by id, so payloads and receipts are deterministic

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{ItemKind, ItemRef, SelectionLine};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    tickets: BTreeMap<i64, u32>,
    meals: BTreeMap<i64, u32>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    fn lines_mut(&mut self, kind: ItemKind) -> &mut BTreeMap<i64, u32> {
        match kind {
            ItemKind::Ticket => &mut self.tickets,
            ItemKind::Meal => &mut self.meals,
        }
    }

    /// The id → quantity map of one kind.
    pub fn quantities(&self, kind: ItemKind) -> &BTreeMap<i64, u32> {
        match kind {
            ItemKind::Ticket => &self.tickets,
            ItemKind::Meal => &self.meals,
        }
    }

    /// Sets the quantity of a line. Zero removes it.
    ///
    /// ```rust
    /// use splash_core::selection::Selection;
    /// use splash_core::types::ItemRef;
    ///
    /// let mut selection = Selection::new();
    /// selection.set_quantity(ItemRef::ticket(1), 3);
    /// assert_eq!(selection.quantity(ItemRef::ticket(1)), 3);
    ///
    /// selection.set_quantity(ItemRef::ticket(1), 0);
    /// assert!(selection.is_empty());
    /// ```
    pub fn set_quantity(&mut self, item: ItemRef, quantity: u32) {
        let lines = self.lines_mut(item.kind);
        if quantity == 0 {
            lines.remove(&item.id);
        } else {
            lines.insert(item.id, quantity);
        }
    }

    /// Current quantity of a line, zero when absent.
    pub fn quantity(&self, item: ItemRef) -> u32 {
        self.quantities(item.kind)
            .get(&item.id)
            .copied()
            .unwrap_or(0)
    }

    /// True when the line is present (quantity > 0).
    pub fn contains(&self, item: ItemRef) -> bool {
        self.quantity(item) > 0
    }

    /// Lines of one kind, ordered by id.
    pub fn lines(&self, kind: ItemKind) -> impl Iterator<Item = SelectionLine> + '_ {
        self.quantities(kind)
            .iter()
            .map(|(&item_id, &quantity)| SelectionLine { item_id, quantity })
    }

    /// Number of distinct lines across both kinds.
    pub fn line_count(&self) -> usize {
        self.tickets.len() + self.meals.len()
    }

    /// Sum of quantities across both kinds.
    pub fn total_quantity(&self) -> u64 {
        self.tickets
            .values()
            .chain(self.meals.values())
            .map(|&q| q as u64)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty() && self.meals.is_empty()
    }

    pub fn clear(&mut self) {
        self.tickets.clear();
        self.meals.clear();
    }
}
