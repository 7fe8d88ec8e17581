//! # Domain Types
//!
//! Core domain types used throughout Splash POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  CatalogItem    │   │ SelectionLine   │   │  PaymentEntry   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id, kind       │   │  item_id        │   │  method         │       │
//! │  │  category       │   │  quantity       │   │  amount         │       │
//! │  │  unit_price     │   └─────────────────┘   └─────────────────┘       │
//! │  │  archived       │                                                    │
//! │  └─────────────────┘   ┌─────────────────┐   ┌─────────────────┐       │
//! │                        │   ItemKind      │   │ PaymentMethod   │       │
//! │                        │  Ticket | Meal  │   │  cash, bank_a,  │       │
//! │                        └─────────────────┘   │  bank_other,    │       │
//! │                                              │  mobile_wallet, │       │
//! │                                              │  postponed,     │       │
//! │                                              │  discount       │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ticket ids and meal ids come from different catalog tables, so an item is
//! only identified by the pair ([`ItemKind`], id), see [`ItemRef`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Item Kind / Reference
// =============================================================================

/// Which catalog an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// A ticket type, e.g. "Slides — Adult".
    Ticket,
    /// A food or beverage item.
    Meal,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Ticket => write!(f, "ticket"),
            ItemKind::Meal => write!(f, "meal"),
        }
    }
}

/// Fully qualified catalog key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItemRef {
    pub kind: ItemKind,
    pub id: i64,
}

impl ItemRef {
    #[inline]
    pub const fn ticket(id: i64) -> Self {
        ItemRef {
            kind: ItemKind::Ticket,
            id,
        }
    }

    #[inline]
    pub const fn meal(id: i64) -> Self {
        ItemRef {
            kind: ItemKind::Meal,
            id,
        }
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}

// =============================================================================
// Catalog Item
// =============================================================================

/// A sellable ticket type or meal, as seen by the pricing core.
///
/// Owned by the upstream catalog; immutable for the length of one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CatalogItem {
    pub id: i64,
    pub kind: ItemKind,
    /// Ticket category ("Slides") or meal group.
    pub category: Option<String>,
    /// Ticket subcategory ("Adult", "Child").
    pub subcategory: Option<String>,
    pub name: Option<String>,
    /// Never negative (enforced by the sanitizer).
    pub unit_price: Money,
    /// Hidden from pickers, still priced for lines already selected.
    pub archived: bool,
}

impl CatalogItem {
    #[inline]
    pub fn item_ref(&self) -> ItemRef {
        ItemRef {
            kind: self.kind,
            id: self.id,
        }
    }

    /// Human label for receipts: name, else "category — subcategory",
    /// else category, else the item reference.
    pub fn label(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.trim().to_string();
        }
        match (self.category.as_deref(), self.subcategory.as_deref()) {
            (Some(cat), Some(sub)) if !sub.trim().is_empty() => {
                format!("{} — {}", cat.trim(), sub.trim())
            }
            (Some(cat), _) if !cat.trim().is_empty() => cat.trim().to_string(),
            _ => self.item_ref().to_string(),
        }
    }
}

/// Catalog entry exactly as the catalog service sends it.
///
/// Every field is loose: `price` may be a number or a string, `id` may be a
/// string, `archived` may be missing. [`crate::price_table::PriceTable::from_raw`]
/// is the only place these are turned into [`CatalogItem`]s.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCatalogItem {
    #[serde(default)]
    pub id: serde_json::Value,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: serde_json::Value,
    #[serde(default)]
    pub archived: Option<bool>,
}

// =============================================================================
// Selection Line
// =============================================================================

/// One (item, quantity) pair of a checkout selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SelectionLine {
    pub item_id: i64,
    /// Zero is equivalent to the line being absent.
    pub quantity: u32,
}

// =============================================================================
// Payment Method
// =============================================================================

/// Settlement channel of a payment entry.
///
/// `Discount` rides along in the submitted payment list but is not a tender:
/// it lowers the payable total instead of paying it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    /// Transfer to the park's primary bank.
    BankA,
    /// Transfer to any other bank.
    BankOther,
    MobileWallet,
    /// Deferred payment (credit).
    Postponed,
    Discount,
}

impl PaymentMethod {
    /// Every method that counts as a tender, in display order.
    pub const TENDERS: [PaymentMethod; 5] = [
        PaymentMethod::Cash,
        PaymentMethod::BankA,
        PaymentMethod::BankOther,
        PaymentMethod::MobileWallet,
        PaymentMethod::Postponed,
    ];

    /// True for everything except `Discount`.
    #[inline]
    pub const fn is_tender(&self) -> bool {
        !matches!(self, PaymentMethod::Discount)
    }

    /// Wire name, identical to the serde representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::BankA => "bank_a",
            PaymentMethod::BankOther => "bank_other",
            PaymentMethod::MobileWallet => "mobile_wallet",
            PaymentMethod::Postponed => "postponed",
            PaymentMethod::Discount => "discount",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "bank_a" | "banka" => Ok(PaymentMethod::BankA),
            "bank_other" | "bankother" => Ok(PaymentMethod::BankOther),
            "mobile_wallet" | "mobilewallet" | "wallet" => Ok(PaymentMethod::MobileWallet),
            "postponed" | "credit" => Ok(PaymentMethod::Postponed),
            "discount" => Ok(PaymentMethod::Discount),
            _ => Err(ValidationError::NotAllowed {
                field: "payment method".to_string(),
                allowed: PaymentMethod::TENDERS
                    .iter()
                    .chain(std::iter::once(&PaymentMethod::Discount))
                    .map(|m| m.as_str().to_string())
                    .collect(),
            }),
        }
    }
}

// =============================================================================
// Payment Entry
// =============================================================================

/// A payment line as submitted with an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentEntry {
    pub method: PaymentMethod,
    pub amount: Money,
}

impl PaymentEntry {
    #[inline]
    pub fn new(method: PaymentMethod, amount: Money) -> Self {
        PaymentEntry { method, amount }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
