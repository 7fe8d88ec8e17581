//! # Sales Summary
//!
//! Revenue reconciliation over completed orders, for the orders table and
//! the accountant report.
//!
//! ```text
//! gross     = ticket revenue + meal revenue
//! net       = gross − discounts
//! collected = Σ tenders (cash, banks, wallet, postponed)
//! difference = net − collected        → 0.00 when the books balance
//! ```
//!
//! Postponed payments count as collected (the order is settled on credit)
//! and are also reported on their own line.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use ts_rs::TS;

use crate::money::Money;
use crate::reconciler::CONFIRM_TOLERANCE;
use crate::types::{PaymentEntry, PaymentMethod};

/// An order as the backend reports it after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CompletedOrder {
    pub order_id: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub ticket_revenue: Money,
    pub meal_revenue: Money,
    pub payments: Vec<PaymentEntry>,
}

impl CompletedOrder {
    pub fn discount(&self) -> Money {
        self.payments
            .iter()
            .filter(|p| p.method == PaymentMethod::Discount)
            .map(|p| p.amount)
            .sum()
    }

    pub fn tendered(&self) -> Money {
        self.payments
            .iter()
            .filter(|p| p.method.is_tender())
            .map(|p| p.amount)
            .sum()
    }

    pub fn net(&self) -> Money {
        self.ticket_revenue + self.meal_revenue - self.discount()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesSummary {
    pub order_count: usize,
    pub ticket_revenue: Money,
    pub meal_revenue: Money,
    pub gross: Money,
    pub discount_total: Money,
    pub net: Money,
    /// One entry per tender that collected anything, ordered by method.
    pub by_method: Vec<PaymentEntry>,
    pub collected: Money,
    /// Part of `collected` taken on credit.
    pub postponed: Money,
    /// `net − collected`.
    pub difference: Money,
    /// Orders whose own payments miss their net by more than 0.01.
    pub unbalanced_orders: Vec<i64>,
}

impl SalesSummary {
    /// Summarizes a set of orders.
    pub fn from_orders<'a>(orders: impl IntoIterator<Item = &'a CompletedOrder>) -> Self {
        let mut summary = SalesSummary::default();
        let mut by_method: BTreeMap<PaymentMethod, Money> = BTreeMap::new();

        for order in orders {
            summary.order_count += 1;
            summary.ticket_revenue += order.ticket_revenue;
            summary.meal_revenue += order.meal_revenue;

            for payment in &order.payments {
                if payment.method.is_tender() {
                    *by_method.entry(payment.method).or_default() += payment.amount;
                } else {
                    summary.discount_total += payment.amount;
                }
            }

            if (order.net() - order.tendered()).abs() > CONFIRM_TOLERANCE {
                warn!(
                    order_id = order.order_id,
                    net = %order.net(),
                    tendered = %order.tendered(),
                    "Order payments do not match its net total"
                );
                summary.unbalanced_orders.push(order.order_id);
            }
        }

        summary.gross = summary.ticket_revenue + summary.meal_revenue;
        summary.net = summary.gross - summary.discount_total;
        summary.collected = by_method.values().sum();
        summary.postponed = by_method
            .get(&PaymentMethod::Postponed)
            .copied()
            .unwrap_or_default();
        summary.difference = summary.net - summary.collected;
        summary.by_method = by_method
            .into_iter()
            .filter(|(_, amount)| !amount.is_zero())
            .map(|(method, amount)| PaymentEntry::new(method, amount))
            .collect();

        summary
    }

    /// Orders created in `[from, to)`.
    pub fn for_period<'a>(
        orders: impl IntoIterator<Item = &'a CompletedOrder>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Self {
        Self::from_orders(
            orders
                .into_iter()
                .filter(|o| o.created_at >= from && o.created_at < to),
        )
    }

    /// Amount collected through one tender.
    pub fn collected_by(&self, method: PaymentMethod) -> Money {
        self.by_method
            .iter()
            .find(|p| p.method == method)
            .map(|p| p.amount)
            .unwrap_or_default()
    }

    /// True when `|net − collected| ≤ 0.01`.
    pub fn is_balanced(&self) -> bool {
        self.difference.abs() <= CONFIRM_TOLERANCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn cents(c: i64) -> Money {
        Money::from_cents(c)
    }

    fn order(id: i64, tickets: i64, meals: i64, payments: &[(PaymentMethod, i64)]) -> CompletedOrder {
        CompletedOrder {
            order_id: id,
            created_at: Utc.with_ymd_and_hms(2026, 7, 1, 10, 0, 0).unwrap() + Duration::hours(id),
            ticket_revenue: cents(tickets),
            meal_revenue: cents(meals),
            payments: payments
                .iter()
                .map(|&(m, a)| PaymentEntry::new(m, cents(a)))
                .collect(),
        }
    }

    #[test]
    fn test_balanced_day() {
        let orders = vec![
            order(1, 15000, 0, &[(PaymentMethod::Cash, 15000)]),
            order(
                2,
                20000,
                2500,
                &[
                    (PaymentMethod::Cash, 12000),
                    (PaymentMethod::MobileWallet, 8000),
                    (PaymentMethod::Discount, 2500),
                ],
            ),
            order(3, 5000, 0, &[(PaymentMethod::Postponed, 5000)]),
        ];

        let summary = SalesSummary::from_orders(&orders);
        assert_eq!(summary.order_count, 3);
        assert_eq!(summary.gross, cents(42500));
        assert_eq!(summary.discount_total, cents(2500));
        assert_eq!(summary.net, cents(40000));
        assert_eq!(summary.collected, cents(40000));
        assert_eq!(summary.collected_by(PaymentMethod::Cash), cents(27000));
        assert_eq!(summary.collected_by(PaymentMethod::BankA), Money::zero());
        assert_eq!(summary.postponed, cents(5000));
        assert_eq!(summary.difference, Money::zero());
        assert!(summary.is_balanced());
        assert!(summary.unbalanced_orders.is_empty());
    }

    #[test]
    fn test_summary_json_uses_major_units() {
        let orders = vec![order(1, 15000, 0, &[(PaymentMethod::Cash, 15000)])];
        let json = serde_json::to_value(SalesSummary::from_orders(&orders)).unwrap();
        assert_eq!(json["net"], 150.0);
        assert_eq!(json["by_method"][0]["amount"], json["collected"]);

        let json = serde_json::to_value(&orders[0]).unwrap();
        assert_eq!(json["ticket_revenue"], json["payments"][0]["amount"]);
    }

    #[test]
    fn test_by_method_is_ordered_and_skips_discount() {
        let orders = vec![order(
            1,
            10000,
            0,
            &[(PaymentMethod::Postponed, 4000), (PaymentMethod::Cash, 6000)],
        )];
        let methods: Vec<PaymentMethod> = SalesSummary::from_orders(&orders)
            .by_method
            .iter()
            .map(|p| p.method)
            .collect();
        assert_eq!(methods, vec![PaymentMethod::Cash, PaymentMethod::Postponed]);
    }

    #[test]
    fn test_unbalanced_order_is_reported() {
        let orders = vec![order(9, 10000, 0, &[(PaymentMethod::Cash, 9000)])];
        let summary = SalesSummary::from_orders(&orders);
        assert_eq!(summary.difference, cents(1000));
        assert!(!summary.is_balanced());
        assert_eq!(summary.unbalanced_orders, vec![9]);
    }

    #[test]
    fn test_for_period() {
        let orders = vec![
            order(1, 1000, 0, &[(PaymentMethod::Cash, 1000)]),
            order(5, 2000, 0, &[(PaymentMethod::Cash, 2000)]),
        ];
        let start = Utc.with_ymd_and_hms(2026, 7, 1, 10, 0, 0).unwrap();
        let summary = SalesSummary::for_period(&orders, start, start + Duration::hours(3));
        assert_eq!(summary.order_count, 1);
        assert_eq!(summary.net, cents(1000));
    }

    #[test]
    fn test_empty() {
        let summary = SalesSummary::from_orders(std::iter::empty());
        assert_eq!(summary, SalesSummary::default());
        assert!(summary.is_balanced());
    }
}
