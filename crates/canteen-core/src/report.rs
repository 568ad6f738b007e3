//! # Sales Reports
//!
//! Summaries for the billing screen, computed from a list of orders.
//! Cancelled orders are counted but never contribute to revenue.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Order, OrderStatus, PaymentMethod};

/// Totals over a set of orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesSummary {
    pub order_count: usize,
    /// Count per status, in lifecycle order. Statuses with no orders are omitted.
    pub status_counts: Vec<(OrderStatus, usize)>,
    /// Sum of totals of non-cancelled orders.
    pub revenue: Money,
    /// Tax portion of `revenue`.
    pub tax_collected: Money,
    /// Revenue per payment method. Methods with no revenue are omitted.
    pub revenue_by_method: Vec<(PaymentMethod, Money)>,
}

const METHODS: [PaymentMethod; 4] = [
    PaymentMethod::Cash,
    PaymentMethod::Card,
    PaymentMethod::Upi,
    PaymentMethod::Wallet,
];

/// Builds a [`SalesSummary`].
pub fn summarize_sales(orders: &[Order]) -> SalesSummary {
    let billable: Vec<&Order> = orders
        .iter()
        .filter(|o| o.status != OrderStatus::Cancelled)
        .collect();

    let status_counts = OrderStatus::ALL
        .iter()
        .map(|s| (*s, orders.iter().filter(|o| o.status == *s).count()))
        .filter(|(_, n)| *n > 0)
        .collect();

    let revenue_by_method = METHODS
        .iter()
        .map(|m| {
            let sum: Money = billable
                .iter()
                .filter(|o| o.payment_method == *m)
                .map(|o| o.total)
                .sum();
            (*m, sum)
        })
        .filter(|(_, sum)| !sum.is_zero())
        .collect();

    SalesSummary {
        order_count: orders.len(),
        status_counts,
        revenue: billable.iter().map(|o| o.total).sum(),
        tax_collected: billable.iter().map(|o| o.tax).sum(),
        revenue_by_method,
    }
}
