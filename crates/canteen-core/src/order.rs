//! # Order Lifecycle
//!
//! Order drafts, line snapshots, order numbers and the status state machine.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  State       Valid next states                                          │
//! │  ─────       ─────────────────                                          │
//! │  pending     confirmed, cancelled                                       │
//! │  confirmed   preparing, cancelled                                       │
//! │  preparing   ready, cancelled                                           │
//! │  ready       delivered, cancelled                                       │
//! │  delivered   (terminal)                                                 │
//! │  cancelled   (terminal)                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two ways to change status exist on purpose:
//! - [`check_transition`] enforces the table (kitchen screen, shopper cancel)
//! - lenient updates accept any status, for staff correcting mistakes
//!
//! Counter sales are *created* in `delivered` with payment completed. That is
//! a creation, not a transition, and never goes through the table.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::{calculate_bill, Bill};
use crate::types::{
    MenuItem, Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus, TaxRate,
};
use crate::cart::CartLine;
use crate::validation::{validate_name, validate_quantity};

// =============================================================================
// State Machine
// =============================================================================

impl OrderStatus {
    /// Statuses reachable in one step from `self`.
    pub fn next_states(&self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Pending => &[OrderStatus::Confirmed, OrderStatus::Cancelled],
            OrderStatus::Confirmed => &[OrderStatus::Preparing, OrderStatus::Cancelled],
            OrderStatus::Preparing => &[OrderStatus::Ready, OrderStatus::Cancelled],
            OrderStatus::Ready => &[OrderStatus::Delivered, OrderStatus::Cancelled],
            OrderStatus::Delivered | OrderStatus::Cancelled => &[],
        }
    }

    /// Whether a strict transition from `self` to `next` is allowed.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        self.next_states().contains(&next)
    }

    /// Delivered and cancelled orders never change again.
    pub fn is_terminal(&self) -> bool {
        self.next_states().is_empty()
    }

    /// The forward (non-cancel) step, used by the kitchen "advance" button.
    pub fn forward(&self) -> Option<OrderStatus> {
        self.next_states()
            .iter()
            .copied()
            .find(|s| *s != OrderStatus::Cancelled)
    }
}

/// Validates a strict status change.
///
/// ## Errors
/// `InvalidStatusTransition` when `to` is not in `from.next_states()`.
pub fn check_transition(order_id: &str, from: OrderStatus, to: OrderStatus) -> CoreResult<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(CoreError::InvalidStatusTransition {
            order_id: order_id.to_string(),
            from,
            to,
        })
    }
}

// =============================================================================
// Drafts
// =============================================================================

/// Who the order is for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Purchaser {
    pub user_id: String,
    pub name: String,
}

/// One requested line before it is frozen into an [`OrderItem`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DraftLine {
    pub menu_item_id: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
}

impl DraftLine {
    pub fn from_menu_item(item: &MenuItem, quantity: i64) -> Self {
        DraftLine {
            menu_item_id: item.id.clone(),
            name: item.name.clone(),
            unit_price: item.price,
            quantity,
        }
    }
}

impl From<&CartLine> for DraftLine {
    fn from(line: &CartLine) -> Self {
        DraftLine::from_menu_item(&line.item, line.quantity)
    }
}

/// Everything needed to create an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderDraft {
    pub purchaser: Purchaser,
    pub lines: Vec<DraftLine>,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
}

impl OrderDraft {
    /// A shopper checkout: pending, with the given payment status.
    pub fn checkout(
        purchaser: Purchaser,
        lines: Vec<DraftLine>,
        payment_method: PaymentMethod,
        payment_status: PaymentStatus,
    ) -> Self {
        OrderDraft {
            purchaser,
            lines,
            payment_method,
            status: OrderStatus::Pending,
            payment_status,
            notes: None,
        }
    }

    /// A walk-up counter sale: delivered and paid on creation.
    pub fn counter_sale(
        purchaser: Purchaser,
        lines: Vec<DraftLine>,
        payment_method: PaymentMethod,
    ) -> Self {
        OrderDraft {
            purchaser,
            lines,
            payment_method,
            status: OrderStatus::Delivered,
            payment_status: PaymentStatus::Completed,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes.filter(|n| !n.trim().is_empty());
        self
    }

    /// Bill for the draft lines.
    pub fn bill(&self, rate: TaxRate) -> Bill {
        calculate_bill(self.lines.iter().map(|l| (l.unit_price, l.quantity)), rate)
    }

    /// Checks the draft can become an order.
    ///
    /// ## Errors
    /// - `EmptyCart` with no lines
    /// - `Validation` for a bad purchaser name or line quantity
    pub fn validate(&self) -> CoreResult<()> {
        if self.lines.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        validate_name("purchaser name", &self.purchaser.name)?;
        for line in &self.lines {
            validate_quantity(line.quantity)?;
        }
        Ok(())
    }

    /// Freezes the draft into an [`Order`].
    ///
    /// ## What This Does
    /// 1. Validates the draft
    /// 2. Snapshots each line (name, price, quantity, subtotal)
    /// 3. Computes the bill once with [`calculate_bill`]
    /// 4. Stamps `created_at = now`, `estimated_ready_at = now + prep_window`
    ///
    /// `order_number` comes from the caller, which owns the daily sequence.
    pub fn into_order(
        self,
        order_number: String,
        rate: TaxRate,
        prep_window: Duration,
        now: DateTime<Utc>,
    ) -> CoreResult<Order> {
        self.validate()?;

        let bill = self.bill(rate);
        let order_id = Uuid::new_v4().to_string();

        let items = self
            .lines
            .into_iter()
            .map(|line| OrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: order_id.clone(),
                subtotal: line.unit_price.multiply_quantity(line.quantity),
                menu_item_id: line.menu_item_id,
                name: line.name,
                unit_price: line.unit_price,
                quantity: line.quantity,
            })
            .collect();

        Ok(Order {
            id: order_id,
            order_number,
            user_id: self.purchaser.user_id,
            user_name: self.purchaser.name,
            items,
            subtotal: bill.subtotal,
            tax: bill.tax,
            total: bill.total,
            status: self.status,
            payment_method: self.payment_method,
            payment_status: self.payment_status,
            notes: self.notes,
            created_at: now,
            estimated_ready_at: now + prep_window,
            updated_at: now,
        })
    }
}

/// Formats an order number: `ORD-YYYYMMDD-NNNN`.
///
/// `sequence` is the 1-based count of orders placed that day.
///
/// ## Example
/// ```rust
/// use canteen_core::order::format_order_number;
/// use chrono::{TimeZone, Utc};
///
/// let day = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
/// assert_eq!(format_order_number(day, 42), "ORD-20260301-0042");
/// ```
pub fn format_order_number(now: DateTime<Utc>, sequence: u32) -> String {
    format!("ORD-{}-{:04}", now.format("%Y%m%d"), sequence)
}

/// Prefix shared by every order number of the given day.
pub fn order_number_prefix(now: DateTime<Utc>) -> String {
    format!("ORD-{}-", now.format("%Y%m%d"))
}
