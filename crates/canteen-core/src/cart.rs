//! # Cart
//!
//! A shopper's in-progress selection.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Operation                  Effect                                      │
//! │  ─────────                  ──────                                      │
//! │  add_item(item, 2)          line exists? qty += 2 : push new line       │
//! │  update_quantity(id, 3)     qty = 3   (qty <= 0 removes the line)       │
//! │  remove_item(id)            drop line if present                        │
//! │  clear()                    no lines                                    │
//! │                                                                         │
//! │  summary(rate) ──► calculate_bill() ──► subtotal / tax / total         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - One line per distinct menu item id, in the order first added
//! - Every line has quantity >= 1
//! - At most [`MAX_CART_ITEMS`] lines, each at most [`MAX_ITEM_QUANTITY`]

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::{calculate_bill, Bill};
use crate::types::{MenuItem, TaxRate};
use crate::validation::validate_quantity;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// A menu item snapshot and how many of it the shopper wants.
///
/// The snapshot freezes the price the shopper saw when adding the item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub item: MenuItem,
    pub quantity: i64,
}

impl CartLine {
    /// unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.item.price.multiply_quantity(self.quantity)
    }
}

/// The shopping cart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Rebuilds a cart from persisted lines.
    ///
    /// Lines with a non-positive quantity and repeated item ids are dropped,
    /// so a hand-edited or stale slot cannot break the invariants.
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let mut cart = Cart::new();
        for line in lines {
            if line.quantity < 1 || cart.contains(&line.item.id) {
                continue;
            }
            if cart.lines.len() >= MAX_CART_ITEMS {
                break;
            }
            cart.lines.push(CartLine {
                quantity: line.quantity.min(MAX_ITEM_QUANTITY),
                item: line.item,
            });
        }
        cart
    }

    /// Adds `quantity` of `item`, merging into an existing line.
    ///
    /// ## Errors
    /// - `Validation` if `quantity` is not positive
    /// - `QuantityTooLarge` if the line would exceed the per-item maximum
    /// - `CartTooLarge` if a new line would exceed the line limit
    pub fn add_item(&mut self, item: &MenuItem, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;

        if let Some(line) = self.lines.iter_mut().find(|l| l.item.id == item.id) {
            let new_qty = line.quantity + quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            line.quantity = new_qty;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.lines.push(CartLine {
            item: item.clone(),
            quantity,
        });
        Ok(())
    }

    /// Sets the quantity of a line exactly.
    ///
    /// ## Behavior
    /// - `quantity <= 0`: same as [`Cart::remove_item`]
    /// - item not in cart: no-op
    pub fn update_quantity(&mut self, item_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            self.remove_item(item_id);
            return Ok(());
        }

        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.item.id == item_id) {
            line.quantity = quantity;
        }
        Ok(())
    }

    /// Removes a line. Returns whether anything was removed.
    pub fn remove_item(&mut self, item_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.item.id != item_id);
        self.lines.len() != before
    }

    /// Takes checked-out quantities out of the cart.
    ///
    /// Each `(item_id, quantity)` lowers the matching line; lines that reach
    /// zero are removed. Anything added after the checkout snapshot stays.
    pub fn remove_ordered<'a, I>(&mut self, ordered: I)
    where
        I: IntoIterator<Item = (&'a str, i64)>,
    {
        for (item_id, quantity) in ordered {
            if let Some(line) = self.lines.iter_mut().find(|l| l.item.id == item_id) {
                line.quantity -= quantity;
            }
        }
        self.lines.retain(|l| l.quantity > 0);
    }

    /// Clears all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.lines.iter().any(|l| l.item.id == item_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct items.
    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    /// Sum of quantities across lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Bill for the current lines.
    pub fn bill(&self, rate: TaxRate) -> Bill {
        calculate_bill(
            self.lines.iter().map(|l| (l.item.price, l.quantity)),
            rate,
        )
    }

    /// Full derived view for the frontend.
    pub fn summary(&self, rate: TaxRate) -> CartSummary {
        let bill = self.bill(rate);
        CartSummary {
            lines: self.lines.clone(),
            item_count: self.item_count(),
            total_quantity: self.total_quantity(),
            subtotal: bill.subtotal,
            tax: bill.tax,
            total: bill.total,
        }
    }
}

/// Cart lines plus totals, recomputed after every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartSummary {
    pub lines: Vec<CartLine>,
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}
