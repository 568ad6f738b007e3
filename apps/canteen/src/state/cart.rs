//! # Cart State
//!
//! Holds the shopper's cart and mirrors it to a durable slot.
//!
//! ## Thread Safety
//! The cart is wrapped in `Arc<Mutex<T>>` because:
//! 1. Multiple commands may access/modify the cart
//! 2. Only one command should modify the cart at a time
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  UI Action                Command                 Cart State Change     │
//! │  ─────────                ───────                 ─────────────────     │
//! │                                                                         │
//! │  Tap "Add" ──────────────► add_to_cart() ───────► line.qty += n / push │
//! │                                                                         │
//! │  Change Quantity ────────► update_cart_item() ──► line.qty = n         │
//! │                                                                         │
//! │  Tap Remove ─────────────► remove_from_cart() ──► lines.remove(i)      │
//! │                                                                         │
//! │  Checkout / Clear ───────► clear_cart() ────────► lines.clear()        │
//! │                                                                         │
//! │  View Cart ──────────────► get_cart() ──────────► (read only)          │
//! │                                                                         │
//! │  Every write ends with slot.write(lines) while the lock is held.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error};

use super::storage::DurableSlot;
use canteen_core::cart::{Cart, CartLine};

/// Cart plus the slot it is persisted to.
#[derive(Debug, Clone)]
pub struct CartStore {
    cart: Arc<Mutex<Cart>>,
    slot: Option<DurableSlot<Vec<CartLine>>>,
}

impl CartStore {
    /// A cart that lives only in memory.
    pub fn new() -> Self {
        CartStore {
            cart: Arc::new(Mutex::new(Cart::new())),
            slot: None,
        }
    }

    /// Restores the cart from `slot`; later mutations are written back to it.
    pub fn restore(slot: DurableSlot<Vec<CartLine>>) -> Self {
        let cart = Cart::from_lines(slot.read());
        debug!(lines = cart.item_count(), path = %slot.path().display(), "Cart restored");
        CartStore {
            cart: Arc::new(Mutex::new(cart)),
            slot: Some(slot),
        }
    }

    /// Executes a function with read access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let summary = cart_store.with_cart(|cart| cart.summary(config.tax_rate()));
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.lock();
        f(&cart)
    }

    /// Executes a function with write access to the cart, then persists it.
    ///
    /// The slot is written even when `f` returns an error; a rejected
    /// mutation leaves the lines unchanged, so the write is a no-op.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// cart_store.with_cart_mut(|cart| cart.add_item(&item, 1))?;
    /// ```
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.lock();
        let result = f(&mut cart);
        self.persist(&cart);
        result
    }

    // A panic inside a closure leaves the cart in a valid state: every Cart
    // method checks before it writes.
    fn lock(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, cart: &Cart) {
        if let Some(slot) = &self.slot {
            if let Err(e) = slot.write(&cart.lines().to_vec()) {
                error!(error = %e, "Failed to persist cart");
            }
        }
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}
