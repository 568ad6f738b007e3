//! # Cart Commands
//!
//! Commands for cart manipulation. Every command returns the full
//! [`CartSummary`] so the UI can redraw from one response.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Checkout │────►│  Order   │       │
//! │  │  Cart    │     │          │     │          │     │ (pending)│       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │        ▲               │                 │                              │
//! │        │          add_to_cart        checkout                          │
//! │        │          update_cart_item   (order.rs)                        │
//! │        │          remove_from_cart       │                              │
//! │        │               │                 │                              │
//! │        │               ▼                 │                              │
//! │        └──────── clear_cart ◄────────────┘ (on success)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::debug;

use crate::error::ApiResult;
use crate::state::{CartStore, ConfigState, DbState};
use canteen_core::cart::CartSummary;
use canteen_core::CoreError;

/// Gets the current cart contents and totals.
pub fn get_cart(cart: &CartStore, config: &ConfigState) -> CartSummary {
    debug!("get_cart command");
    cart.with_cart(|c| c.summary(config.tax_rate()))
}

/// Adds a menu item to the cart.
///
/// ## Behavior
/// - If the item is already in the cart: quantity increases
/// - Otherwise: appended with a snapshot of the current menu entry
///   (price is frozen from here on)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  add_to_cart("menu-001", Some(2))                                       │
/// │                    │                                                    │
/// │                    ▼                                                    │
/// │  ┌────────────────────────────────────────────────────────────────┐    │
/// │  │  1. Load the menu item (current price, availability)          │    │
/// │  │  2. Sold out? ─── VALIDATION_FAILED                           │    │
/// │  │  3. Merge into the cart, persist the slot                     │    │
/// │  │  4. Return the recomputed summary                             │    │
/// │  └────────────────────────────────────────────────────────────────┘    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// ## Arguments
/// * `menu_item_id` - Menu item to add
/// * `quantity` - Quantity to add (default: 1)
pub async fn add_to_cart(
    db: &DbState,
    cart: &CartStore,
    config: &ConfigState,
    menu_item_id: &str,
    quantity: Option<i64>,
) -> ApiResult<CartSummary> {
    let quantity = quantity.unwrap_or(1);
    debug!(menu_item_id, quantity, "add_to_cart command");

    let item = db.inner().menu().require_item(menu_item_id).await?;
    if !item.is_available {
        return Err(CoreError::ItemUnavailable { name: item.name }.into());
    }

    cart.with_cart_mut(|c| c.add_item(&item, quantity))?;
    Ok(get_cart(cart, config))
}

/// Sets the quantity of a cart line.
///
/// ## Behavior
/// - `quantity <= 0` removes the line
/// - An item that isn't in the cart is ignored
pub fn update_cart_item(
    cart: &CartStore,
    config: &ConfigState,
    menu_item_id: &str,
    quantity: i64,
) -> ApiResult<CartSummary> {
    debug!(menu_item_id, quantity, "update_cart_item command");
    cart.with_cart_mut(|c| c.update_quantity(menu_item_id, quantity))?;
    Ok(get_cart(cart, config))
}

/// Removes a line from the cart. Unknown items are ignored.
pub fn remove_from_cart(cart: &CartStore, config: &ConfigState, menu_item_id: &str) -> CartSummary {
    debug!(menu_item_id, "remove_from_cart command");
    cart.with_cart_mut(|c| c.remove_item(menu_item_id));
    get_cart(cart, config)
}

/// Empties the cart.
pub fn clear_cart(cart: &CartStore, config: &ConfigState) -> CartSummary {
    debug!("clear_cart command");
    cart.with_cart_mut(|c| c.clear());
    get_cart(cart, config)
}
