//! # Menu Commands
//!
//! Browsing the menu and the staff-side menu maintenance.

use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::state::DbState;
use canteen_core::validation::validate_new_menu_item;
use canteen_core::{Category, MenuItem, MenuItemUpdate, NewMenuItem};

/// Lists menu items.
///
/// ## Arguments
/// * `available_only` - Hide items the kitchen has run out of
pub async fn list_menu_items(db: &DbState, available_only: bool) -> ApiResult<Vec<MenuItem>> {
    debug!(available_only, "list_menu_items command");
    let menu = db.inner().menu();
    let items = if available_only {
        menu.list_available().await?
    } else {
        menu.list_items().await?
    };
    Ok(items)
}

/// Lists menu categories in display order.
pub async fn list_categories(db: &DbState) -> ApiResult<Vec<Category>> {
    debug!("list_categories command");
    Ok(db.inner().menu().list_categories().await?)
}

/// Marks an item as available or sold out.
///
/// Items already sitting in carts keep their snapshot; the flag is checked
/// again when something new is added.
pub async fn set_item_availability(
    db: &DbState,
    menu_item_id: &str,
    available: bool,
) -> ApiResult<MenuItem> {
    debug!(menu_item_id, available, "set_item_availability command");
    let item = db.inner().menu().set_availability(menu_item_id, available).await?;
    info!(id = %item.id, name = %item.name, available, "Menu item availability changed");
    Ok(item)
}

/// Adds a dish to the menu.
///
/// ## Errors
/// `VALIDATION_FAILED` for a blank name, a price below zero or above
/// `MAX_PRICE`, or a negative prep time.
pub async fn create_menu_item(db: &DbState, new_item: NewMenuItem) -> ApiResult<MenuItem> {
    debug!(name = %new_item.name, "create_menu_item command");
    validate_new_menu_item(&new_item).map_err(|e| ApiError::validation(e.to_string()))?;
    Ok(db.inner().menu().create_item(new_item).await?)
}

/// Edits a dish. Only the provided fields change.
pub async fn update_menu_item(
    db: &DbState,
    menu_item_id: &str,
    update: MenuItemUpdate,
) -> ApiResult<MenuItem> {
    debug!(menu_item_id, "update_menu_item command");
    Ok(db.inner().menu().update_item(menu_item_id, update).await?)
}

/// Removes a dish from the menu. Past orders keep their snapshots.
pub async fn delete_menu_item(db: &DbState, menu_item_id: &str) -> ApiResult<()> {
    debug!(menu_item_id, "delete_menu_item command");
    db.inner().menu().delete_item(menu_item_id).await?;
    Ok(())
}
