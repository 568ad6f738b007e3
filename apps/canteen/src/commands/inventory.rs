//! # Inventory Commands
//!
//! Back-office stock management and waste tracking.
//!
//! Waste is recorded for costing only; it never changes stock. Staff
//! adjust stock separately after a physical count.

use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};
use crate::state::DbState;
use canteen_core::inventory::{InventoryUpdate, StockAdjustment, WasteDraft, WasteSummary};
use canteen_core::validation::validate_new_inventory_item;
use canteen_core::{InventoryItem, NewInventoryItem, WasteRecord};

/// All inventory items by name.
pub async fn list_inventory(db: &DbState) -> ApiResult<Vec<InventoryItem>> {
    debug!("list_inventory command");
    Ok(db.inner().inventory().list().await?)
}

/// Items at or below their restock threshold.
pub async fn list_low_stock(db: &DbState) -> ApiResult<Vec<InventoryItem>> {
    debug!("list_low_stock command");
    let low = db.inner().inventory().list_low_stock().await?;
    if !low.is_empty() {
        warn!(count = low.len(), "Inventory items need restocking");
    }
    Ok(low)
}

/// Adds a new inventory item.
pub async fn add_inventory_item(
    db: &DbState,
    new_item: NewInventoryItem,
) -> ApiResult<InventoryItem> {
    debug!(name = %new_item.name, "add_inventory_item command");
    validate_new_inventory_item(&new_item).map_err(|e| ApiError::validation(e.to_string()))?;
    Ok(db.inner().inventory().add(new_item).await?)
}

/// Edits an item. Raising the stock counts as a restock.
pub async fn update_inventory_item(
    db: &DbState,
    item_id: &str,
    update: InventoryUpdate,
) -> ApiResult<InventoryItem> {
    debug!(item_id, "update_inventory_item command");
    Ok(db.inner().inventory().update(item_id, update).await?)
}

/// Adds to, removes from, or overwrites the stock count.
///
/// ## Errors
/// `VALIDATION_FAILED` when the stock would go below zero.
pub async fn adjust_stock(
    db: &DbState,
    item_id: &str,
    adjustment: StockAdjustment,
) -> ApiResult<InventoryItem> {
    debug!(item_id, ?adjustment, "adjust_stock command");
    Ok(db.inner().inventory().adjust_stock(item_id, adjustment).await?)
}

/// Waste records, newest first.
pub async fn list_waste_records(db: &DbState) -> ApiResult<Vec<WasteRecord>> {
    debug!("list_waste_records command");
    Ok(db.inner().waste().list().await?)
}

/// Records wasted stock and prices it from the inventory.
pub async fn record_waste(db: &DbState, draft: WasteDraft) -> ApiResult<WasteRecord> {
    debug!(item_name = %draft.item_name, quantity = draft.quantity, "record_waste command");
    Ok(db.inner().waste().record(draft).await?)
}

/// Total and per-item waste cost.
pub async fn waste_summary(db: &DbState) -> ApiResult<WasteSummary> {
    debug!("waste_summary command");
    Ok(db.inner().waste().summary().await?)
}
