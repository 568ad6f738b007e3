//! # Inventory Repository
//!
//! Database operations for stocked ingredients and supplies.
//!
//! Partial updates run read-merge-write inside one transaction; the merge
//! rules (restock timestamp, no negative stock) live in
//! [`canteen_core::inventory::InventoryUpdate::apply`].

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use canteen_core::inventory::{low_stock_items, InventoryUpdate, StockAdjustment};
use canteen_core::{InventoryItem, Money, NewInventoryItem};

#[derive(Debug, FromRow)]
struct InventoryRow {
    id: String,
    name: String,
    unit: String,
    current_stock: i64,
    low_stock_threshold: i64,
    unit_price: i64,
    last_restocked: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<InventoryRow> for InventoryItem {
    fn from(row: InventoryRow) -> Self {
        InventoryItem {
            id: row.id,
            name: row.name,
            unit: row.unit,
            current_stock: row.current_stock,
            low_stock_threshold: row.low_stock_threshold,
            unit_price: Money::from_paise(row.unit_price),
            last_restocked: row.last_restocked,
            updated_at: row.updated_at,
        }
    }
}

const SELECT_INVENTORY: &str = r#"
    SELECT
        id, name, unit, current_stock, low_stock_threshold,
        unit_price, last_restocked, updated_at
    FROM inventory_items
"#;

/// Repository for inventory database operations.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    /// Creates a new InventoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// Lists all inventory items by name.
    pub async fn list(&self) -> DbResult<Vec<InventoryItem>> {
        let sql = format!("{} ORDER BY name", SELECT_INVENTORY);
        let rows: Vec<InventoryRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(InventoryItem::from).collect())
    }

    /// Items at or below their restock threshold.
    pub async fn list_low_stock(&self) -> DbResult<Vec<InventoryItem>> {
        Ok(low_stock_items(&self.list().await?))
    }

    /// Gets an item by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<InventoryItem>> {
        let mut conn = self.pool.acquire().await?;
        fetch_in(&mut conn, id).await
    }

    /// Adds a new item. The creation time counts as the first restock.
    pub async fn add(&self, new_item: NewInventoryItem) -> DbResult<InventoryItem> {
        let now = Utc::now();
        let item = InventoryItem {
            id: Uuid::new_v4().to_string(),
            name: new_item.name,
            unit: new_item.unit,
            current_stock: new_item.current_stock,
            low_stock_threshold: new_item.low_stock_threshold,
            unit_price: new_item.unit_price,
            last_restocked: now,
            updated_at: now,
        };

        debug!(id = %item.id, name = %item.name, "Inserting inventory item");

        sqlx::query(
            r#"
            INSERT INTO inventory_items (
                id, name, unit, current_stock, low_stock_threshold,
                unit_price, last_restocked, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(&item.unit)
        .bind(item.current_stock)
        .bind(item.low_stock_threshold)
        .bind(item.unit_price.paise())
        .bind(item.last_restocked)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        info!(id = %item.id, name = %item.name, "Inventory item added");
        Ok(item)
    }

    /// Merges a partial update into an item.
    ///
    /// ## Errors
    /// - `NotFound` if the item doesn't exist
    /// - `Rule(..)` for negative stock or other invalid fields
    pub async fn update(&self, id: &str, update: InventoryUpdate) -> DbResult<InventoryItem> {
        let mut tx = self.pool.begin().await?;

        let mut item = fetch_in(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("InventoryItem", id))?;
        let before = item.current_stock;

        update.apply(&mut item, Utc::now())?;
        write_in(&mut tx, &item).await?;
        tx.commit().await?;

        info!(
            id = %item.id,
            from = before,
            to = item.current_stock,
            "Inventory item updated"
        );
        Ok(item)
    }

    /// Applies a stock delta or absolute count.
    ///
    /// ## Errors
    /// - `NotFound` if the item doesn't exist
    /// - `Rule(NegativeStock)` when the result would be below zero
    /// - `Rule(Validation)` when a delta overflows the stock count
    pub async fn adjust_stock(
        &self,
        id: &str,
        adjustment: StockAdjustment,
    ) -> DbResult<InventoryItem> {
        let mut tx = self.pool.begin().await?;

        let mut item = fetch_in(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("InventoryItem", id))?;

        adjustment.to_update(&item)?.apply(&mut item, Utc::now())?;
        write_in(&mut tx, &item).await?;
        tx.commit().await?;

        info!(id = %item.id, ?adjustment, stock = item.current_stock, "Stock adjusted");
        Ok(item)
    }
}

async fn fetch_in(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<InventoryItem>> {
    let sql = format!("{} WHERE id = ?1", SELECT_INVENTORY);
    let row: Option<InventoryRow> = sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.map(InventoryItem::from))
}

async fn write_in(conn: &mut SqliteConnection, item: &InventoryItem) -> DbResult<()> {
    sqlx::query(
        r#"
        UPDATE inventory_items SET
            name = ?2, unit = ?3, current_stock = ?4, low_stock_threshold = ?5,
            unit_price = ?6, last_restocked = ?7, updated_at = ?8
        WHERE id = ?1
        "#,
    )
    .bind(&item.id)
    .bind(&item.name)
    .bind(&item.unit)
    .bind(item.current_stock)
    .bind(item.low_stock_threshold)
    .bind(item.unit_price.paise())
    .bind(item.last_restocked)
    .bind(item.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
