//! # Waste Repository
//!
//! Append-only waste records. Cost is priced from the matching inventory
//! item when the record is written and never recalculated. Stock is left
//! untouched.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::DbResult;
use crate::repository::inventory::InventoryRepository;
use canteen_core::inventory::{summarize_waste, waste_cost, WasteDraft, WasteSummary};
use canteen_core::{Money, WasteRecord};

#[derive(Debug, FromRow)]
struct WasteRow {
    id: String,
    inventory_item_id: Option<String>,
    item_name: String,
    quantity: i64,
    reason: String,
    cost: i64,
    recorded_at: DateTime<Utc>,
}

impl From<WasteRow> for WasteRecord {
    fn from(row: WasteRow) -> Self {
        WasteRecord {
            id: row.id,
            inventory_item_id: row.inventory_item_id,
            item_name: row.item_name,
            quantity: row.quantity,
            reason: row.reason,
            cost: Money::from_paise(row.cost),
            recorded_at: row.recorded_at,
        }
    }
}

/// Repository for waste records.
#[derive(Debug, Clone)]
pub struct WasteRepository {
    pool: SqlitePool,
}

impl WasteRepository {
    /// Creates a new WasteRepository.
    pub fn new(pool: SqlitePool) -> Self {
        WasteRepository { pool }
    }

    /// All waste records, newest first.
    pub async fn list(&self) -> DbResult<Vec<WasteRecord>> {
        let rows: Vec<WasteRow> = sqlx::query_as(
            r#"
            SELECT id, inventory_item_id, item_name, quantity, reason, cost, recorded_at
            FROM waste_records
            ORDER BY recorded_at DESC, rowid DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(WasteRecord::from).collect())
    }

    /// Records waste.
    ///
    /// ## Cost Lookup
    /// ```text
    /// draft.inventory_item_id given?  ── yes ──► match by id
    ///                                 └─ no ───► match by exact name
    /// matched?  ── yes ──► cost = quantity × unit_price
    ///           └─ no ───► cost = 0 (logged)
    /// ```
    ///
    /// ## Errors
    /// `Rule(Validation)` for a blank name or reason, quantity <= 0, or a
    /// cost too large to store.
    pub async fn record(&self, draft: WasteDraft) -> DbResult<WasteRecord> {
        draft.validate()?;

        let items = InventoryRepository::new(self.pool.clone()).list().await?;
        let matched = draft.match_item(&items);

        let (inventory_item_id, cost) = match matched {
            Some(item) => (Some(item.id.clone()), waste_cost(draft.quantity, item.unit_price)?),
            None => {
                warn!(item_name = %draft.item_name, "Waste has no matching inventory item; cost is zero");
                (None, Money::zero())
            }
        };

        let record = WasteRecord {
            id: Uuid::new_v4().to_string(),
            inventory_item_id,
            item_name: draft.item_name,
            quantity: draft.quantity,
            reason: draft.reason,
            cost,
            recorded_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO waste_records (
                id, inventory_item_id, item_name, quantity, reason, cost, recorded_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&record.id)
        .bind(&record.inventory_item_id)
        .bind(&record.item_name)
        .bind(record.quantity)
        .bind(&record.reason)
        .bind(record.cost.paise())
        .bind(record.recorded_at)
        .execute(&self.pool)
        .await?;

        info!(
            id = %record.id,
            item_name = %record.item_name,
            quantity = record.quantity,
            cost = %record.cost,
            "Waste recorded"
        );
        Ok(record)
    }

    /// Totals over every recorded waste entry.
    pub async fn summary(&self) -> DbResult<WasteSummary> {
        Ok(summarize_waste(&self.list().await?))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::DbError;
    use canteen_core::NewInventoryItem;

    async fn setup() -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let milk = db
            .inventory()
            .add(NewInventoryItem {
                name: "Milk".to_string(),
                unit: "litre".to_string(),
                current_stock: 20,
                low_stock_threshold: 5,
                unit_price: Money::from_rupees(60),
            })
            .await
            .unwrap();
        (db, milk.id)
    }

    fn draft(name: &str, id: Option<String>, qty: i64) -> WasteDraft {
        WasteDraft {
            inventory_item_id: id,
            item_name: name.to_string(),
            quantity: qty,
            reason: "Spoiled".to_string(),
        }
    }

    #[tokio::test]
    async fn test_cost_from_matching_item_and_stock_untouched() {
        let (db, milk_id) = setup().await;

        let record = db.waste().record(draft("Milk", None, 3)).await.unwrap();
        assert_eq!(record.cost, Money::from_rupees(180));
        assert_eq!(record.inventory_item_id.as_deref(), Some(milk_id.as_str()));

        let milk = db.inventory().get(&milk_id).await.unwrap().unwrap();
        assert_eq!(milk.current_stock, 20);
    }

    #[tokio::test]
    async fn test_match_by_id_wins_over_name() {
        let (db, milk_id) = setup().await;
        let record = db
            .waste()
            .record(draft("Leftover milk", Some(milk_id), 2))
            .await
            .unwrap();
        assert_eq!(record.cost, Money::from_rupees(120));
    }

    #[tokio::test]
    async fn test_unmatched_waste_costs_zero() {
        let (db, _) = setup().await;
        let record = db.waste().record(draft("Bread", None, 4)).await.unwrap();
        assert!(record.cost.is_zero());
        assert!(record.inventory_item_id.is_none());
    }

    #[tokio::test]
    async fn test_invalid_draft_rejected() {
        let (db, _) = setup().await;
        let result = db.waste().record(draft("Milk", None, 0)).await;
        assert!(matches!(result, Err(DbError::Rule(_))));
        assert!(db.waste().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_summary() {
        let (db, _) = setup().await;
        db.waste().record(draft("Milk", None, 1)).await.unwrap();
        db.waste().record(draft("Milk", None, 2)).await.unwrap();

        let summary = db.waste().summary().await.unwrap();
        assert_eq!(summary.record_count, 2);
        assert_eq!(summary.total_cost, Money::from_rupees(180));
        assert_eq!(db.waste().list().await.unwrap().len(), 2);
    }
}
