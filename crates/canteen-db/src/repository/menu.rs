//! # Menu Repository
//!
//! Database operations for categories and menu items.
//!
//! ## Key Operations
//! - Listing the menu (all items, or only what can be ordered now)
//! - Availability toggling by staff
//! - Create / partial update / delete for menu management
//!
//! `ingredients` and `tags` are stored as JSON text arrays.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use canteen_core::{Category, CoreError, MenuItem, MenuItemUpdate, Money, NewMenuItem};

/// Raw `menu_items` row.
#[derive(Debug, FromRow)]
struct MenuItemRow {
    id: String,
    name: String,
    description: String,
    price: i64,
    category_id: String,
    is_available: bool,
    is_vegetarian: bool,
    is_spicy: bool,
    prep_time_minutes: i64,
    ingredients: String,
    tags: String,
    rating: Option<f64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MenuItemRow> for MenuItem {
    type Error = DbError;

    fn try_from(row: MenuItemRow) -> DbResult<Self> {
        Ok(MenuItem {
            id: row.id,
            name: row.name,
            description: row.description,
            price: Money::from_paise(row.price),
            category_id: row.category_id,
            is_available: row.is_available,
            is_vegetarian: row.is_vegetarian,
            is_spicy: row.is_spicy,
            prep_time_minutes: row.prep_time_minutes,
            ingredients: serde_json::from_str(&row.ingredients)?,
            tags: serde_json::from_str(&row.tags)?,
            rating: row.rating,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct CategoryRow {
    id: String,
    name: String,
    description: Option<String>,
    sort_order: i64,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            description: row.description,
            sort_order: row.sort_order,
        }
    }
}

const SELECT_ITEM: &str = r#"
    SELECT
        id, name, description, price, category_id,
        is_available, is_vegetarian, is_spicy, prep_time_minutes,
        ingredients, tags, rating, created_at, updated_at
    FROM menu_items
"#;

/// Repository for menu database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = MenuRepository::new(pool);
///
/// let menu = repo.list_items().await?;
/// let dosa = repo.set_availability("item-id", false).await?;
/// ```
#[derive(Debug, Clone)]
pub struct MenuRepository {
    pool: SqlitePool,
}

impl MenuRepository {
    /// Creates a new MenuRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MenuRepository { pool }
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Lists categories in display order.
    pub async fn list_categories(&self) -> DbResult<Vec<Category>> {
        let rows: Vec<CategoryRow> = sqlx::query_as(
            "SELECT id, name, description, sort_order FROM categories ORDER BY sort_order, name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// Inserts a category.
    pub async fn insert_category(&self, category: &Category) -> DbResult<()> {
        debug!(id = %category.id, name = %category.name, "Inserting category");

        sqlx::query(
            "INSERT INTO categories (id, name, description, sort_order) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.sort_order)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // =========================================================================
    // Menu Items
    // =========================================================================

    /// Lists every menu item, available or not, ordered by name.
    pub async fn list_items(&self) -> DbResult<Vec<MenuItem>> {
        let sql = format!("{} ORDER BY name", SELECT_ITEM);
        let rows: Vec<MenuItemRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        rows.into_iter().map(MenuItem::try_from).collect()
    }

    /// Lists items shoppers can order right now.
    pub async fn list_available(&self) -> DbResult<Vec<MenuItem>> {
        let sql = format!("{} WHERE is_available = 1 ORDER BY name", SELECT_ITEM);
        let rows: Vec<MenuItemRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        rows.into_iter().map(MenuItem::try_from).collect()
    }

    /// Gets a menu item by ID.
    ///
    /// ## Returns
    /// * `Ok(Some(item))` - Item found
    /// * `Ok(None)` - Item not found
    pub async fn get_item(&self, id: &str) -> DbResult<Option<MenuItem>> {
        let sql = format!("{} WHERE id = ?1", SELECT_ITEM);
        let row: Option<MenuItemRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(MenuItem::try_from).transpose()
    }

    /// Gets a menu item by ID, failing with `NotFound` when absent.
    pub async fn require_item(&self, id: &str) -> DbResult<MenuItem> {
        self.get_item(id)
            .await?
            .ok_or_else(|| DbError::not_found("MenuItem", id))
    }

    /// Inserts a fully-formed menu item.
    pub async fn insert_item(&self, item: &MenuItem) -> DbResult<()> {
        debug!(id = %item.id, name = %item.name, "Inserting menu item");

        sqlx::query(
            r#"
            INSERT INTO menu_items (
                id, name, description, price, category_id,
                is_available, is_vegetarian, is_spicy, prep_time_minutes,
                ingredients, tags, rating, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9,
                ?10, ?11, ?12, ?13, ?14
            )
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price.paise())
        .bind(&item.category_id)
        .bind(item.is_available)
        .bind(item.is_vegetarian)
        .bind(item.is_spicy)
        .bind(item.prep_time_minutes)
        .bind(serde_json::to_string(&item.ingredients)?)
        .bind(serde_json::to_string(&item.tags)?)
        .bind(item.rating)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Creates a menu item from user input. New items start available.
    pub async fn create_item(&self, new_item: NewMenuItem) -> DbResult<MenuItem> {
        let now = Utc::now();
        let item = MenuItem {
            id: Uuid::new_v4().to_string(),
            name: new_item.name,
            description: new_item.description,
            price: new_item.price,
            category_id: new_item.category_id,
            is_available: true,
            is_vegetarian: new_item.is_vegetarian,
            is_spicy: new_item.is_spicy,
            prep_time_minutes: new_item.prep_time_minutes,
            ingredients: new_item.ingredients,
            tags: new_item.tags,
            rating: None,
            created_at: now,
            updated_at: now,
        };

        self.insert_item(&item).await?;
        info!(id = %item.id, name = %item.name, "Menu item created");
        Ok(item)
    }

    /// Sets whether an item can be ordered.
    ///
    /// ## Errors
    /// `NotFound` if the item doesn't exist.
    pub async fn set_availability(&self, id: &str, available: bool) -> DbResult<MenuItem> {
        debug!(id = %id, available, "Setting menu item availability");

        let result = sqlx::query("UPDATE menu_items SET is_available = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(available)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("MenuItem", id));
        }

        self.require_item(id).await
    }

    /// Applies a partial update.
    ///
    /// ## What This Does
    /// Read, merge and write happen in one transaction.
    ///
    /// ## Errors
    /// - `NotFound` if the item doesn't exist
    /// - `Rule(Validation)` for an invalid field; nothing is written
    pub async fn update_item(&self, id: &str, update: MenuItemUpdate) -> DbResult<MenuItem> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("{} WHERE id = ?1", SELECT_ITEM);
        let row: Option<MenuItemRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let mut item = match row {
            Some(row) => MenuItem::try_from(row)?,
            None => return Err(DbError::not_found("MenuItem", id)),
        };

        update
            .apply(&mut item, Utc::now())
            .map_err(CoreError::from)?;

        sqlx::query(
            r#"
            UPDATE menu_items SET
                name = ?2, description = ?3, price = ?4, category_id = ?5,
                is_available = ?6, is_vegetarian = ?7, is_spicy = ?8,
                prep_time_minutes = ?9, ingredients = ?10, tags = ?11,
                updated_at = ?12
            WHERE id = ?1
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price.paise())
        .bind(&item.category_id)
        .bind(item.is_available)
        .bind(item.is_vegetarian)
        .bind(item.is_spicy)
        .bind(item.prep_time_minutes)
        .bind(serde_json::to_string(&item.ingredients)?)
        .bind(serde_json::to_string(&item.tags)?)
        .bind(item.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(id = %item.id, "Menu item updated");
        Ok(item)
    }

    /// Deletes a menu item. Past orders keep their snapshots.
    ///
    /// ## Errors
    /// `NotFound` if the item doesn't exist.
    pub async fn delete_item(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM menu_items WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("MenuItem", id));
        }

        info!(id = %id, "Menu item deleted");
        Ok(())
    }

    /// Counts menu items.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM menu_items")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use canteen_core::{Category, MenuItemUpdate, Money, NewMenuItem};

    async fn setup() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.menu()
            .insert_category(&Category {
                id: "south-indian".to_string(),
                name: "South Indian".to_string(),
                description: None,
                sort_order: 1,
            })
            .await
            .unwrap();
        db
    }

    fn dosa() -> NewMenuItem {
        NewMenuItem {
            name: "Masala Dosa".to_string(),
            description: "Crisp dosa with potato filling".to_string(),
            price: Money::from_rupees(80),
            category_id: "south-indian".to_string(),
            is_vegetarian: true,
            is_spicy: false,
            prep_time_minutes: 10,
            ingredients: vec!["rice".to_string(), "potato".to_string()],
            tags: vec!["popular".to_string()],
        }
    }

    #[tokio::test]
    async fn test_create_and_get_item() {
        let db = setup().await;
        let created = db.menu().create_item(dosa()).await.unwrap();

        let fetched = db.menu().get_item(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.price, Money::from_rupees(80));
        assert!(fetched.is_available);
        assert_eq!(fetched.ingredients, vec!["rice", "potato"]);
        assert_eq!(db.menu().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_set_availability() {
        let db = setup().await;
        let created = db.menu().create_item(dosa()).await.unwrap();

        let updated = db.menu().set_availability(&created.id, false).await.unwrap();
        assert!(!updated.is_available);
        assert!(db.menu().list_available().await.unwrap().is_empty());
        assert_eq!(db.menu().list_items().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_set_availability_unknown_item() {
        let db = setup().await;
        let result = db.menu().set_availability("missing", true).await;
        assert!(matches!(result, Err(crate::DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_and_delete_item() {
        let db = setup().await;
        let created = db.menu().create_item(dosa()).await.unwrap();

        let updated = db
            .menu()
            .update_item(
                &created.id,
                MenuItemUpdate {
                    price: Some(Money::from_rupees(90)),
                    is_spicy: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.price, Money::from_rupees(90));
        assert!(updated.is_spicy);
        assert_eq!(updated.name, "Masala Dosa");

        db.menu().delete_item(&created.id).await.unwrap();
        assert!(db.menu().get_item(&created.id).await.unwrap().is_none());
        assert!(db.menu().delete_item(&created.id).await.is_err());
    }

    #[tokio::test]
    async fn test_list_categories() {
        let db = setup().await;
        let categories = db.menu().list_categories().await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "South Indian");
    }
}
