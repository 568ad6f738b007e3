//! # Demo Fixtures
//!
//! The canteen's starter data: categories, a menu, three users with
//! opening wallet deposits, and a stocked pantry. Used by the `seed` binary
//! and by the app when it starts on an empty in-memory database.

use chrono::Utc;
use tracing::info;

use crate::error::DbResult;
use crate::pool::Database;
use crate::repository::wallet::LedgerEntry;
use canteen_core::{
    Category, MenuItem, Money, NewInventoryItem, TransactionType, UserRole,
};

/// What [`seed_demo_data`] inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub categories: usize,
    pub menu_items: usize,
    pub users: usize,
    pub inventory_items: usize,
}

impl SeedReport {
    pub fn is_empty(&self) -> bool {
        *self == SeedReport::default()
    }
}

const CATEGORIES: &[(&str, &str, &str)] = &[
    ("south-indian", "South Indian", "Dosas, idlis and more"),
    ("north-indian", "North Indian", "Thalis, curries and breads"),
    ("snacks", "Snacks", "Quick bites between classes"),
    ("beverages", "Beverages", "Hot and cold drinks"),
    ("desserts", "Desserts", "Something sweet"),
];

/// (category, name, description, price in rupees, veg, spicy, prep minutes, ingredients, tags)
type MenuFixture = (
    &'static str,
    &'static str,
    &'static str,
    i64,
    bool,
    bool,
    i64,
    &'static [&'static str],
    &'static [&'static str],
);

const MENU: &[MenuFixture] = &[
    ("south-indian", "Masala Dosa", "Crisp dosa with spiced potato", 80, true, false, 12, &["rice", "urad dal", "potato"], &["popular"]),
    ("south-indian", "Idli Sambar", "Two idlis with sambar and chutney", 60, true, false, 8, &["rice", "urad dal", "toor dal"], &["breakfast"]),
    ("south-indian", "Medu Vada", "Crisp lentil fritters", 50, true, false, 10, &["urad dal", "curry leaves"], &[]),
    ("north-indian", "Veg Thali", "Dal, sabzi, rice, two rotis", 120, true, false, 15, &["rice", "wheat", "toor dal"], &["meal"]),
    ("north-indian", "Chole Bhature", "Spiced chickpeas with fried bread", 100, true, true, 15, &["chickpeas", "maida"], &["popular"]),
    ("north-indian", "Chicken Biryani", "Dum biryani with raita", 150, false, true, 20, &["basmati rice", "chicken", "yogurt"], &["bestseller"]),
    ("snacks", "Samosa", "Two potato samosas", 30, true, true, 5, &["maida", "potato", "peas"], &[]),
    ("snacks", "Vada Pav", "Mumbai style", 25, true, true, 5, &["potato", "besan", "pav"], &["quick"]),
    ("beverages", "Masala Chai", "Ginger cardamom tea", 15, true, false, 3, &["tea", "milk", "ginger"], &["hot"]),
    ("beverages", "Cold Coffee", "Blended with ice cream", 60, true, false, 5, &["coffee", "milk", "ice cream"], &["cold"]),
    ("desserts", "Gulab Jamun", "Two pieces, served warm", 40, true, false, 3, &["khoya", "sugar"], &[]),
];

/// (name, email, role, opening deposit in rupees)
const USERS: &[(&str, &str, UserRole, i64)] = &[
    ("Asha Verma", "asha@campus.edu", UserRole::Student, 500),
    ("Ravi Kumar", "ravi@campus.edu", UserRole::Staff, 0),
    ("Meera Iyer", "meera@campus.edu", UserRole::Admin, 0),
];

/// (name, unit, stock, threshold, unit price in rupees)
const INVENTORY: &[(&str, &str, i64, i64, i64)] = &[
    ("Rice", "kg", 50, 10, 45),
    ("Urad Dal", "kg", 8, 10, 120),
    ("Toor Dal", "kg", 15, 5, 110),
    ("Potato", "kg", 30, 10, 30),
    ("Milk", "litre", 5, 5, 60),
    ("Chicken", "kg", 12, 4, 240),
    ("Cooking Oil", "litre", 20, 6, 150),
    ("Tea Leaves", "kg", 2, 1, 400),
];

/// Inserts the demo data unless the menu already has items.
///
/// ## Returns
/// What was inserted; empty when the database was already seeded.
pub async fn seed_demo_data(db: &Database) -> DbResult<SeedReport> {
    if db.menu().count().await? > 0 {
        info!("Database already seeded");
        return Ok(SeedReport::default());
    }

    let mut report = SeedReport::default();

    for (sort_order, (id, name, description)) in CATEGORIES.iter().enumerate() {
        db.menu()
            .insert_category(&Category {
                id: id.to_string(),
                name: name.to_string(),
                description: Some(description.to_string()),
                sort_order: sort_order as i64,
            })
            .await?;
        report.categories += 1;
    }

    let now = Utc::now();
    for (index, (category, name, description, rupees, veg, spicy, prep, ingredients, tags)) in
        MENU.iter().enumerate()
    {
        db.menu()
            .insert_item(&MenuItem {
                id: format!("menu-{:03}", index + 1),
                name: name.to_string(),
                description: description.to_string(),
                price: Money::from_rupees(*rupees),
                category_id: category.to_string(),
                is_available: true,
                is_vegetarian: *veg,
                is_spicy: *spicy,
                prep_time_minutes: *prep,
                ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
                tags: tags.iter().map(|s| s.to_string()).collect(),
                rating: Some(4.0 + (index % 10) as f64 / 10.0),
                created_at: now,
                updated_at: now,
            })
            .await?;
        report.menu_items += 1;
    }

    for (name, email, role, deposit) in USERS {
        let user = db.wallet().create_user(name, email, *role).await?;
        if *deposit > 0 {
            db.wallet()
                .add_transaction(LedgerEntry {
                    user_id: &user.id,
                    kind: TransactionType::Deposit,
                    amount: Money::from_rupees(*deposit),
                    description: "Opening balance",
                    order_id: None,
                })
                .await?;
        }
        report.users += 1;
    }

    for (name, unit, stock, threshold, rupees) in INVENTORY {
        db.inventory()
            .add(NewInventoryItem {
                name: name.to_string(),
                unit: unit.to_string(),
                current_stock: *stock,
                low_stock_threshold: *threshold,
                unit_price: Money::from_rupees(*rupees),
            })
            .await?;
        report.inventory_items += 1;
    }

    info!(
        categories = report.categories,
        menu_items = report.menu_items,
        users = report.users,
        inventory_items = report.inventory_items,
        "Demo data seeded"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let first = seed_demo_data(&db).await.unwrap();
        assert_eq!(first.menu_items, MENU.len());
        assert_eq!(first.users, USERS.len());

        let second = seed_demo_data(&db).await.unwrap();
        assert!(second.is_empty());
        assert_eq!(db.menu().count().await.unwrap(), MENU.len() as i64);
    }

    #[tokio::test]
    async fn test_seeded_wallet_matches_log() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_demo_data(&db).await.unwrap();

        let asha = db.wallet().find_by_email("asha@campus.edu").await.unwrap().unwrap();
        assert_eq!(asha.wallet_balance, Money::from_rupees(500));
        assert_eq!(
            db.wallet().recompute_balance(&asha.id).await.unwrap(),
            asha.wallet_balance
        );
    }

    #[tokio::test]
    async fn test_seeded_pantry_has_low_stock() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_demo_data(&db).await.unwrap();

        let low: Vec<String> = db
            .inventory()
            .list_low_stock()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(low, vec!["Milk".to_string(), "Urad Dal".to_string()]);
    }
}
