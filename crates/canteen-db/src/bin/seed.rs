//! # Seed Data Generator
//!
//! Populates a canteen database file with the demo menu, users and pantry.
//!
//! ## Usage
//! ```bash
//! # Seed the default development database
//! cargo run -p canteen-db --bin seed
//!
//! # Specify database path
//! cargo run -p canteen-db --bin seed -- --db ./data/canteen.db
//! ```
//!
//! Seeding is skipped when the menu already has items.

use std::env;

use canteen_db::{seed_demo_data, Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let mut db_path = "./canteen_dev.db".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Campus Canteen Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./canteen_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Campus Canteen Seed Data Generator");
    println!("=====================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let report = seed_demo_data(&db).await?;
    if report.is_empty() {
        println!("⚠ Database already has a menu");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("✓ {} categories", report.categories);
    println!("✓ {} menu items", report.menu_items);
    println!("✓ {} users", report.users);
    println!("✓ {} inventory items", report.inventory_items);

    let low = db.inventory().list_low_stock().await?;
    println!();
    println!("Low stock: {}", low.len());
    for item in low {
        println!("  {} ({} {})", item.name, item.current_stock, item.unit);
    }

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
