//! # canteen-db: Database Layer for the Campus Canteen
//!
//! This crate is the data-access boundary of the canteen. It uses SQLite
//! (in-memory by default, or a file) with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Canteen Data Flow                                │
//! │                                                                         │
//! │  App command (checkout)                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    canteen-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (order.rs)   │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │    │ MenuRepo      │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │◄───│ OrderRepo     │    │              │  │   │
//! │  │   │ Management    │    │ WalletRepo    │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   sqlite::memory:  or  <data dir>/canteen.db                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`fixtures`] - Demo data for development and the in-memory default
//! - [`repository`] - Repository implementations (menu, order, wallet, etc.)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use canteen_db::{Database, DbConfig};
//!
//! // In-memory database, migrated on connect
//! let db = Database::new(DbConfig::in_memory()).await?;
//!
//! // Use repositories
//! let menu = db.menu().list_available().await?;
//! let order = db.orders().transition(&order_id, OrderStatus::Ready).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod fixtures;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use fixtures::{seed_demo_data, SeedReport};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::inventory::InventoryRepository;
pub use repository::menu::MenuRepository;
pub use repository::order::OrderRepository;
pub use repository::wallet::{LedgerEntry, WalletRepository};
pub use repository::waste::WasteRepository;
