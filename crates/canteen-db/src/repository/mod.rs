//! # Repository Module
//!
//! Database repository implementations for the canteen.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  App command                                                           │
//! │       │                                                                 │
//! │       │  db.orders().transition(id, Ready)                             │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── create(&self, draft, rate, prep_window)                           │
//! │  ├── require(&self, id)                                                │
//! │  ├── set_status(&self, id, status)                                     │
//! │  └── transition(&self, id, status)                                     │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • Easy to test (mock the repository)                                  │
//! │  • SQL is isolated in one place                                        │
//! │  • Stands where a remote API gateway would                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`menu::MenuRepository`] - Categories and menu items
//! - [`order::OrderRepository`] - Orders, snapshots and status changes
//! - [`wallet::WalletRepository`] - Users, balances and the transaction log
//! - [`inventory::InventoryRepository`] - Stock levels and partial updates
//! - [`waste::WasteRepository`] - Waste records and their cost

pub mod inventory;
pub mod menu;
pub mod order;
pub mod wallet;
pub mod waste;
