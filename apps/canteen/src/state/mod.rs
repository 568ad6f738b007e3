//! # State Module
//!
//! Application state, one type per concern.
//!
//! ## Why Multiple State Types?
//! Instead of a single `AppState` struct containing everything, commands
//! take exactly the state they need as explicit arguments. Independent
//! states never block each other.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      AppContext (lib.rs)                        │   │
//! │  │  built once at startup, cloned into tasks                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │                                          │
//! │       ┌───────────────┬──────┴────────┬────────────────┐               │
//! │       ▼               ▼               ▼                ▼                │
//! │  ┌──────────┐  ┌──────────────┐  ┌─────────────┐  ┌──────────────┐     │
//! │  │ DbState  │  │  CartStore   │  │ ConfigState │  │ SessionState │     │
//! │  │          │  │              │  │             │  │              │     │
//! │  │ Database │  │ Arc<Mutex<   │  │ tax rate    │  │ RwLock<      │     │
//! │  │ (SQLite  │  │   Cart>>     │  │ prep window │  │  Option<User>│     │
//! │  │  pool)   │  │ + cart.json  │  │ currency    │  │ > + intro    │     │
//! │  └──────────┘  └──────────────┘  └─────────────┘  └──────────────┘     │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • DbState: Database has internal connection pool (thread-safe)        │
//! │  • CartStore: Protected by Arc<Mutex<T>> for exclusive access          │
//! │  • ConfigState: Read-only after initialization                         │
//! │  • SessionState: tokio RwLock, read by every wallet command            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod config;
mod db;
mod session;
pub mod storage;

pub use cart::CartStore;
pub use config::ConfigState;
pub use db::DbState;
pub use session::SessionState;
pub use storage::{DurableSlot, SlotError};
