//! # Campus Canteen Application Library
//!
//! Application layer of the campus canteen: startup, state, and one command
//! function per UI action.
//!
//! ## Module Organization
//! ```text
//! canteen_app/
//! ├── lib.rs          ◄─── You are here (startup & AppContext)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── db.rs       ◄─── Database state wrapper
//! │   ├── cart.rs     ◄─── Cart store (Mutex + durable slot)
//! │   ├── storage.rs  ◄─── JSON file slots
//! │   ├── session.rs  ◄─── Signed-in user, intro flag
//! │   └── config.rs   ◄─── Configuration state
//! ├── commands/       ◄─── menu, cart, order, billing, inventory, wallet, session
//! ├── poller.rs       ◄─── Background order refresh
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## State Management (Multiple State Types)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    AppContext                                           │
//! │                                                                         │
//! │  ┌────────────┐ ┌────────────────┐ ┌──────────────┐ ┌───────────────┐  │
//! │  │  DbState   │ │   CartStore    │ │ ConfigState  │ │ SessionState  │  │
//! │  │            │ │                │ │              │ │               │  │
//! │  │ • Pool     │ │ • Cart lines   │ │ • Tax rate   │ │ • User        │  │
//! │  │ • Repos    │ │ • cart.json    │ │ • Prep window│ │ • Intro seen  │  │
//! │  └────────────┘ └────────────────┘ └──────────────┘ └───────────────┘  │
//! │                                                                         │
//! │  Each command only takes the state it needs.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod poller;
pub mod state;

use std::path::PathBuf;

use directories::ProjectDirs;
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use poller::{OrderPoller, OrderQuery};
use state::storage::{CART_SLOT_FILE, CART_SLOT_KEY};
use state::{CartStore, ConfigState, DbState, DurableSlot, SessionState};
use canteen_db::{seed_demo_data, Database, DbConfig, DbError};

/// Failure during startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Could not determine app data directory")]
    NoDataDir,
}

/// Everything the commands need, built once at startup.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub db: DbState,
    pub cart: CartStore,
    pub config: ConfigState,
    pub session: SessionState,
}

impl AppContext {
    /// Builds the application state.
    ///
    /// ## Startup Sequence
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────────┐
    /// │                       Application Startup                               │
    /// │                                                                         │
    /// │  1. Open Database ────────────────────────────────────────────────────► │
    /// │     • CANTEEN_DB_PATH set: SQLite file, WAL mode                        │
    /// │     • otherwise: private in-memory database                             │
    /// │     • Run pending migrations                                            │
    /// │                                                                         │
    /// │  2. Seed Demo Data (only when the menu is empty) ─────────────────────► │
    /// │                                                                         │
    /// │  3. Restore Cart ─────────────────────────────────────────────────────► │
    /// │     • <data dir>/cart.json, key "canteen-cart"                          │
    /// │     • missing/corrupt: empty cart                                       │
    /// │                                                                         │
    /// │  4. Empty Session (nobody signed in, intro not seen) ─────────────────► │
    /// └─────────────────────────────────────────────────────────────────────────┘
    /// ```
    pub async fn build(config: ConfigState) -> Result<Self, StartupError> {
        let db_config = match &config.database_path {
            Some(path) => DbConfig::new(path),
            None => DbConfig::in_memory(),
        };
        let db = Database::new(db_config).await?;
        info!(path = ?config.database_path, "Database connected and migrations applied");

        let seeded = seed_demo_data(&db).await?;
        if !seeded.is_empty() {
            info!(menu_items = seeded.menu_items, users = seeded.users, "Demo data loaded");
        }

        let slot = DurableSlot::new(data_dir(&config)?.join(CART_SLOT_FILE), CART_SLOT_KEY);
        let cart = CartStore::restore(slot);

        Ok(AppContext {
            db: DbState::new(db),
            cart,
            config,
            session: SessionState::new(),
        })
    }

    /// Starts the kitchen board refresh loop.
    pub fn kitchen_poller(&self) -> OrderPoller {
        OrderPoller::spawn(self.db.clone(), OrderQuery::Active, self.config.poll_interval())
    }
}

/// Runs the application until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    init_tracing();

    info!("Starting Campus Canteen");

    let config = ConfigState::from_env();
    let ctx = AppContext::build(config).await?;
    let poller = ctx.kitchen_poller();

    info!(
        canteen = %ctx.config.canteen_name,
        tax_rate_bps = ctx.config.tax_rate_bps,
        cart_lines = ctx.cart.with_cart(|c| c.item_count()),
        "Ready"
    );

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Cannot listen for Ctrl-C, shutting down");
    }

    poller.stop();
    ctx.db.inner().close().await;
    info!("Campus Canteen stopped");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=canteen_db=trace` - Trace the database crate only
/// - Default: INFO, DEBUG for the canteen crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,canteen=debug,sqlx=warn"));

    // A second call (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Directory for client-local state.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/edu.campus.canteen`
/// - **Windows**: `%APPDATA%\campus\canteen\data`
/// - **Linux**: `~/.local/share/canteen`
///
/// `CANTEEN_DATA_DIR` overrides it.
fn data_dir(config: &ConfigState) -> Result<PathBuf, StartupError> {
    if let Some(dir) = &config.data_dir {
        return Ok(dir.clone());
    }

    let proj_dirs = ProjectDirs::from("edu", "campus", "canteen").ok_or(StartupError::NoDataDir)?;
    Ok(proj_dirs.data_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cart::add_to_cart;
    use tempfile::TempDir;

    fn scratch_config(dir: &TempDir) -> ConfigState {
        ConfigState {
            data_dir: Some(dir.path().to_path_buf()),
            ..ConfigState::default()
        }
    }

    #[tokio::test]
    async fn test_build_seeds_and_starts_empty() {
        let dir = TempDir::new().unwrap();
        let ctx = AppContext::build(scratch_config(&dir)).await.unwrap();
        assert!(ctx.db.inner().menu().count().await.unwrap() > 0);
        assert!(ctx.cart.with_cart(|c| c.is_empty()));
        assert!(ctx.session.current_user().await.is_none());
    }

    #[tokio::test]
    async fn test_cart_survives_rebuild() {
        let dir = TempDir::new().unwrap();
        let config = scratch_config(&dir);

        let first = AppContext::build(config.clone()).await.unwrap();
        add_to_cart(&first.db, &first.cart, &first.config, "menu-001", Some(2))
            .await
            .unwrap();

        // New in-memory database, same data directory
        let second = AppContext::build(config).await.unwrap();
        assert_eq!(second.cart.with_cart(|c| c.total_quantity()), 2);
    }
}
