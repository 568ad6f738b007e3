//! # Commands Module
//!
//! One async function per UI action. Each takes the state it needs as
//! explicit arguments and returns `ApiResult<T>`.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (exports)
//! ├── menu.rs       ◄─── Menu listing, availability, CRUD
//! ├── cart.rs       ◄─── Cart manipulation
//! ├── order.rs      ◄─── Checkout, order queries, status changes
//! ├── billing.rs    ◄─── Counter sales and the sales summary
//! ├── inventory.rs  ◄─── Stock, low-stock alerts, waste
//! ├── wallet.rs     ◄─── Balance, history, top-up, withdrawal
//! └── session.rs    ◄─── Sign in/out, intro splash flag
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  UI                                                                     │
//! │  ──                                                                     │
//! │  add_to_cart(&ctx.db, &ctx.cart, &ctx.config, "menu-001", Some(2))     │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Command                                                                │
//! │  ───────                                                                │
//! │  pub async fn add_to_cart(                                              │
//! │      db: &DbState,            ◄── only the state it needs              │
//! │      cart: &CartStore,                                                  │
//! │      config: &ConfigState,                                              │
//! │      menu_item_id: &str,                                                │
//! │      quantity: Option<i64>,                                             │
//! │  ) -> ApiResult<CartSummary>                                            │
//! │         │                                                               │
//! │         │ canteen-core rules, canteen-db repositories                   │
//! │         ▼                                                               │
//! │  UI receives: CartSummary or ApiError { code, message }                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod billing;
pub mod cart;
pub mod inventory;
pub mod menu;
pub mod order;
pub mod session;
pub mod wallet;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::state::{CartStore, ConfigState, DbState, SessionState};
    use canteen_db::{seed_demo_data, Database, DbConfig};

    /// Seeded in-memory database, memory-only cart, nobody signed in.
    pub struct TestApp {
        pub db: DbState,
        pub cart: CartStore,
        pub config: ConfigState,
        pub session: SessionState,
    }

    pub async fn app() -> TestApp {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_demo_data(&db).await.unwrap();
        TestApp {
            db: DbState::new(db),
            cart: CartStore::new(),
            config: ConfigState::default(),
            session: SessionState::new(),
        }
    }

    impl TestApp {
        /// Signs in the seeded student (₹500 opening balance).
        pub async fn sign_in_student(&self) -> String {
            let user = self
                .db
                .inner()
                .wallet()
                .find_by_email("asha@campus.edu")
                .await
                .unwrap()
                .unwrap();
            let id = user.id.clone();
            self.session.sign_in(user).await;
            id
        }
    }
}
