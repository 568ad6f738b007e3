//! # Order Poller
//!
//! Keeps the order screens fresh by re-running an order query on a fixed
//! interval and publishing the latest result.
//!
//! ```text
//! ┌──────────────────────┐   every N secs   ┌──────────────────────────┐
//! │  background task     │ ───────────────► │ db.orders().list_*()     │
//! │  (tokio::spawn)      │ ◄─────────────── │                          │
//! └──────────┬───────────┘    Vec<Order>    └──────────────────────────┘
//!            │ send_replace (only on success)
//!            ▼
//!     watch::channel ───► subscribers (kitchen board, "my orders")
//! ```
//!
//! A failed query is logged and the previous snapshot stays published.
//! Dropping the poller stops the task.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::state::DbState;
use canteen_core::Order;
use canteen_db::DbResult;

/// Which orders a poller watches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderQuery {
    /// Every order, newest first.
    All,
    /// Non-terminal orders, oldest first (kitchen board).
    Active,
    /// One purchaser's orders, newest first.
    ByUser(String),
}

impl OrderQuery {
    async fn run(&self, db: &DbState) -> DbResult<Vec<Order>> {
        let orders = db.inner().orders();
        match self {
            OrderQuery::All => orders.list().await,
            OrderQuery::Active => orders.list_active().await,
            OrderQuery::ByUser(user_id) => orders.list_by_user(user_id).await,
        }
    }
}

/// Handle to a running poll loop.
#[derive(Debug)]
pub struct OrderPoller {
    snapshot: watch::Receiver<Vec<Order>>,
    task: JoinHandle<()>,
}

impl OrderPoller {
    /// Starts polling. The first query runs immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(db: DbState, query: OrderQuery, every: Duration) -> Self {
        let (tx, rx) = watch::channel(Vec::new());

        let task = tokio::spawn(async move {
            info!(?query, ?every, "Order poller starting");
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                match query.run(&db).await {
                    Ok(orders) => {
                        debug!(?query, count = orders.len(), "Orders polled");
                        tx.send_replace(orders);
                    }
                    Err(e) => error!(?query, error = %e, "Order poll failed"),
                }
            }
        });

        OrderPoller { snapshot: rx, task }
    }

    /// A receiver that sees every new snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Order>> {
        self.snapshot.clone()
    }

    /// The most recent snapshot.
    pub fn latest(&self) -> Vec<Order> {
        self.snapshot.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stops polling. Subscribers keep the last snapshot.
    pub fn stop(&self) {
        if !self.task.is_finished() {
            self.task.abort();
            info!("Order poller stopped");
        }
    }
}

impl Drop for OrderPoller {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::billing::{create_counter_sale, CounterLine};
    use crate::commands::test_support::app;
    use canteen_core::{OrderStatus, PaymentMethod};

    const TICK: Duration = Duration::from_millis(20);
    const WAIT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_picks_up_new_orders() {
        let app = app().await;
        let poller = OrderPoller::spawn(app.db.clone(), OrderQuery::All, TICK);
        let mut rx = poller.subscribe();

        create_counter_sale(
            &app.db,
            &app.config,
            &[CounterLine {
                menu_item_id: "menu-009".to_string(),
                quantity: 2,
            }],
            PaymentMethod::Cash,
            None,
        )
        .await
        .unwrap();

        tokio::time::timeout(WAIT, rx.wait_for(|orders| orders.len() == 1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(poller.latest()[0].status, OrderStatus::Delivered);
    }

    #[tokio::test]
    async fn test_active_query_skips_terminal_orders() {
        let app = app().await;
        create_counter_sale(
            &app.db,
            &app.config,
            &[CounterLine {
                menu_item_id: "menu-009".to_string(),
                quantity: 1,
            }],
            PaymentMethod::Cash,
            None,
        )
        .await
        .unwrap();

        let poller = OrderPoller::spawn(app.db.clone(), OrderQuery::Active, TICK);
        tokio::time::sleep(TICK * 5).await;
        assert!(poller.latest().is_empty());
    }

    #[tokio::test]
    async fn test_failed_poll_keeps_snapshot() {
        let app = app().await;
        create_counter_sale(
            &app.db,
            &app.config,
            &[CounterLine {
                menu_item_id: "menu-001".to_string(),
                quantity: 1,
            }],
            PaymentMethod::Card,
            None,
        )
        .await
        .unwrap();

        let poller = OrderPoller::spawn(app.db.clone(), OrderQuery::All, TICK);
        let mut rx = poller.subscribe();
        tokio::time::timeout(WAIT, rx.wait_for(|orders| orders.len() == 1))
            .await
            .unwrap()
            .unwrap();

        app.db.inner().close().await;
        tokio::time::sleep(TICK * 5).await;

        assert!(poller.is_running());
        assert_eq!(poller.latest().len(), 1);
    }

    #[tokio::test]
    async fn test_stop() {
        let app = app().await;
        let poller = OrderPoller::spawn(app.db.clone(), OrderQuery::All, TICK);
        poller.stop();
        tokio::time::sleep(TICK).await;
        assert!(!poller.is_running());
    }
}
