//! # Order Repository
//!
//! Database operations for orders and their line snapshots.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. CREATE                                                              │
//! │     └── create(draft) → Order { status: pending | delivered }          │
//! │         (one transaction: number, order row, item rows, and the        │
//! │          wallet payment when paid from the wallet)                      │
//! │                                                                         │
//! │  2. PROGRESS                                                            │
//! │     └── transition(id, next)  strict: checks the status table           │
//! │     └── set_status(id, any)   lenient: staff corrections                │
//! │                                                                         │
//! │  3. (OPTIONAL) CANCEL                                                   │
//! │     └── cancel(id) = set_status(id, cancelled)                          │
//! │                                                                         │
//! │  Orders are never deleted.                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Duration, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::wallet::{append_entry, LedgerEntry};
use canteen_core::order::{check_transition, format_order_number, order_number_prefix, OrderDraft};
use canteen_core::{
    Money, Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus, TaxRate, TransactionType,
};

#[derive(Debug, FromRow)]
struct OrderRow {
    id: String,
    order_number: String,
    user_id: String,
    user_name: String,
    subtotal: i64,
    tax: i64,
    total: i64,
    status: OrderStatus,
    payment_method: PaymentMethod,
    payment_status: PaymentStatus,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    estimated_ready_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            order_number: self.order_number,
            user_id: self.user_id,
            user_name: self.user_name,
            items,
            subtotal: Money::from_paise(self.subtotal),
            tax: Money::from_paise(self.tax),
            total: Money::from_paise(self.total),
            status: self.status,
            payment_method: self.payment_method,
            payment_status: self.payment_status,
            notes: self.notes,
            created_at: self.created_at,
            estimated_ready_at: self.estimated_ready_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct OrderItemRow {
    id: String,
    order_id: String,
    menu_item_id: String,
    name: String,
    unit_price: i64,
    quantity: i64,
    subtotal: i64,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            id: row.id,
            order_id: row.order_id,
            menu_item_id: row.menu_item_id,
            name: row.name,
            unit_price: Money::from_paise(row.unit_price),
            quantity: row.quantity,
            subtotal: Money::from_paise(row.subtotal),
        }
    }
}

const SELECT_ORDER: &str = r#"
    SELECT
        id, order_number, user_id, user_name,
        subtotal, tax, total,
        status, payment_method, payment_status, notes,
        created_at, estimated_ready_at, updated_at
    FROM orders
"#;

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Creates an order from a draft.
    ///
    /// ## What This Does
    /// 1. Claims the next order number for today (this also takes the
    ///    database write lock, so concurrent checkouts queue here)
    /// 2. Freezes the draft into an [`Order`] (totals, snapshots, ready time)
    /// 3. For a completed wallet payment, debits the purchaser's wallet
    ///    (fails with `Rule(InsufficientBalance)` when short)
    /// 4. Inserts the order and its items
    ///
    /// All of it commits together or not at all.
    ///
    /// ## Errors
    /// - `Rule(..)` for an invalid draft or insufficient funds
    /// - `NotFound` when a wallet payment names an unknown user
    pub async fn create(
        &self,
        draft: OrderDraft,
        rate: TaxRate,
        prep_window: Duration,
    ) -> DbResult<Order> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // First statement: takes the write lock
        let order_number = claim_order_number(&mut tx, now).await?;
        let order = draft.into_order(order_number, rate, prep_window, now)?;

        if order.payment_method == PaymentMethod::Wallet
            && order.payment_status == PaymentStatus::Completed
        {
            let description = format!("Payment for order {}", order.order_number);
            append_entry(
                &mut tx,
                &LedgerEntry {
                    user_id: &order.user_id,
                    kind: TransactionType::Payment,
                    amount: order.total,
                    description: &description,
                    order_id: Some(&order.id),
                },
                true,
            )
            .await?;
        }

        insert_order(&mut tx, &order).await?;
        tx.commit().await?;

        info!(
            id = %order.id,
            order_number = %order.order_number,
            total = %order.total,
            status = %order.status,
            "Order created"
        );
        Ok(order)
    }

    /// The order number the next order created now would get.
    pub async fn next_order_number(&self) -> DbResult<String> {
        let mut conn = self.pool.acquire().await?;
        peek_order_number(&mut conn, Utc::now()).await
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Gets an order by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Order>> {
        let sql = format!("{} WHERE id = ?1", SELECT_ORDER);
        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let items = self.get_items(&row.id).await?;
                Ok(Some(row.into_order(items)))
            }
            None => Ok(None),
        }
    }

    /// Gets an order by ID, failing with `NotFound` when absent.
    pub async fn require(&self, id: &str) -> DbResult<Order> {
        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))
    }

    /// All orders, newest first.
    pub async fn list(&self) -> DbResult<Vec<Order>> {
        let sql = format!("{} ORDER BY created_at DESC, order_number DESC", SELECT_ORDER);
        let rows: Vec<OrderRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        self.attach_items(rows).await
    }

    /// Orders placed by one purchaser, newest first.
    pub async fn list_by_user(&self, user_id: &str) -> DbResult<Vec<Order>> {
        let sql = format!(
            "{} WHERE user_id = ?1 ORDER BY created_at DESC, order_number DESC",
            SELECT_ORDER
        );
        let rows: Vec<OrderRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        self.attach_items(rows).await
    }

    /// Orders still moving through the kitchen, oldest first.
    pub async fn list_active(&self) -> DbResult<Vec<Order>> {
        let sql = format!(
            "{} WHERE status NOT IN ('delivered', 'cancelled') ORDER BY created_at, order_number",
            SELECT_ORDER
        );
        let rows: Vec<OrderRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        self.attach_items(rows).await
    }

    /// Line snapshots of an order, in the order they were added.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let rows: Vec<OrderItemRow> = sqlx::query_as(
            r#"
            SELECT id, order_id, menu_item_id, name, unit_price, quantity, subtotal
            FROM order_items
            WHERE order_id = ?1
            ORDER BY line_no
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderItem::from).collect())
    }

    async fn attach_items(&self, rows: Vec<OrderRow>) -> DbResult<Vec<Order>> {
        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let items = self.get_items(&row.id).await?;
            orders.push(row.into_order(items));
        }
        Ok(orders)
    }

    // =========================================================================
    // Status Changes
    // =========================================================================

    /// Overwrites the status without consulting the transition table.
    ///
    /// ## Errors
    /// `NotFound` if the order doesn't exist.
    pub async fn set_status(&self, id: &str, status: OrderStatus) -> DbResult<Order> {
        let result = sqlx::query("UPDATE orders SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        info!(id = %id, status = %status, "Order status set");
        self.require(id).await
    }

    /// Moves an order to `next` only if the status table allows it.
    ///
    /// ## Errors
    /// - `NotFound` if the order doesn't exist
    /// - `Rule(InvalidStatusTransition)` for a disallowed move
    pub async fn transition(&self, id: &str, next: OrderStatus) -> DbResult<Order> {
        let mut tx = self.pool.begin().await?;

        let current: Option<OrderStatus> =
            sqlx::query_scalar("SELECT status FROM orders WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let current = current.ok_or_else(|| DbError::not_found("Order", id))?;

        check_transition(id, current, next)?;

        sqlx::query("UPDATE orders SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(next)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(id = %id, from = %current, to = %next, "Order status advanced");
        self.require(id).await
    }

    /// Cancels an order. Lenient, like [`OrderRepository::set_status`].
    pub async fn cancel(&self, id: &str) -> DbResult<Order> {
        self.set_status(id, OrderStatus::Cancelled).await
    }
}

/// Claims the next number of the day.
///
/// The upsert is a write, so running it first makes the surrounding
/// transaction take the write lock before reading anything. A day without a
/// counter row starts after the orders already numbered that day.
async fn claim_order_number(conn: &mut SqliteConnection, now: DateTime<Utc>) -> DbResult<String> {
    let sequence: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO order_sequences (day, last)
        VALUES (?1, (SELECT COUNT(*) FROM orders WHERE order_number LIKE ?2) + 1)
        ON CONFLICT (day) DO UPDATE SET last = last + 1
        RETURNING last
        "#,
    )
    .bind(order_day(now))
    .bind(format!("{}%", order_number_prefix(now)))
    .fetch_one(&mut *conn)
    .await?;

    Ok(format_order_number(now, sequence as u32))
}

/// The number [`claim_order_number`] would hand out next, without claiming it.
async fn peek_order_number(conn: &mut SqliteConnection, now: DateTime<Utc>) -> DbResult<String> {
    let last: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(
            (SELECT last FROM order_sequences WHERE day = ?1),
            (SELECT COUNT(*) FROM orders WHERE order_number LIKE ?2)
        )
        "#,
    )
    .bind(order_day(now))
    .bind(format!("{}%", order_number_prefix(now)))
    .fetch_one(&mut *conn)
    .await?;

    Ok(format_order_number(now, last as u32 + 1))
}

fn order_day(now: DateTime<Utc>) -> String {
    now.format("%Y%m%d").to_string()
}

async fn insert_order(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
    debug!(id = %order.id, order_number = %order.order_number, "Inserting order");

    sqlx::query(
        r#"
        INSERT INTO orders (
            id, order_number, user_id, user_name,
            subtotal, tax, total,
            status, payment_method, payment_status, notes,
            created_at, estimated_ready_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4,
            ?5, ?6, ?7,
            ?8, ?9, ?10, ?11,
            ?12, ?13, ?14
        )
        "#,
    )
    .bind(&order.id)
    .bind(&order.order_number)
    .bind(&order.user_id)
    .bind(&order.user_name)
    .bind(order.subtotal.paise())
    .bind(order.tax.paise())
    .bind(order.total.paise())
    .bind(order.status)
    .bind(order.payment_method)
    .bind(order.payment_status)
    .bind(&order.notes)
    .bind(order.created_at)
    .bind(order.estimated_ready_at)
    .bind(order.updated_at)
    .execute(&mut *conn)
    .await?;

    // Snapshot pattern: name and price are copied so later menu edits
    // never change past orders.
    for (line_no, item) in order.items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO order_items (
                id, order_id, menu_item_id, name, unit_price, quantity, subtotal, line_no
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&item.id)
        .bind(&item.order_id)
        .bind(&item.menu_item_id)
        .bind(&item.name)
        .bind(item.unit_price.paise())
        .bind(item.quantity)
        .bind(item.subtotal.paise())
        .bind(line_no as i64)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::wallet::LedgerEntry;
    use canteen_core::order::{DraftLine, Purchaser};
    use canteen_core::{CoreError, UserRole, DEFAULT_TAX_RATE};

    fn line(id: &str, rupees: i64, qty: i64) -> DraftLine {
        DraftLine {
            menu_item_id: id.to_string(),
            name: format!("Item {}", id),
            unit_price: Money::from_rupees(rupees),
            quantity: qty,
        }
    }

    fn purchaser(user_id: &str) -> Purchaser {
        Purchaser {
            user_id: user_id.to_string(),
            name: "Asha".to_string(),
        }
    }

    fn cash_draft(user_id: &str) -> OrderDraft {
        OrderDraft::checkout(
            purchaser(user_id),
            vec![line("a", 80, 2), line("b", 60, 1)],
            PaymentMethod::Cash,
            PaymentStatus::Pending,
        )
    }

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_fetch_order() {
        let db = setup().await;
        let order = db
            .orders()
            .create(cash_draft("u-1"), DEFAULT_TAX_RATE, Duration::minutes(15))
            .await
            .unwrap();

        assert_eq!(order.subtotal, Money::from_rupees(220));
        assert_eq!(order.tax, Money::from_rupees(11));
        assert_eq!(order.total, Money::from_rupees(231));
        assert!(order.estimated_ready_at > order.created_at);
        assert!(order.order_number.ends_with("-0001"));

        let fetched = db.orders().require(&order.id).await.unwrap();
        assert_eq!(fetched.order_number, order.order_number);
        assert_eq!(fetched.items.len(), 2);
        assert_eq!(fetched.items[0].menu_item_id, "a");
        assert_eq!(fetched.items[0].subtotal, Money::from_rupees(160));
        assert_eq!(fetched.total, Money::from_rupees(231));
    }

    #[tokio::test]
    async fn test_order_numbers_follow_daily_sequence() {
        let db = setup().await;
        let first = db
            .orders()
            .create(cash_draft("u-1"), DEFAULT_TAX_RATE, Duration::minutes(15))
            .await
            .unwrap();
        assert!(db.orders().next_order_number().await.unwrap().ends_with("-0002"));

        let second = db
            .orders()
            .create(cash_draft("u-1"), DEFAULT_TAX_RATE, Duration::minutes(15))
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
        assert!(second.order_number.ends_with("-0002"));
    }

    #[tokio::test]
    async fn test_get_unknown_order() {
        let db = setup().await;
        assert!(db.orders().get("missing").await.unwrap().is_none());
        assert!(matches!(
            db.orders().require("missing").await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_lenient_status_changes() {
        let db = setup().await;
        let order = db
            .orders()
            .create(cash_draft("u-1"), DEFAULT_TAX_RATE, Duration::minutes(15))
            .await
            .unwrap();

        let preparing = db.orders().set_status(&order.id, OrderStatus::Preparing).await.unwrap();
        assert_eq!(preparing.status, OrderStatus::Preparing);

        let ready = db.orders().set_status(&order.id, OrderStatus::Ready).await.unwrap();
        assert_eq!(ready.status, OrderStatus::Ready);

        assert!(db.orders().set_status("missing", OrderStatus::Ready).await.is_err());
    }

    #[tokio::test]
    async fn test_strict_transition() {
        let db = setup().await;
        let order = db
            .orders()
            .create(cash_draft("u-1"), DEFAULT_TAX_RATE, Duration::minutes(15))
            .await
            .unwrap();

        let skipped = db.orders().transition(&order.id, OrderStatus::Ready).await;
        assert!(matches!(
            skipped,
            Err(DbError::Rule(CoreError::InvalidStatusTransition { .. }))
        ));
        assert_eq!(
            db.orders().require(&order.id).await.unwrap().status,
            OrderStatus::Pending
        );

        let confirmed = db.orders().transition(&order.id, OrderStatus::Confirmed).await.unwrap();
        assert_eq!(confirmed.status, OrderStatus::Confirmed);

        let cancelled = db.orders().cancel(&order.id).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert!(db.orders().transition(&order.id, OrderStatus::Pending).await.is_err());
    }

    #[tokio::test]
    async fn test_list_filters() {
        let db = setup().await;
        let mine = db
            .orders()
            .create(cash_draft("u-1"), DEFAULT_TAX_RATE, Duration::minutes(15))
            .await
            .unwrap();
        let theirs = db
            .orders()
            .create(cash_draft("u-2"), DEFAULT_TAX_RATE, Duration::minutes(15))
            .await
            .unwrap();
        db.orders().set_status(&theirs.id, OrderStatus::Delivered).await.unwrap();

        assert_eq!(db.orders().list().await.unwrap().len(), 2);

        let by_user = db.orders().list_by_user("u-1").await.unwrap();
        assert_eq!(by_user.len(), 1);
        assert_eq!(by_user[0].id, mine.id);

        let active = db.orders().list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, mine.id);
    }

    #[tokio::test]
    async fn test_wallet_checkout_debits_balance() {
        let db = setup().await;
        let user = db
            .wallet()
            .create_user("Asha", "asha@campus.edu", UserRole::Student)
            .await
            .unwrap();
        db.wallet()
            .add_transaction(LedgerEntry {
                user_id: &user.id,
                kind: TransactionType::Deposit,
                amount: Money::from_rupees(500),
                description: "Top up",
                order_id: None,
            })
            .await
            .unwrap();

        let draft = OrderDraft::checkout(
            purchaser(&user.id),
            vec![line("a", 80, 2), line("b", 60, 1)],
            PaymentMethod::Wallet,
            PaymentStatus::Completed,
        );
        let order = db
            .orders()
            .create(draft, DEFAULT_TAX_RATE, Duration::minutes(15))
            .await
            .unwrap();

        assert_eq!(order.total, Money::from_rupees(231));
        assert_eq!(
            db.wallet().get_balance(&user.id).await.unwrap(),
            Money::from_rupees(500 - 231)
        );

        let log = db.wallet().list_transactions(&user.id).await.unwrap();
        assert_eq!(log[0].kind, TransactionType::Payment);
        assert_eq!(log[0].order_id.as_deref(), Some(order.id.as_str()));
    }

    #[tokio::test]
    async fn test_wallet_checkout_insufficient_funds_writes_nothing() {
        let db = setup().await;
        let user = db
            .wallet()
            .create_user("Ravi", "ravi@campus.edu", UserRole::Student)
            .await
            .unwrap();

        let draft = OrderDraft::checkout(
            purchaser(&user.id),
            vec![line("a", 80, 1)],
            PaymentMethod::Wallet,
            PaymentStatus::Completed,
        );
        let result = db
            .orders()
            .create(draft, DEFAULT_TAX_RATE, Duration::minutes(15))
            .await;

        assert!(matches!(
            result,
            Err(DbError::Rule(CoreError::InsufficientBalance { .. }))
        ));
        assert!(db.orders().list().await.unwrap().is_empty());
        assert!(db.wallet().get_balance(&user.id).await.unwrap().is_zero());
        // The rolled-back order gave its number back
        assert!(db.orders().next_order_number().await.unwrap().ends_with("-0001"));
    }

    #[tokio::test]
    async fn test_concurrent_creates_get_distinct_numbers() {
        let dir = tempfile::TempDir::new().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("canteen.db")).max_connections(4))
            .await
            .unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let db = db.clone();
                tokio::spawn(async move {
                    db.orders()
                        .create(
                            cash_draft(&format!("u-{}", i)),
                            DEFAULT_TAX_RATE,
                            Duration::minutes(15),
                        )
                        .await
                })
            })
            .collect();

        let mut numbers = Vec::new();
        for handle in handles {
            numbers.push(handle.await.unwrap().unwrap().order_number);
        }
        numbers.sort();
        numbers.dedup();
        assert_eq!(numbers.len(), 8);
        assert!(numbers[0].ends_with("-0001"));
        assert!(numbers[7].ends_with("-0008"));

        db.close().await;
    }
}
