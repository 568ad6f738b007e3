//! # Wallet Repository
//!
//! Users, cached wallet balances and the append-only transaction log.
//!
//! ## Ledger Write
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 add_transaction(user, kind, amount)                     │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    SELECT wallet_balance FROM users WHERE id = ?   (NotFound if none)   │
//! │    [debit only] balance >= amount ?                (else Rule error)    │
//! │    INSERT INTO wallet_transactions ...                                  │
//! │    UPDATE users SET wallet_balance = balance ± amount                   │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Readers see either both writes or neither.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The log is the source of truth; [`WalletRepository::recompute_balance`]
//! folds it and must always equal the cached `wallet_balance`.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use canteen_core::wallet::{ensure_sufficient, fold_balance, validate_transaction_amount};
use canteen_core::{
    CoreError, Money, TransactionType, User, UserRole, ValidationError, WalletTransaction,
};

#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    role: UserRole,
    wallet_balance: i64,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role,
            wallet_balance: Money::from_paise(row.wallet_balance),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct TransactionRow {
    id: String,
    user_id: String,
    amount: i64,
    kind: TransactionType,
    description: String,
    order_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<TransactionRow> for WalletTransaction {
    fn from(row: TransactionRow) -> Self {
        WalletTransaction {
            id: row.id,
            user_id: row.user_id,
            amount: Money::from_paise(row.amount),
            kind: row.kind,
            description: row.description,
            order_id: row.order_id,
            created_at: row.created_at,
        }
    }
}

const SELECT_USER: &str =
    "SELECT id, name, email, role, wallet_balance, created_at FROM users";

/// A ledger entry about to be appended.
#[derive(Debug, Clone)]
pub struct LedgerEntry<'a> {
    pub user_id: &'a str,
    pub kind: TransactionType,
    pub amount: Money,
    pub description: &'a str,
    pub order_id: Option<&'a str>,
}

/// Repository for users and their wallets.
#[derive(Debug, Clone)]
pub struct WalletRepository {
    pool: SqlitePool,
}

impl WalletRepository {
    /// Creates a new WalletRepository.
    pub fn new(pool: SqlitePool) -> Self {
        WalletRepository { pool }
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Registers a user with an empty wallet.
    pub async fn create_user(&self, name: &str, email: &str, role: UserRole) -> DbResult<User> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            role,
            wallet_balance: Money::zero(),
            created_at: Utc::now(),
        };

        debug!(id = %user.id, email = %user.email, "Creating user");

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, role, wallet_balance, created_at)
            VALUES (?1, ?2, ?3, ?4, 0, ?5)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets a user by ID.
    pub async fn get_user(&self, id: &str) -> DbResult<Option<User>> {
        let sql = format!("{} WHERE id = ?1", SELECT_USER);
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    /// Gets a user by email.
    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let sql = format!("{} WHERE email = ?1", SELECT_USER);
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    /// Lists all users by name.
    pub async fn list_users(&self) -> DbResult<Vec<User>> {
        let sql = format!("{} ORDER BY name", SELECT_USER);
        let rows: Vec<UserRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    // =========================================================================
    // Ledger
    // =========================================================================

    /// Cached balance for a user.
    ///
    /// ## Errors
    /// `NotFound` for an unknown user.
    pub async fn get_balance(&self, user_id: &str) -> DbResult<Money> {
        let balance: Option<i64> =
            sqlx::query_scalar("SELECT wallet_balance FROM users WHERE id = ?1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        balance
            .map(Money::from_paise)
            .ok_or_else(|| DbError::not_found("User", user_id))
    }

    /// Transactions for a user, newest first.
    pub async fn list_transactions(&self, user_id: &str) -> DbResult<Vec<WalletTransaction>> {
        let rows: Vec<TransactionRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, amount, kind, description, order_id, created_at
            FROM wallet_transactions
            WHERE user_id = ?1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(WalletTransaction::from).collect())
    }

    /// Appends a transaction and adjusts the cached balance atomically.
    ///
    /// Overdrafts are not blocked here; see [`WalletRepository::debit`].
    ///
    /// ## Errors
    /// - `Rule(Validation)` when `amount <= 0`
    /// - `NotFound` for an unknown user (nothing is written)
    pub async fn add_transaction(&self, entry: LedgerEntry<'_>) -> DbResult<WalletTransaction> {
        let mut tx = self.pool.begin().await?;
        let record = append_entry(&mut tx, &entry, false).await?;
        tx.commit().await?;

        info!(
            user_id = %record.user_id,
            kind = record.kind.as_str(),
            amount = %record.amount,
            "Wallet transaction recorded"
        );
        Ok(record)
    }

    /// Like [`WalletRepository::add_transaction`], but fails with
    /// `Rule(InsufficientBalance)` when a debit exceeds the balance.
    /// The check and the write share one transaction.
    pub async fn debit(&self, entry: LedgerEntry<'_>) -> DbResult<WalletTransaction> {
        let mut tx = self.pool.begin().await?;
        let record = append_entry(&mut tx, &entry, true).await?;
        tx.commit().await?;

        info!(
            user_id = %record.user_id,
            kind = record.kind.as_str(),
            amount = %record.amount,
            "Wallet debited"
        );
        Ok(record)
    }

    /// Folds the transaction log into a balance.
    ///
    /// ## Errors
    /// `NotFound` for an unknown user.
    pub async fn recompute_balance(&self, user_id: &str) -> DbResult<Money> {
        if self.get_user(user_id).await?.is_none() {
            return Err(DbError::not_found("User", user_id));
        }
        let log = self.list_transactions(user_id).await?;
        Ok(fold_balance(&log))
    }
}

/// Ledger write shared with order creation, run on the caller's connection
/// so it joins the caller's transaction.
pub(crate) async fn append_entry(
    conn: &mut SqliteConnection,
    entry: &LedgerEntry<'_>,
    check_funds: bool,
) -> DbResult<WalletTransaction> {
    validate_transaction_amount(entry.amount)?;

    let balance: Option<i64> = sqlx::query_scalar("SELECT wallet_balance FROM users WHERE id = ?1")
        .bind(entry.user_id)
        .fetch_optional(&mut *conn)
        .await?;
    let balance = match balance {
        Some(paise) => Money::from_paise(paise),
        None => return Err(DbError::not_found("User", entry.user_id)),
    };

    if check_funds && !entry.kind.is_credit() {
        ensure_sufficient(balance, entry.amount)?;
    }

    let new_balance = balance
        .checked_add(entry.kind.signed(entry.amount))
        .ok_or_else(|| {
            CoreError::from(ValidationError::TooLarge {
                field: "amount".to_string(),
            })
        })?;

    let record = WalletTransaction {
        id: Uuid::new_v4().to_string(),
        user_id: entry.user_id.to_string(),
        amount: entry.amount,
        kind: entry.kind,
        description: entry.description.to_string(),
        order_id: entry.order_id.map(str::to_string),
        created_at: Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO wallet_transactions (id, user_id, amount, kind, description, order_id, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&record.id)
    .bind(&record.user_id)
    .bind(record.amount.paise())
    .bind(record.kind)
    .bind(&record.description)
    .bind(&record.order_id)
    .bind(record.created_at)
    .execute(&mut *conn)
    .await?;

    sqlx::query("UPDATE users SET wallet_balance = ?2 WHERE id = ?1")
        .bind(&record.user_id)
        .bind(new_balance.paise())
        .execute(&mut *conn)
        .await?;

    debug!(user_id = %record.user_id, balance = %new_balance, "Wallet balance updated");
    Ok(record)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn setup() -> (Database, User) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = db
            .wallet()
            .create_user("Asha", "asha@campus.edu", UserRole::Student)
            .await
            .unwrap();
        (db, user)
    }

    fn entry(user_id: &str, kind: TransactionType, rupees: i64) -> LedgerEntry<'_> {
        LedgerEntry {
            user_id,
            kind,
            amount: Money::from_rupees(rupees),
            description: "test",
            order_id: None,
        }
    }

    #[tokio::test]
    async fn test_balance_tracks_log() {
        let (db, user) = setup().await;
        let wallet = db.wallet();

        wallet.add_transaction(entry(&user.id, TransactionType::Deposit, 500)).await.unwrap();
        wallet.add_transaction(entry(&user.id, TransactionType::Payment, 231)).await.unwrap();
        wallet.add_transaction(entry(&user.id, TransactionType::Withdrawal, 50)).await.unwrap();
        wallet.add_transaction(entry(&user.id, TransactionType::Deposit, 100)).await.unwrap();

        let expected = Money::from_rupees(500 + 100 - 231 - 50);
        assert_eq!(wallet.get_balance(&user.id).await.unwrap(), expected);
        assert_eq!(wallet.recompute_balance(&user.id).await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_transactions_newest_first() {
        let (db, user) = setup().await;
        let wallet = db.wallet();

        wallet.add_transaction(entry(&user.id, TransactionType::Deposit, 10)).await.unwrap();
        wallet.add_transaction(entry(&user.id, TransactionType::Deposit, 20)).await.unwrap();

        let log = wallet.list_transactions(&user.id).await.unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].amount, Money::from_rupees(20));
        assert_eq!(log[1].amount, Money::from_rupees(10));
    }

    #[tokio::test]
    async fn test_ledger_allows_overdraft_but_debit_does_not() {
        let (db, user) = setup().await;
        let wallet = db.wallet();

        wallet.add_transaction(entry(&user.id, TransactionType::Deposit, 100)).await.unwrap();

        let result = wallet.debit(entry(&user.id, TransactionType::Withdrawal, 150)).await;
        assert!(matches!(
            result,
            Err(DbError::Rule(CoreError::InsufficientBalance { .. }))
        ));
        assert_eq!(wallet.get_balance(&user.id).await.unwrap(), Money::from_rupees(100));
        assert_eq!(wallet.list_transactions(&user.id).await.unwrap().len(), 1);

        wallet.add_transaction(entry(&user.id, TransactionType::Withdrawal, 150)).await.unwrap();
        assert_eq!(wallet.get_balance(&user.id).await.unwrap(), Money::from_rupees(-50));
    }

    #[tokio::test]
    async fn test_unknown_user_writes_nothing() {
        let (db, _) = setup().await;
        let wallet = db.wallet();

        let result = wallet.add_transaction(entry("ghost", TransactionType::Deposit, 10)).await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));
        assert!(wallet.get_balance("ghost").await.is_err());
        assert!(wallet.list_transactions("ghost").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_overflowing_deposit_rolls_back() {
        let (db, user) = setup().await;
        let wallet = db.wallet();

        wallet.add_transaction(entry(&user.id, TransactionType::Deposit, 500)).await.unwrap();

        let result = wallet
            .add_transaction(LedgerEntry {
                amount: Money::from_paise(i64::MAX - 10),
                ..entry(&user.id, TransactionType::Deposit, 0)
            })
            .await;
        assert!(matches!(
            result,
            Err(DbError::Rule(CoreError::Validation(ValidationError::TooLarge { .. })))
        ));
        assert_eq!(wallet.get_balance(&user.id).await.unwrap(), Money::from_rupees(500));
        assert_eq!(wallet.list_transactions(&user.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_non_positive_amount_rejected() {
        let (db, user) = setup().await;
        let result = db
            .wallet()
            .add_transaction(entry(&user.id, TransactionType::Deposit, 0))
            .await;
        assert!(matches!(result, Err(DbError::Rule(CoreError::Validation(_)))));
    }

    #[tokio::test]
    async fn test_find_by_email() {
        let (db, user) = setup().await;
        let found = db.wallet().find_by_email("asha@campus.edu").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(db.wallet().find_by_email("nobody@campus.edu").await.unwrap().is_none());
    }
}
