//! # Wallet Commands
//!
//! Balance, history, top-ups and withdrawals.
//!
//! Reads take a user id. Top-ups and withdrawals act on the signed-in user
//! only; a session pointing at a user the database no longer knows is
//! treated the same as no session.

use tracing::{debug, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::state::{DbState, SessionState};
use canteen_core::{Money, TransactionType, WalletTransaction};
use canteen_db::{DbError, LedgerEntry};

/// Maps an unknown wallet owner to `AUTHENTICATION_REQUIRED`.
pub(crate) fn wallet_error(err: DbError) -> ApiError {
    match err {
        DbError::NotFound { ref entity, .. } if entity == "User" => ApiError::auth_required(),
        other => ApiError::from(other),
    }
}

/// Cached wallet balance of a user.
///
/// ## Errors
/// `NOT_FOUND` for an unknown user.
pub async fn get_balance(db: &DbState, user_id: &str) -> ApiResult<Money> {
    debug!(user_id, "get_balance command");
    Ok(db.inner().wallet().get_balance(user_id).await?)
}

/// Wallet history of a user, newest first. Empty for an unknown user.
pub async fn list_transactions(db: &DbState, user_id: &str) -> ApiResult<Vec<WalletTransaction>> {
    debug!(user_id, "list_transactions command");
    Ok(db.inner().wallet().list_transactions(user_id).await?)
}

/// Adds money to the signed-in user's wallet.
///
/// ## Errors
/// - `AUTHENTICATION_REQUIRED` without a (known) signed-in user
/// - `VALIDATION_FAILED` when `amount <= 0`
pub async fn top_up(
    db: &DbState,
    session: &SessionState,
    amount: Money,
    description: Option<String>,
) -> ApiResult<WalletTransaction> {
    let user_id = session.require_user_id().await?;
    debug!(user_id = %user_id, %amount, "top_up command");

    let description = description.unwrap_or_else(|| "Wallet top-up".to_string());
    let record = db
        .inner()
        .wallet()
        .add_transaction(LedgerEntry {
            user_id: &user_id,
            kind: TransactionType::Deposit,
            amount,
            description: &description,
            order_id: None,
        })
        .await
        .map_err(wallet_error)?;

    refresh_session(db, session, &user_id).await;
    info!(user_id = %user_id, amount = %record.amount, "Wallet topped up");
    Ok(record)
}

/// Takes money out of the signed-in user's wallet.
///
/// ## Errors
/// - `AUTHENTICATION_REQUIRED` without a (known) signed-in user
/// - `VALIDATION_FAILED` when `amount <= 0` or above the balance
pub async fn withdraw(
    db: &DbState,
    session: &SessionState,
    amount: Money,
    description: Option<String>,
) -> ApiResult<WalletTransaction> {
    let user_id = session.require_user_id().await?;
    debug!(user_id = %user_id, %amount, "withdraw command");

    let description = description.unwrap_or_else(|| "Wallet withdrawal".to_string());
    let record = db
        .inner()
        .wallet()
        .debit(LedgerEntry {
            user_id: &user_id,
            kind: TransactionType::Withdrawal,
            amount,
            description: &description,
            order_id: None,
        })
        .await
        .map_err(wallet_error)?;

    refresh_session(db, session, &user_id).await;
    info!(user_id = %user_id, amount = %record.amount, "Wallet withdrawal");
    Ok(record)
}

/// Reloads the signed-in user after a committed wallet change.
///
/// Best effort: the change already happened, so a failed reload is logged
/// and the stale balance stays until the next refresh.
pub(crate) async fn refresh_session(db: &DbState, session: &SessionState, user_id: &str) {
    match db.inner().wallet().get_user(user_id).await {
        Ok(Some(user)) => session.refresh(user).await,
        Ok(None) => warn!(user_id, "Signed-in user vanished after a wallet change"),
        Err(e) => warn!(user_id, error = %e, "Could not refresh session balance"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::app;
    use crate::error::ErrorCode;
    use canteen_core::{User, UserRole};
    use chrono::Utc;

    #[tokio::test]
    async fn test_unknown_user_balance_is_not_found() {
        let app = app().await;
        let err = get_balance(&app.db, "nobody").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(list_transactions(&app.db, "nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mutations_require_sign_in() {
        let app = app().await;
        assert_eq!(
            withdraw(&app.db, &app.session, Money::from_rupees(10), None)
                .await
                .unwrap_err()
                .code,
            ErrorCode::AuthenticationRequired
        );
        assert_eq!(
            top_up(&app.db, &app.session, Money::from_rupees(100), None)
                .await
                .unwrap_err()
                .code,
            ErrorCode::AuthenticationRequired
        );
    }

    #[tokio::test]
    async fn test_unknown_session_user_writes_nothing() {
        let app = app().await;
        app.session
            .sign_in(User {
                id: "ghost".to_string(),
                name: "Ghost".to_string(),
                email: "ghost@campus.edu".to_string(),
                role: UserRole::Student,
                wallet_balance: Money::zero(),
                created_at: Utc::now(),
            })
            .await;

        let err = top_up(&app.db, &app.session, Money::from_rupees(100), None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthenticationRequired);

        let err = withdraw(&app.db, &app.session, Money::from_rupees(1), None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthenticationRequired);
    }

    #[tokio::test]
    async fn test_top_up_and_withdraw() {
        let app = app().await;
        let user_id = app.sign_in_student().await;

        top_up(&app.db, &app.session, Money::from_rupees(250), None).await.unwrap();
        assert_eq!(
            get_balance(&app.db, &user_id).await.unwrap(),
            Money::from_rupees(750)
        );

        let record = withdraw(
            &app.db,
            &app.session,
            Money::from_rupees(100),
            Some("Cash out".to_string()),
        )
        .await
        .unwrap();
        assert_eq!(record.kind, TransactionType::Withdrawal);
        assert_eq!(record.description, "Cash out");

        let history = list_transactions(&app.db, &user_id).await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].kind, TransactionType::Withdrawal);

        let balance = get_balance(&app.db, &user_id).await.unwrap();
        assert_eq!(balance, Money::from_rupees(650));
        assert_eq!(
            app.db.inner().wallet().recompute_balance(&user_id).await.unwrap(),
            balance
        );
        assert_eq!(
            app.session.current_user().await.unwrap().wallet_balance,
            balance
        );
    }

    #[tokio::test]
    async fn test_withdraw_over_balance_rejected() {
        let app = app().await;
        let user_id = app.sign_in_student().await;

        let err = withdraw(&app.db, &app.session, Money::from_rupees(501), None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.message, "Insufficient wallet balance");
        assert_eq!(
            get_balance(&app.db, &user_id).await.unwrap(),
            Money::from_rupees(500)
        );
    }

    #[tokio::test]
    async fn test_top_up_overflowing_balance_rejected() {
        let app = app().await;
        let user_id = app.sign_in_student().await;

        let err = top_up(&app.db, &app.session, Money::from_paise(i64::MAX - 10), None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(
            get_balance(&app.db, &user_id).await.unwrap(),
            Money::from_rupees(500)
        );
        assert_eq!(list_transactions(&app.db, &user_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_session_refresh_is_not_an_error() {
        let app = app().await;
        let user_id = app.sign_in_student().await;

        app.db.inner().close().await;
        refresh_session(&app.db, &app.session, &user_id).await;

        let cached = app.session.current_user().await.unwrap();
        assert_eq!(cached.id, user_id);
        assert_eq!(cached.wallet_balance, Money::from_rupees(500));
    }

    #[tokio::test]
    async fn test_non_positive_amount_rejected() {
        let app = app().await;
        let user_id = app.sign_in_student().await;

        let err = top_up(&app.db, &app.session, Money::zero(), None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(list_transactions(&app.db, &user_id).await.unwrap().len(), 1);
    }
}
