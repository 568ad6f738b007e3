//! # Order Commands
//!
//! Checkout from the cart, order queries for the shopper and the kitchen,
//! and status changes.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Checkout                                             │
//! │                                                                         │
//! │  session user? ── no ──► AUTHENTICATION_REQUIRED                        │
//! │       │ yes                                                             │
//! │       ▼                                                                 │
//! │  cart lines ──► OrderDraft::checkout(purchaser, lines, method, payment) │
//! │       │            wallet ─► payment completed                         │
//! │       │            other  ─► payment pending (paid at the counter)     │
//! │       ▼                                                                 │
//! │  ┌─────────────────────── ONE SQLITE TRANSACTION ──────────────────┐   │
//! │  │  next order number ─► freeze totals ─► wallet debit ─► insert   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │ ok                                  │ err                      │
//! │       ▼                                     ▼                          │
//! │  clear cart, return Order           cart untouched, ApiError           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, info};

use super::wallet::{refresh_session, wallet_error};
use crate::error::{ApiError, ApiResult};
use crate::state::{CartStore, ConfigState, DbState, SessionState};
use canteen_core::order::{DraftLine, OrderDraft, Purchaser};
use canteen_core::{Order, OrderStatus, PaymentMethod, PaymentStatus};

/// Places an order for the signed-in user from the current cart.
///
/// ## Arguments
/// * `payment_method` - `Wallet` debits the balance immediately; anything
///   else leaves the payment pending
/// * `notes` - Optional kitchen instructions
///
/// ## Errors
/// - `AUTHENTICATION_REQUIRED` without a signed-in user
/// - `VALIDATION_FAILED` for an empty cart or insufficient wallet balance
pub async fn checkout(
    db: &DbState,
    cart: &CartStore,
    config: &ConfigState,
    session: &SessionState,
    payment_method: PaymentMethod,
    notes: Option<String>,
) -> ApiResult<Order> {
    debug!(?payment_method, "checkout command");

    let user = session
        .current_user()
        .await
        .ok_or_else(ApiError::auth_required)?;

    let lines: Vec<DraftLine> = cart.with_cart(|c| c.lines().iter().map(DraftLine::from).collect());
    let payment_status = match payment_method {
        PaymentMethod::Wallet => PaymentStatus::Completed,
        _ => PaymentStatus::Pending,
    };

    let draft = OrderDraft::checkout(
        Purchaser {
            user_id: user.id.clone(),
            name: user.name.clone(),
        },
        lines,
        payment_method,
        payment_status,
    )
    .with_notes(notes);

    let order = db
        .inner()
        .orders()
        .create(draft, config.tax_rate(), config.prep_window())
        .await
        .map_err(wallet_error)?;

    cart.with_cart_mut(|c| {
        c.remove_ordered(
            order
                .items
                .iter()
                .map(|i| (i.menu_item_id.as_str(), i.quantity)),
        )
    });

    if payment_method == PaymentMethod::Wallet {
        refresh_session(db, session, &user.id).await;
    }

    info!(
        order_number = %order.order_number,
        user_id = %order.user_id,
        total = %order.total,
        "Checkout complete"
    );
    Ok(order)
}

/// All orders, newest first.
pub async fn list_orders(db: &DbState) -> ApiResult<Vec<Order>> {
    debug!("list_orders command");
    Ok(db.inner().orders().list().await?)
}

/// One order with its lines.
///
/// ## Errors
/// `NOT_FOUND` for an unknown id.
pub async fn get_order(db: &DbState, order_id: &str) -> ApiResult<Order> {
    debug!(order_id, "get_order command");
    Ok(db.inner().orders().require(order_id).await?)
}

/// The signed-in user's orders, newest first.
pub async fn list_my_orders(db: &DbState, session: &SessionState) -> ApiResult<Vec<Order>> {
    let user_id = session.require_user_id().await?;
    debug!(user_id = %user_id, "list_my_orders command");
    Ok(db.inner().orders().list_by_user(&user_id).await?)
}

/// Orders the kitchen still has to handle, oldest first.
pub async fn list_active_orders(db: &DbState) -> ApiResult<Vec<Order>> {
    debug!("list_active_orders command");
    Ok(db.inner().orders().list_active().await?)
}

/// Overwrites an order's status, whatever it was.
///
/// Used by the kitchen board's manual correction dropdown.
pub async fn set_order_status(
    db: &DbState,
    order_id: &str,
    status: OrderStatus,
) -> ApiResult<Order> {
    debug!(order_id, %status, "set_order_status command");
    Ok(db.inner().orders().set_status(order_id, status).await?)
}

/// Moves an order to `next` if the lifecycle allows it.
///
/// ## Errors
/// - `NOT_FOUND` for an unknown id
/// - `VALIDATION_FAILED` for a disallowed move ("Cannot move order from
///   pending to ready")
pub async fn advance_order(db: &DbState, order_id: &str, next: OrderStatus) -> ApiResult<Order> {
    debug!(order_id, %next, "advance_order command");
    Ok(db.inner().orders().transition(order_id, next).await?)
}

/// Cancels an order.
pub async fn cancel_order(db: &DbState, order_id: &str) -> ApiResult<Order> {
    debug!(order_id, "cancel_order command");
    Ok(db.inner().orders().cancel(order_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cart::{add_to_cart, get_cart};
    use crate::commands::test_support::app;
    use crate::error::ErrorCode;
    use canteen_core::Money;

    #[tokio::test]
    async fn test_wallet_checkout_end_to_end() {
        let app = app().await;
        let user_id = app.sign_in_student().await;

        add_to_cart(&app.db, &app.cart, &app.config, "menu-001", Some(2)).await.unwrap();
        add_to_cart(&app.db, &app.cart, &app.config, "menu-002", Some(1)).await.unwrap();

        let order = checkout(
            &app.db,
            &app.cart,
            &app.config,
            &app.session,
            PaymentMethod::Wallet,
            Some("Less oil".to_string()),
        )
        .await
        .unwrap();

        assert_eq!(order.subtotal, Money::from_rupees(220));
        assert_eq!(order.tax, Money::from_rupees(11));
        assert_eq!(order.total, Money::from_rupees(231));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Completed);
        assert_eq!(order.items.len(), 2);
        assert_eq!(
            order.estimated_ready_at - order.created_at,
            chrono::Duration::minutes(15)
        );

        assert!(get_cart(&app.cart, &app.config).lines.is_empty());

        let balance = app.db.inner().wallet().get_balance(&user_id).await.unwrap();
        assert_eq!(balance, Money::from_rupees(269));
        let cached = app.session.current_user().await.unwrap();
        assert_eq!(cached.wallet_balance, Money::from_rupees(269));

        let mine = list_my_orders(&app.db, &app.session).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, order.id);
    }

    #[tokio::test]
    async fn test_cash_checkout_leaves_payment_pending() {
        let app = app().await;
        let user_id = app.sign_in_student().await;
        add_to_cart(&app.db, &app.cart, &app.config, "menu-009", Some(1)).await.unwrap();

        let order = checkout(&app.db, &app.cart, &app.config, &app.session, PaymentMethod::Cash, None)
            .await
            .unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Pending);

        let balance = app.db.inner().wallet().get_balance(&user_id).await.unwrap();
        assert_eq!(balance, Money::from_rupees(500));
    }

    #[tokio::test]
    async fn test_checkout_requires_sign_in() {
        let app = app().await;
        add_to_cart(&app.db, &app.cart, &app.config, "menu-001", Some(1)).await.unwrap();

        let err = checkout(&app.db, &app.cart, &app.config, &app.session, PaymentMethod::Cash, None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthenticationRequired);
        assert_eq!(get_cart(&app.cart, &app.config).item_count, 1);
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let app = app().await;
        app.sign_in_student().await;

        let err = checkout(&app.db, &app.cart, &app.config, &app.session, PaymentMethod::Upi, None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.message, "Cart is empty");
    }

    #[tokio::test]
    async fn test_insufficient_wallet_keeps_cart() {
        let app = app().await;
        app.sign_in_student().await;

        // 4 × Chicken Biryani ₹150 = ₹600 + tax, over the ₹500 balance
        add_to_cart(&app.db, &app.cart, &app.config, "menu-006", Some(4)).await.unwrap();

        let err = checkout(&app.db, &app.cart, &app.config, &app.session, PaymentMethod::Wallet, None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.message, "Insufficient wallet balance");

        assert_eq!(get_cart(&app.cart, &app.config).item_count, 1);
        assert!(list_orders(&app.db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_strict_and_lenient_status_changes() {
        let app = app().await;
        app.sign_in_student().await;
        add_to_cart(&app.db, &app.cart, &app.config, "menu-007", Some(2)).await.unwrap();
        let order = checkout(&app.db, &app.cart, &app.config, &app.session, PaymentMethod::Cash, None)
            .await
            .unwrap();

        let err = advance_order(&app.db, &order.id, OrderStatus::Ready).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.message, "Cannot move order from pending to ready");

        let confirmed = advance_order(&app.db, &order.id, OrderStatus::Confirmed).await.unwrap();
        assert_eq!(confirmed.status, OrderStatus::Confirmed);

        let ready = set_order_status(&app.db, &order.id, OrderStatus::Ready).await.unwrap();
        assert_eq!(ready.status, OrderStatus::Ready);
        assert_eq!(list_active_orders(&app.db).await.unwrap().len(), 1);

        let cancelled = cancel_order(&app.db, &order.id).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert!(list_active_orders(&app.db).await.unwrap().is_empty());

        let err = advance_order(&app.db, &order.id, OrderStatus::Pending).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn test_unknown_order() {
        let app = app().await;
        assert_eq!(get_order(&app.db, "nope").await.unwrap_err().code, ErrorCode::NotFound);
        assert_eq!(
            set_order_status(&app.db, "nope", OrderStatus::Ready).await.unwrap_err().code,
            ErrorCode::NotFound
        );
        assert_eq!(
            advance_order(&app.db, "nope", OrderStatus::Confirmed).await.unwrap_err().code,
            ErrorCode::NotFound
        );
    }
}
