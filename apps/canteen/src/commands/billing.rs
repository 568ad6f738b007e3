//! # Billing Commands
//!
//! Staff-side direct billing for walk-up customers, and the sales summary
//! shown beside it.
//!
//! A counter sale skips the cart and the kitchen board: the order is
//! created already `delivered` with payment `completed`. Its bill is
//! computed by the same calculator the cart and checkout use.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::state::{ConfigState, DbState};
use canteen_core::order::{DraftLine, OrderDraft, Purchaser};
use canteen_core::pricing::{calculate_bill, Bill};
use canteen_core::report::{summarize_sales, SalesSummary};
use canteen_core::validation::validate_quantity;
use canteen_core::{CoreError, Order, PaymentMethod, COUNTER_CUSTOMER_ID};

/// Name on counter sales when the customer gives none.
pub const WALK_IN_CUSTOMER: &str = "Walk-in customer";

/// One line picked on the billing screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterLine {
    pub menu_item_id: String,
    pub quantity: i64,
}

/// Bill for the current billing-screen selection, without creating anything.
pub async fn quote_counter_sale(
    db: &DbState,
    config: &ConfigState,
    lines: &[CounterLine],
) -> ApiResult<Bill> {
    debug!(lines = lines.len(), "quote_counter_sale command");
    let draft_lines = resolve_lines(db, lines).await?;
    Ok(calculate_bill(
        draft_lines.iter().map(|l| (l.unit_price, l.quantity)),
        config.tax_rate(),
    ))
}

/// Bills a walk-up customer.
///
/// ## Errors
/// - `VALIDATION_FAILED` for an empty selection, a sold-out item, a bad
///   quantity, or `Wallet` as the method (walk-ups have no wallet)
/// - `NOT_FOUND` for an unknown menu item
pub async fn create_counter_sale(
    db: &DbState,
    config: &ConfigState,
    lines: &[CounterLine],
    payment_method: PaymentMethod,
    customer_name: Option<String>,
) -> ApiResult<Order> {
    debug!(lines = lines.len(), ?payment_method, "create_counter_sale command");

    if payment_method == PaymentMethod::Wallet {
        return Err(ApiError::validation(
            "Counter sales cannot be paid from a wallet",
        ));
    }

    let draft_lines = resolve_lines(db, lines).await?;
    let name = customer_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| WALK_IN_CUSTOMER.to_string());

    let draft = OrderDraft::counter_sale(
        Purchaser {
            user_id: COUNTER_CUSTOMER_ID.to_string(),
            name,
        },
        draft_lines,
        payment_method,
    );

    let order = db
        .inner()
        .orders()
        .create(draft, config.tax_rate(), config.prep_window())
        .await?;

    info!(order_number = %order.order_number, total = %order.total, "Counter sale billed");
    Ok(order)
}

/// Sales totals over every order on record.
pub async fn sales_summary(db: &DbState) -> ApiResult<SalesSummary> {
    debug!("sales_summary command");
    let orders = db.inner().orders().list().await?;
    Ok(summarize_sales(&orders))
}

/// Looks up each selected item and snapshots it at its current price.
async fn resolve_lines(db: &DbState, lines: &[CounterLine]) -> ApiResult<Vec<DraftLine>> {
    if lines.is_empty() {
        return Err(CoreError::EmptyCart.into());
    }

    let menu = db.inner().menu();
    let mut resolved = Vec::with_capacity(lines.len());
    for line in lines {
        validate_quantity(line.quantity).map_err(CoreError::from)?;
        let item = menu.require_item(&line.menu_item_id).await?;
        if !item.is_available {
            return Err(CoreError::ItemUnavailable { name: item.name }.into());
        }
        resolved.push(DraftLine::from_menu_item(&item, line.quantity));
    }
    Ok(resolved)
}
