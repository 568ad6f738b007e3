//! # Domain Types
//!
//! Core domain types used throughout the canteen system.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    MenuItem     │   │      Order      │   │ WalletTransaction│      │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name           │   │  order_number   │   │  user_id        │       │
//! │  │  price          │   │  status         │   │  kind           │       │
//! │  │  is_available   │   │  items (frozen) │   │  amount         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  InventoryItem  │   │   OrderStatus   │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  current_stock  │   │  Pending ...    │   │  Cash, Card     │       │
//! │  │  low_stock_     │   │  Delivered      │   │  Upi, Wallet    │       │
//! │  │   threshold     │   │  Cancelled      │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Orders carry both:
//! - `id`: UUID v4 - immutable, used for relations
//! - `order_number`: human-readable, printed on receipts and called at the
//!   pickup counter

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;
use crate::validation::{
    validate_name, validate_non_negative, validate_price, ValidationResult,
};

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 500 bps = 5% (canteen GST)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for configuration input).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        crate::DEFAULT_TAX_RATE
    }
}

// =============================================================================
// Users
// =============================================================================

/// Role of a canteen user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Shopper ordering from the menu.
    Student,
    /// Cafeteria staff (kitchen, counter billing).
    Staff,
    /// Back office (menu, inventory, reports).
    Admin,
}

impl UserRole {
    /// Staff and admins may run counter sales and move orders along.
    pub fn is_staff(&self) -> bool {
        matches!(self, UserRole::Staff | UserRole::Admin)
    }
}

/// A registered canteen user with a wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    /// Cached projection of the wallet transaction log.
    pub wallet_balance: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Menu
// =============================================================================

/// A menu section ("Breakfast", "Beverages", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Display order on the menu screen.
    pub sort_order: i64,
}

/// A dish or drink on the menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MenuItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown on the menu and the receipt.
    pub name: String,

    pub description: String,

    /// Price per portion.
    pub price: Money,

    /// Category this item is listed under.
    pub category_id: String,

    /// Toggled by staff when the kitchen runs out.
    pub is_available: bool,

    pub is_vegetarian: bool,

    pub is_spicy: bool,

    /// Typical preparation time in minutes.
    pub prep_time_minutes: i64,

    pub ingredients: Vec<String>,

    /// Free-form labels ("bestseller", "jain", ...).
    pub tags: Vec<String>,

    /// Average rating, 0.0 - 5.0.
    pub rating: Option<f64>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Input for adding a menu item.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewMenuItem {
    pub name: String,
    pub description: String,
    pub price: Money,
    pub category_id: String,
    pub is_vegetarian: bool,
    pub is_spicy: bool,
    pub prep_time_minutes: i64,
    pub ingredients: Vec<String>,
    pub tags: Vec<String>,
}

/// Partial update for a menu item. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MenuItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub category_id: Option<String>,
    pub is_available: Option<bool>,
    pub is_vegetarian: Option<bool>,
    pub is_spicy: Option<bool>,
    pub prep_time_minutes: Option<i64>,
    pub ingredients: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
}

impl MenuItemUpdate {
    /// Merges the provided fields into `item`.
    ///
    /// ## Errors
    /// `ValidationError` for a blank name, a price outside `0..=MAX_PRICE`,
    /// a blank category or a negative prep time. `item` is untouched then.
    pub fn apply(self, item: &mut MenuItem, now: DateTime<Utc>) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }
        if let Some(price) = self.price {
            validate_price("price", price)?;
        }
        if let Some(category_id) = &self.category_id {
            validate_name("category_id", category_id)?;
        }
        if let Some(prep) = self.prep_time_minutes {
            validate_non_negative("prep_time_minutes", prep)?;
        }

        if let Some(name) = self.name {
            item.name = name;
        }
        if let Some(description) = self.description {
            item.description = description;
        }
        if let Some(price) = self.price {
            item.price = price;
        }
        if let Some(category_id) = self.category_id {
            item.category_id = category_id;
        }
        if let Some(is_available) = self.is_available {
            item.is_available = is_available;
        }
        if let Some(is_vegetarian) = self.is_vegetarian {
            item.is_vegetarian = is_vegetarian;
        }
        if let Some(is_spicy) = self.is_spicy {
            item.is_spicy = is_spicy;
        }
        if let Some(prep) = self.prep_time_minutes {
            item.prep_time_minutes = prep;
        }
        if let Some(ingredients) = self.ingredients {
            item.ingredients = ingredients;
        }
        if let Some(tags) = self.tags {
            item.tags = tags;
        }
        item.updated_at = now;
        Ok(())
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of an order.
///
/// ## Lifecycle
/// ```text
/// pending ──► confirmed ──► preparing ──► ready ──► delivered
///    │            │             │           │
///    └────────────┴─────────────┴───────────┴──► cancelled
/// ```
/// The transition table lives in [`crate::order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed, waiting for the kitchen to accept.
    Pending,
    /// Accepted by the kitchen.
    Confirmed,
    /// Being cooked.
    Preparing,
    /// Waiting at the pickup counter.
    Ready,
    /// Handed over. Terminal.
    Delivered,
    /// Cancelled. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Lowercase name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    /// Debited from the campus wallet at checkout.
    Wallet,
}

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

// =============================================================================
// Order
// =============================================================================

/// A placed order.
///
/// Totals are frozen at creation. Only `status`, `payment_status` and
/// `updated_at` change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: String,
    /// Human-facing number, e.g. `ORD-20260301-0042`.
    pub order_number: String,
    pub user_id: String,
    pub user_name: String,
    pub items: Vec<OrderItem>,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub estimated_ready_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A line of a placed order.
/// Uses snapshot pattern to freeze menu data at time of ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub menu_item_id: String,
    /// Menu item name at time of ordering (frozen).
    pub name: String,
    /// Unit price at time of ordering (frozen).
    pub unit_price: Money,
    pub quantity: i64,
    /// unit_price × quantity.
    pub subtotal: Money,
}

// =============================================================================
// Inventory
// =============================================================================

/// A stocked ingredient or supply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    /// Unit of measure ("kg", "litre", "packet").
    pub unit: String,
    /// Whole units on hand.
    pub current_stock: i64,
    /// At or below this the item is flagged for restocking.
    pub low_stock_threshold: i64,
    /// Cost per unit, used for waste costing.
    pub unit_price: Money,
    #[ts(as = "String")]
    pub last_restocked: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Input for adding an inventory item.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewInventoryItem {
    pub name: String,
    pub unit: String,
    pub current_stock: i64,
    pub low_stock_threshold: i64,
    pub unit_price: Money,
}

/// A recorded loss of stock (spoilage, spills, leftovers).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WasteRecord {
    pub id: String,
    pub inventory_item_id: Option<String>,
    pub item_name: String,
    pub quantity: i64,
    pub reason: String,
    /// quantity × inventory unit price at the time of recording.
    pub cost: Money,
    #[ts(as = "String")]
    pub recorded_at: DateTime<Utc>,
}

// =============================================================================
// Wallet
// =============================================================================

/// Kind of wallet movement.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Top-up. Adds to the balance.
    Deposit,
    /// Cash-out. Subtracts from the balance.
    Withdrawal,
    /// Order paid from the wallet. Subtracts from the balance.
    Payment,
}

/// One entry of the append-only wallet log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WalletTransaction {
    pub id: String,
    pub user_id: String,
    /// Always positive; the direction comes from `kind`.
    pub amount: Money,
    pub kind: TransactionType,
    pub description: String,
    pub order_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
