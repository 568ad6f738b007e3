//! # canteen-core: Pure Business Logic for the Campus Canteen
//!
//! This crate is the **heart** of the canteen system. It contains all business
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Canteen Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web Frontend (SPA)                           │   │
//! │  │    Menu ──► Cart ──► Checkout ──► Order Tracking ──► Wallet     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    canteen-app commands                         │   │
//! │  │    add_to_cart, checkout, advance_order, top_up, etc.           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ canteen-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │ pricing │ │  cart   │ │  order  │ │ wallet  │ │inventory│  │   │
//! │  │   │  Bill   │ │  Cart   │ │ Status  │ │ Ledger  │ │LowStock │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  canteen-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (MenuItem, Order, InventoryItem, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - The one bill calculator shared by cart, checkout and counter
//! - [`cart`] - Shopper cart lines and totals
//! - [`order`] - Order drafts, snapshots and the status state machine
//! - [`wallet`] - Wallet transaction arithmetic
//! - [`inventory`] - Low-stock evaluation, partial updates, waste costing
//! - [`report`] - Sales summaries for the billing screen
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use canteen_core::money::Money;
//! use canteen_core::pricing::calculate_bill;
//! use canteen_core::DEFAULT_TAX_RATE;
//!
//! let bill = calculate_bill(
//!     [(Money::from_rupees(80), 2), (Money::from_rupees(60), 1)],
//!     DEFAULT_TAX_RATE,
//! );
//!
//! assert_eq!(bill.subtotal, Money::from_rupees(220));
//! assert_eq!(bill.tax, Money::from_rupees(11));
//! assert_eq!(bill.total, Money::from_rupees(231));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod inventory;
pub mod money;
pub mod order;
pub mod pricing;
pub mod report;
pub mod types;
pub mod validation;
pub mod wallet;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Tax applied to every bill: 5% (500 basis points).
pub const DEFAULT_TAX_RATE: TaxRate = TaxRate::from_bps(500);

/// Minutes between order placement and the estimated ready time.
pub const DEFAULT_PREP_WINDOW_MINUTES: i64 = 15;

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Highest accepted menu or inventory unit price: ₹10,00,000.
///
/// Keeps every bill total well inside `i64` paise.
pub const MAX_PRICE: Money = Money::from_rupees(1_000_000);

/// Maximum quantity of a single menu item in a cart.
///
/// ## Business Reason
/// Catches typos like 100 instead of 10 at the counter.
pub const MAX_ITEM_QUANTITY: i64 = 99;

/// Purchaser id used for walk-up counter sales.
pub const COUNTER_CUSTOMER_ID: &str = "counter";
