//! # Inventory & Waste
//!
//! Low-stock evaluation, partial updates of stocked items, and waste costing.
//!
//! ## Low-Stock Rule
//! ```text
//! current_stock <= low_stock_threshold   →   flagged (boundary inclusive)
//!
//!   stock 5, threshold 5  → flagged
//!   stock 6, threshold 5  → not flagged
//! ```
//!
//! ## Waste
//! Recording waste prices it at `quantity × unit_price` of the matching
//! inventory item *at record time*. It does not touch stock levels; waste is
//! a reporting channel only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{InventoryItem, WasteRecord};
use crate::validation::{validate_name, validate_non_negative, validate_positive, validate_price};

// =============================================================================
// Low Stock
// =============================================================================

impl InventoryItem {
    /// Whether the item is at or below its restock threshold.
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.low_stock_threshold
    }
}

/// Items needing a restock, in input order.
pub fn low_stock_items(items: &[InventoryItem]) -> Vec<InventoryItem> {
    items.iter().filter(|i| i.is_low_stock()).cloned().collect()
}

// =============================================================================
// Updates
// =============================================================================

/// Partial update of an inventory item. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryUpdate {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub current_stock: Option<i64>,
    pub low_stock_threshold: Option<i64>,
    pub unit_price: Option<Money>,
}

impl InventoryUpdate {
    /// Merges the provided fields into `item`.
    ///
    /// A stock increase counts as a restock and refreshes `last_restocked`.
    ///
    /// ## Errors
    /// `Validation` for negative stock, threshold or price, or a blank name.
    pub fn apply(self, item: &mut InventoryItem, now: DateTime<Utc>) -> CoreResult<()> {
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }
        if let Some(stock) = self.current_stock {
            if stock < 0 {
                return Err(CoreError::NegativeStock {
                    item: item.name.clone(),
                    resulting: stock,
                });
            }
        }
        if let Some(threshold) = self.low_stock_threshold {
            validate_non_negative("low_stock_threshold", threshold)?;
        }
        if let Some(price) = self.unit_price {
            validate_price("unit_price", price)?;
        }

        if let Some(name) = self.name {
            item.name = name;
        }
        if let Some(unit) = self.unit {
            item.unit = unit;
        }
        if let Some(stock) = self.current_stock {
            if stock > item.current_stock {
                item.last_restocked = now;
            }
            item.current_stock = stock;
        }
        if let Some(threshold) = self.low_stock_threshold {
            item.low_stock_threshold = threshold;
        }
        if let Some(price) = self.unit_price {
            item.unit_price = price;
        }
        item.updated_at = now;
        Ok(())
    }
}

/// A stock change expressed relative to, or independent of, current stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StockAdjustment {
    /// Add (positive) or remove (negative) units.
    Delta(i64),
    /// Replace the stock count after a physical count.
    Set(i64),
}

impl StockAdjustment {
    /// Turns the adjustment into a partial update for `item`.
    ///
    /// ## Errors
    /// - `NegativeStock` when the result would be below zero
    /// - `Validation(TooLarge)` when a delta overflows the stock count
    pub fn to_update(self, item: &InventoryItem) -> CoreResult<InventoryUpdate> {
        let resulting = match self {
            StockAdjustment::Delta(delta) => {
                item.current_stock
                    .checked_add(delta)
                    .ok_or_else(|| ValidationError::TooLarge {
                        field: "current_stock".to_string(),
                    })?
            }
            StockAdjustment::Set(value) => value,
        };
        if resulting < 0 {
            return Err(CoreError::NegativeStock {
                item: item.name.clone(),
                resulting,
            });
        }
        Ok(InventoryUpdate {
            current_stock: Some(resulting),
            ..Default::default()
        })
    }
}

// =============================================================================
// Waste
// =============================================================================

/// Input for recording waste.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WasteDraft {
    /// Preferred match; falls back to `item_name` when absent.
    pub inventory_item_id: Option<String>,
    pub item_name: String,
    pub quantity: i64,
    pub reason: String,
}

impl WasteDraft {
    pub fn validate(&self) -> CoreResult<()> {
        validate_name("item_name", &self.item_name)?;
        validate_positive("quantity", self.quantity)?;
        validate_name("reason", &self.reason)?;
        Ok(())
    }

    /// Finds the inventory item this waste refers to: by id when given,
    /// else by exact name.
    pub fn match_item<'a>(&self, items: &'a [InventoryItem]) -> Option<&'a InventoryItem> {
        match &self.inventory_item_id {
            Some(id) => items.iter().find(|i| &i.id == id),
            None => items.iter().find(|i| i.name == self.item_name),
        }
    }
}

/// Cost of wasting `quantity` units priced at `unit_price`.
///
/// ## Errors
/// `Validation(TooLarge)` when the cost does not fit in an `i64`.
pub fn waste_cost(quantity: i64, unit_price: Money) -> CoreResult<Money> {
    unit_price
        .checked_mul(quantity)
        .ok_or_else(|| {
            ValidationError::TooLarge {
                field: "quantity".to_string(),
            }
            .into()
        })
}

/// Aggregated waste for the back-office screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WasteSummary {
    pub record_count: usize,
    pub total_quantity: i64,
    pub total_cost: Money,
    /// Cost per item name, sorted by name.
    pub cost_by_item: Vec<(String, Money)>,
}

/// Summarizes waste records.
pub fn summarize_waste(records: &[WasteRecord]) -> WasteSummary {
    // Each record's cost fits in i64 but their sum may not; totals saturate.
    let mut by_item: BTreeMap<String, Money> = BTreeMap::new();
    for record in records {
        let cost = by_item.entry(record.item_name.clone()).or_default();
        *cost = cost.saturating_add(record.cost);
    }

    WasteSummary {
        record_count: records.len(),
        total_quantity: records
            .iter()
            .fold(0_i64, |acc, r| acc.saturating_add(r.quantity)),
        total_cost: records
            .iter()
            .fold(Money::zero(), |acc, r| acc.saturating_add(r.cost)),
        cost_by_item: by_item.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn item(name: &str, stock: i64, threshold: i64) -> InventoryItem {
        let then = Utc::now() - Duration::days(3);
        InventoryItem {
            id: format!("inv-{}", name),
            name: name.to_string(),
            unit: "kg".to_string(),
            current_stock: stock,
            low_stock_threshold: threshold,
            unit_price: Money::from_rupees(40),
            last_restocked: then,
            updated_at: then,
        }
    }

    #[test]
    fn test_low_stock_boundary_is_inclusive() {
        assert!(item("rice", 5, 5).is_low_stock());
        assert!(!item("rice", 6, 5).is_low_stock());
        assert!(item("rice", 0, 5).is_low_stock());
    }

    #[test]
    fn test_low_stock_items_filters() {
        let items = vec![item("rice", 5, 5), item("dal", 6, 5), item("oil", 1, 2)];
        let low: Vec<String> = low_stock_items(&items).into_iter().map(|i| i.name).collect();
        assert_eq!(low, vec!["rice".to_string(), "oil".to_string()]);
    }

    #[test]
    fn test_stock_increase_refreshes_last_restocked() {
        let mut rice = item("rice", 5, 5);
        let before = rice.last_restocked;
        let now = Utc::now();

        InventoryUpdate {
            current_stock: Some(20),
            ..Default::default()
        }
        .apply(&mut rice, now)
        .unwrap();

        assert_eq!(rice.current_stock, 20);
        assert_eq!(rice.last_restocked, now);
        assert!(rice.last_restocked > before);
    }

    #[test]
    fn test_stock_decrease_keeps_last_restocked() {
        let mut rice = item("rice", 5, 5);
        let before = rice.last_restocked;

        InventoryUpdate {
            current_stock: Some(3),
            unit_price: Some(Money::from_rupees(45)),
            ..Default::default()
        }
        .apply(&mut rice, Utc::now())
        .unwrap();

        assert_eq!(rice.current_stock, 3);
        assert_eq!(rice.unit_price, Money::from_rupees(45));
        assert_eq!(rice.last_restocked, before);
    }

    #[test]
    fn test_negative_stock_is_rejected() {
        let mut rice = item("rice", 5, 5);
        let update = InventoryUpdate {
            current_stock: Some(-1),
            ..Default::default()
        };
        assert!(matches!(
            update.apply(&mut rice, Utc::now()),
            Err(CoreError::NegativeStock { .. })
        ));
        assert_eq!(rice.current_stock, 5);
    }

    #[test]
    fn test_stock_adjustments() {
        let rice = item("rice", 5, 5);

        let update = StockAdjustment::Delta(10).to_update(&rice).unwrap();
        assert_eq!(update.current_stock, Some(15));

        let update = StockAdjustment::Set(2).to_update(&rice).unwrap();
        assert_eq!(update.current_stock, Some(2));

        assert!(StockAdjustment::Delta(-6).to_update(&rice).is_err());
    }

    #[test]
    fn test_waste_matching_and_cost() {
        let items = vec![item("rice", 5, 5), item("milk", 10, 2)];
        let draft = WasteDraft {
            inventory_item_id: None,
            item_name: "milk".to_string(),
            quantity: 3,
            reason: "spoiled".to_string(),
        };

        let matched = draft.match_item(&items).unwrap();
        assert_eq!(matched.name, "milk");
        assert_eq!(
            waste_cost(draft.quantity, matched.unit_price).unwrap(),
            Money::from_rupees(120)
        );

        let by_id = WasteDraft {
            inventory_item_id: Some("inv-rice".to_string()),
            ..draft
        };
        assert_eq!(by_id.match_item(&items).unwrap().name, "rice");
    }

    #[test]
    fn test_overflowing_delta_is_rejected() {
        let milk = item("milk", 5, 5);
        let err = StockAdjustment::Delta(i64::MAX).to_update(&milk).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::TooLarge { ref field }) if field == "current_stock"
        ));
    }

    #[test]
    fn test_overflowing_waste_cost_is_rejected() {
        let err = waste_cost(i64::MAX / 2, Money::from_rupees(60)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_summarize_waste() {
        let record = |name: &str, qty: i64, rupees: i64| WasteRecord {
            id: uuid::Uuid::new_v4().to_string(),
            inventory_item_id: None,
            item_name: name.to_string(),
            quantity: qty,
            reason: "spoiled".to_string(),
            cost: Money::from_rupees(rupees),
            recorded_at: Utc::now(),
        };
        let records = vec![record("milk", 2, 80), record("rice", 1, 40), record("milk", 1, 40)];

        let summary = summarize_waste(&records);
        assert_eq!(summary.record_count, 3);
        assert_eq!(summary.total_quantity, 4);
        assert_eq!(summary.total_cost, Money::from_rupees(160));
        assert_eq!(
            summary.cost_by_item,
            vec![
                ("milk".to_string(), Money::from_rupees(120)),
                ("rice".to_string(), Money::from_rupees(40)),
            ]
        );
    }
}
