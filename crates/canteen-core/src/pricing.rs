//! # Pricing Calculator
//!
//! The single bill calculation used by the cart, shopper checkout and counter
//! billing. Keeping one function means the total a shopper sees is exactly
//! the total recorded on the order.
//!
//! ```text
//! (unit price, qty) pairs
//!        │
//!        ▼
//! subtotal = Σ price × qty
//!        │
//!        ▼
//! tax      = subtotal × rate   (half-up to the paisa)
//!        │
//!        ▼
//! total    = subtotal + tax
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::TaxRate;

/// Subtotal, tax and total of a bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Bill {
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

/// Calculates a bill from `(unit price, quantity)` pairs.
///
/// Tax is taken on the subtotal as a whole, not per line, so the rounding
/// happens exactly once. An empty input yields an all-zero bill.
///
/// ## Example
/// ```rust
/// use canteen_core::money::Money;
/// use canteen_core::pricing::calculate_bill;
/// use canteen_core::types::TaxRate;
///
/// let bill = calculate_bill([(Money::from_rupees(80), 2)], TaxRate::from_bps(500));
/// assert_eq!(bill.subtotal, Money::from_rupees(160));
/// assert_eq!(bill.tax, Money::from_rupees(8));
/// assert_eq!(bill.total, Money::from_rupees(168));
/// ```
pub fn calculate_bill<I>(lines: I, rate: TaxRate) -> Bill
where
    I: IntoIterator<Item = (Money, i64)>,
{
    let subtotal: Money = lines
        .into_iter()
        .map(|(price, qty)| price.multiply_quantity(qty))
        .sum();
    let tax = subtotal.calculate_tax(rate);

    Bill {
        subtotal,
        tax,
        total: subtotal + tax,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_TAX_RATE;

    #[test]
    fn test_empty_bill_is_zero() {
        let bill = calculate_bill(std::iter::empty(), DEFAULT_TAX_RATE);
        assert_eq!(bill, Bill::default());
    }

    #[test]
    fn test_reference_bill() {
        let bill = calculate_bill(
            [(Money::from_rupees(80), 2), (Money::from_rupees(60), 1)],
            DEFAULT_TAX_RATE,
        );
        assert_eq!(bill.subtotal.paise(), 22000);
        assert_eq!(bill.tax.paise(), 1100);
        assert_eq!(bill.total.paise(), 23100);
    }

    #[test]
    fn test_total_is_subtotal_plus_tax_for_odd_prices() {
        let prices = [1, 9, 10, 33, 1999, 4550, 12345];
        for (i, price) in prices.iter().enumerate() {
            let qty = i as i64 + 1;
            let bill = calculate_bill([(Money::from_paise(*price), qty)], DEFAULT_TAX_RATE);

            let subtotal = price * qty;
            assert_eq!(bill.subtotal.paise(), subtotal);
            // round2(subtotal × 0.05), half-up
            assert_eq!(bill.tax.paise(), (subtotal * 5 + 50) / 100);
            assert_eq!(bill.total - bill.subtotal - bill.tax, Money::zero());
        }
    }
}
