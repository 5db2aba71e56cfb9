//! # Total Calculator
//!
//! Computes a document's subtotal, discount, VAT and total.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        calculate_totals()                               │
//! │                                                                         │
//! │  items ──► clamp (qty >= 1, price >= 0) ──► Σ qty × price = subtotal   │
//! │                                                    │                    │
//! │  discount, discountType ──────────────────────────►│                    │
//! │     percent: subtotal × discount / 100             │                    │
//! │     fixed:   discount                              ▼                    │
//! │           clamp to [0, subtotal] ──► afterDiscount = subtotal − disc.  │
//! │                                                    │                    │
//! │  includeVat, vatRate ─────────────────────────────►│                    │
//! │     vat = includeVat ? afterDiscount × vatRate / 100 : 0               │
//! │                                                    ▼                    │
//! │                                 total = afterDiscount + vat            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here rounds. Conversion to minor units happens only when an
//! invoice is handed to the payment processor.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{DiscountType, LineItem};

/// Everything the calculator depends on, borrowed from a document.
#[derive(Debug, Clone, Copy)]
pub struct PricingInput<'a> {
    pub items: &'a [LineItem],
    pub include_vat: bool,
    pub vat_rate: Decimal,
    pub discount: Decimal,
    pub discount_type: DiscountType,
}

/// Result of [`calculate_totals`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTotals {
    pub subtotal: Money,
    pub discount_amount: Money,
    pub after_discount: Money,
    pub vat: Money,
    pub total: Money,
}

/// Prices a document.
///
/// Pure and deterministic: the same input always yields the same totals, so
/// stored snapshots can be re-derived at any time.
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use tabula_core::totals::{calculate_totals, PricingInput};
/// use tabula_core::{DiscountType, LineItem};
///
/// let items = vec![LineItem::new("Garden cleanup", 2, Decimal::from(100))];
/// let totals = calculate_totals(&PricingInput {
///     items: &items,
///     include_vat: true,
///     vat_rate: Decimal::from(7),
///     discount: Decimal::ZERO,
///     discount_type: DiscountType::Fixed,
/// });
/// assert_eq!(totals.total.amount(), Decimal::from(214));
/// ```
pub fn calculate_totals(input: &PricingInput<'_>) -> DocumentTotals {
    let subtotal: Money = input.items.iter().map(LineItem::line_total).sum();

    let requested_discount = match input.discount_type {
        DiscountType::Percent => subtotal.percent_of(input.discount),
        DiscountType::Fixed => Money::new(input.discount),
    };
    let discount_amount = requested_discount.clamp_between(Money::zero(), subtotal);

    let after_discount = subtotal - discount_amount;

    let vat = if input.include_vat {
        after_discount.percent_of(input.vat_rate)
    } else {
        Money::zero()
    };

    DocumentTotals {
        subtotal,
        discount_amount,
        after_discount,
        vat,
        total: after_discount + vat,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn input(
        items: &[LineItem],
        include_vat: bool,
        vat_rate: Decimal,
        discount: Decimal,
        discount_type: DiscountType,
    ) -> PricingInput<'_> {
        PricingInput {
            items,
            include_vat,
            vat_rate,
            discount,
            discount_type,
        }
    }

    #[test]
    fn test_vat_on_two_units() {
        let items = [LineItem::new("Weeding", 2, dec!(100))];
        let totals = calculate_totals(&input(&items, true, dec!(7), dec!(0), DiscountType::Fixed));

        assert_eq!(totals.subtotal.amount(), dec!(200));
        assert_eq!(totals.after_discount.amount(), dec!(200));
        assert_eq!(totals.vat.amount(), dec!(14));
        assert_eq!(totals.total.amount(), dec!(214));
    }

    #[test]
    fn test_percent_discount_without_vat() {
        let items = [LineItem::new("Tree removal", 1, dec!(1000))];
        let totals =
            calculate_totals(&input(&items, false, dec!(7), dec!(10), DiscountType::Percent));

        assert_eq!(totals.subtotal.amount(), dec!(1000));
        assert_eq!(totals.discount_amount.amount(), dec!(100));
        assert_eq!(totals.after_discount.amount(), dec!(900));
        assert_eq!(totals.vat, Money::zero());
        assert_eq!(totals.total.amount(), dec!(900));
    }

    #[test]
    fn test_fixed_discount_then_vat() {
        let items = [
            LineItem::new("Soil", 4, dec!(125.25)),
            LineItem::new("Labour", 1, dec!(499.00)),
        ];
        let totals = calculate_totals(&input(&items, true, dec!(7), dec!(99), DiscountType::Fixed));

        assert_eq!(totals.subtotal.amount(), dec!(1000));
        assert_eq!(totals.after_discount.amount(), dec!(901));
        assert_eq!(totals.vat.amount(), dec!(63.07));
        assert_eq!(totals.total.amount(), dec!(964.07));
    }

    #[test]
    fn test_discount_clamped_to_subtotal() {
        let items = [LineItem::new("Visit", 1, dec!(300))];

        let fixed = calculate_totals(&input(&items, true, dec!(7), dec!(500), DiscountType::Fixed));
        assert_eq!(fixed.discount_amount.amount(), dec!(300));
        assert_eq!(fixed.after_discount, Money::zero());
        assert_eq!(fixed.total, Money::zero());

        let percent =
            calculate_totals(&input(&items, false, dec!(7), dec!(150), DiscountType::Percent));
        assert_eq!(percent.after_discount, Money::zero());
    }

    #[test]
    fn test_negative_discount_clamped_to_zero() {
        let items = [LineItem::new("Visit", 1, dec!(300))];
        let totals =
            calculate_totals(&input(&items, false, dec!(7), dec!(-20), DiscountType::Fixed));
        assert_eq!(totals.discount_amount, Money::zero());
        assert_eq!(totals.total.amount(), dec!(300));
    }

    #[test]
    fn test_malformed_items_are_clamped() {
        let items = [
            LineItem::new("Zero qty", 0, dec!(50)),
            LineItem::new("Negative qty", -4, dec!(10)),
            LineItem::new("Negative price", 3, dec!(-99)),
        ];
        let totals = calculate_totals(&input(&items, false, dec!(7), dec!(0), DiscountType::Fixed));
        assert_eq!(totals.subtotal.amount(), dec!(60));
    }

    #[test]
    fn test_empty_items() {
        let totals = calculate_totals(&input(&[], true, dec!(7), dec!(10), DiscountType::Fixed));
        assert_eq!(totals.subtotal, Money::zero());
        assert_eq!(totals.discount_amount, Money::zero());
        assert_eq!(totals.total, Money::zero());
    }

    #[test]
    fn test_full_precision_retained() {
        let items = [LineItem::new("Seedlings", 3, dec!(33.333))];
        let totals = calculate_totals(&input(&items, true, dec!(7), dec!(0), DiscountType::Fixed));
        assert_eq!(totals.subtotal.amount(), dec!(99.999));
        assert_eq!(totals.vat.amount(), dec!(6.99993));
        assert_eq!(totals.total.amount(), dec!(106.99893));
    }

    #[test]
    fn test_deterministic() {
        let items = [
            LineItem::new("A", 7, dec!(12.34)),
            LineItem::new("B", 2, dec!(0.01)),
        ];
        let i = input(&items, true, dec!(7), dec!(12.5), DiscountType::Percent);
        assert_eq!(calculate_totals(&i), calculate_totals(&i));
    }
}
