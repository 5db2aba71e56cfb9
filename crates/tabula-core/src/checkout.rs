//! # Checkout Line Items
//!
//! Converts document line items into what the payment processor charges.
//! This is the only place where decimal amounts become integer minor units.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::LineItem;

/// A line item as sent to the hosted checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLineItem {
    /// Product name shown on the checkout page.
    pub name: String,
    /// Unit price in minor units (1/100 of the currency unit).
    pub unit_amount: i64,
    /// Always at least one.
    pub quantity: i64,
}

/// Maps document items to checkout items.
///
/// ## Rules
/// - quantity = max(1, quantity)
/// - unit amount = round(max(0, price) × 100), half away from zero
/// - name = item name, or `placeholder` when missing/blank
///
/// Fails only when an amount cannot be represented in minor units.
pub fn to_checkout_line_items(
    items: &[LineItem],
    placeholder: &str,
) -> CoreResult<Vec<CheckoutLineItem>> {
    items
        .iter()
        .map(|item| {
            let unit_amount = item.effective_unit_price().to_minor_units().ok_or_else(|| {
                CoreError::AmountOutOfRange {
                    amount: item.unit_price.to_string(),
                }
            })?;

            Ok(CheckoutLineItem {
                name: item.display_name(placeholder).to_string(),
                unit_amount,
                quantity: item.effective_quantity(),
            })
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
