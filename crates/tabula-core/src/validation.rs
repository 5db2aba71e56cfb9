//! # Validation Module
//!
//! Input validation for document creation.
//!
//! ## What Is Rejected vs. Clamped
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Rejected here (ValidationError)      │  Clamped by the calculator     │
//! │  ────────────────────────────────     │  ───────────────────────────   │
//! │  empty / overlong customer name       │  quantity < 1  → 1             │
//! │  overlong property                    │  price < 0     → 0             │
//! │  VAT rate outside [0, 100]            │  discount > subtotal           │
//! │  negative discount, percent > 100     │  blank item name → placeholder │
//! │  status outside the kind's domain     │                                │
//! │  more than MAX_LINE_ITEMS items       │                                │
//! │  quantity > MAX_QUANTITY              │                                │
//! │  price > MAX_UNIT_PRICE               │                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tabula_core::validation::validate_new_document;
//! use tabula_core::{DocumentKind, NewDocument};
//!
//! let doc = NewDocument::new(DocumentKind::Invoice, "Khun Malee");
//! assert!(validate_new_document(&doc).is_ok());
//! ```

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::types::{DiscountType, DocumentKind, DocumentStatus, LineItem, NewDocument};
use crate::{MAX_LINE_ITEMS, MAX_QUANTITY, MAX_TEXT_LEN, MAX_UNIT_PRICE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Document Validator
// =============================================================================

/// Runs every creation rule against `doc`, stopping at the first failure.
pub fn validate_new_document(doc: &NewDocument) -> ValidationResult<()> {
    validate_customer_name(&doc.customer_name)?;
    validate_property(&doc.property)?;
    validate_vat_rate(doc.vat_rate)?;
    validate_discount(doc.discount, doc.discount_type)?;
    validate_line_items(&doc.items)?;
    if let Some(status) = doc.status {
        validate_status(doc.kind, status)?;
    }
    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a customer name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use tabula_core::validation::validate_customer_name;
///
/// assert!(validate_customer_name("Khun Somchai").is_ok());
/// assert!(validate_customer_name("  ").is_err());
/// ```
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "customerName".to_string(),
        });
    }

    if name.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: "customerName".to_string(),
            max: MAX_TEXT_LEN,
        });
    }

    Ok(())
}

/// Validates the property / site description. May be empty.
pub fn validate_property(property: &str) -> ValidationResult<()> {
    if property.trim().chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: "property".to_string(),
            max: MAX_TEXT_LEN,
        });
    }

    Ok(())
}

/// Validates a document ID used for lookup.
pub fn validate_document_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "documentId".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a VAT rate in percent.
///
/// ## Rules
/// - Must be between 0 and 100 inclusive
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use tabula_core::validation::validate_vat_rate;
///
/// assert!(validate_vat_rate(Decimal::from(7)).is_ok());
/// assert!(validate_vat_rate(Decimal::from(101)).is_err());
/// ```
pub fn validate_vat_rate(rate: Decimal) -> ValidationResult<()> {
    if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
        return Err(ValidationError::OutOfRange {
            field: "vatRate".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

/// Validates a discount figure for its type.
///
/// ## Rules
/// - Never negative
/// - A percent discount is at most 100
/// - A fixed discount larger than the subtotal is allowed; the calculator
///   clamps it
pub fn validate_discount(discount: Decimal, discount_type: DiscountType) -> ValidationResult<()> {
    if discount < Decimal::ZERO {
        return Err(ValidationError::Negative {
            field: "discount".to_string(),
        });
    }

    if discount_type == DiscountType::Percent && discount > Decimal::ONE_HUNDRED {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

// =============================================================================
// Collection / Domain Validators
// =============================================================================

/// Validates the number of line items.
pub fn validate_item_count(count: usize) -> ValidationResult<()> {
    if count > MAX_LINE_ITEMS {
        return Err(ValidationError::TooMany {
            field: "items".to_string(),
            max: MAX_LINE_ITEMS,
        });
    }

    Ok(())
}

/// Validates item count and the upper bounds of each item.
///
/// Only the ceilings are checked; zero or negative quantities and prices
/// are clamped by the calculator.
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use tabula_core::validation::validate_line_items;
/// use tabula_core::LineItem;
///
/// assert!(validate_line_items(&[LineItem::new("Mowing", 0, Decimal::from(-5))]).is_ok());
/// assert!(validate_line_items(&[LineItem::new("Mowing", 2_000_000, Decimal::ONE)]).is_err());
/// ```
pub fn validate_line_items(items: &[LineItem]) -> ValidationResult<()> {
    validate_item_count(items.len())?;

    let max_price = Decimal::from(MAX_UNIT_PRICE);
    for (index, item) in items.iter().enumerate() {
        if item.quantity > MAX_QUANTITY {
            return Err(ValidationError::TooLarge {
                field: format!("items[{index}].quantity"),
                max: MAX_QUANTITY.to_string(),
            });
        }

        if item.unit_price > max_price {
            return Err(ValidationError::TooLarge {
                field: format!("items[{index}].unitPrice"),
                max: MAX_UNIT_PRICE.to_string(),
            });
        }
    }

    Ok(())
}

/// Validates that an explicit status belongs to the kind's status domain.
pub fn validate_status(kind: DocumentKind, status: DocumentStatus) -> ValidationResult<()> {
    if kind.allows_status(status) {
        return Ok(());
    }

    let allowed = [
        DocumentStatus::Pending,
        DocumentStatus::Unpaid,
        DocumentStatus::Paid,
    ]
    .into_iter()
    .filter(|s| kind.allows_status(*s))
    .map(|s| s.as_str().to_string())
    .collect();

    Err(ValidationError::NotAllowed {
        field: "status".to_string(),
        allowed,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LineItem;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_customer_name() {
        assert!(validate_customer_name("Khun Somchai").is_ok());
        assert!(validate_customer_name("สมชาย ใจดี").is_ok());

        assert!(validate_customer_name("").is_err());
        assert!(validate_customer_name("   ").is_err());
        assert!(validate_customer_name(&"A".repeat(201)).is_err());
    }

    #[test]
    fn test_thai_names_counted_by_character() {
        // 200 Thai characters are 600 bytes in UTF-8 but still within limit.
        assert!(validate_customer_name(&"ก".repeat(200)).is_ok());
    }

    #[test]
    fn test_validate_property() {
        assert!(validate_property("").is_ok());
        assert!(validate_property("12/3 Sukhumvit Soi 11").is_ok());
        assert!(validate_property(&"B".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_vat_rate() {
        assert!(validate_vat_rate(dec!(0)).is_ok());
        assert!(validate_vat_rate(dec!(7)).is_ok());
        assert!(validate_vat_rate(dec!(100)).is_ok());
        assert!(validate_vat_rate(dec!(-1)).is_err());
        assert!(validate_vat_rate(dec!(100.01)).is_err());
    }

    #[test]
    fn test_validate_discount() {
        assert!(validate_discount(dec!(0), DiscountType::Fixed).is_ok());
        assert!(validate_discount(dec!(5000), DiscountType::Fixed).is_ok());
        assert!(validate_discount(dec!(100), DiscountType::Percent).is_ok());

        assert!(validate_discount(dec!(-1), DiscountType::Fixed).is_err());
        assert!(validate_discount(dec!(100.5), DiscountType::Percent).is_err());
    }

    #[test]
    fn test_validate_status() {
        assert!(validate_status(DocumentKind::Invoice, DocumentStatus::Paid).is_ok());

        let err = validate_status(DocumentKind::Quotation, DocumentStatus::Paid).unwrap_err();
        match err {
            ValidationError::NotAllowed { allowed, .. } => assert_eq!(allowed, vec!["pending"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_line_item_bounds() {
        let at_limit = LineItem::new("Land clearing", MAX_QUANTITY, Decimal::from(MAX_UNIT_PRICE));
        assert!(validate_line_items(&vec![at_limit; MAX_LINE_ITEMS]).is_ok());

        let err = validate_line_items(&[
            LineItem::new("Mowing", 1, dec!(100)),
            LineItem::new("Big", 2, dec!(50000000000000000000000000000)),
        ])
        .unwrap_err();
        assert_eq!(err.to_string(), "items[1].unitPrice must be at most 1000000000000");

        let err = validate_line_items(&[LineItem::new("Mowing", i64::MAX, dec!(1))]).unwrap_err();
        assert!(matches!(err, ValidationError::TooLarge { ref field, .. } if field == "items[0].quantity"));
    }

    #[test]
    fn test_largest_valid_document_prices_without_overflow() {
        use crate::totals::{calculate_totals, PricingInput};

        let items = vec![
            LineItem::new("Land clearing", MAX_QUANTITY, Decimal::from(MAX_UNIT_PRICE));
            MAX_LINE_ITEMS
        ];
        assert!(validate_line_items(&items).is_ok());

        let totals = calculate_totals(&PricingInput {
            items: &items,
            include_vat: true,
            vat_rate: dec!(100),
            discount: Decimal::ZERO,
            discount_type: DiscountType::Fixed,
        });
        assert_eq!(totals.total.amount(), dec!(400000000000000000000));
    }

    #[test]
    fn test_validate_document_id() {
        assert!(validate_document_id("INV2026A3F0600042").is_ok());
        assert!(validate_document_id("").is_err());
        assert!(validate_document_id("  ").is_err());
    }

    #[test]
    fn test_validate_new_document() {
        let mut doc = NewDocument::new(DocumentKind::Receipt, "Khun Malee");
        doc.items = vec![LineItem::new("Cleaning", -2, dec!(-5))];
        assert!(validate_new_document(&doc).is_ok(), "items are clamped, not rejected");

        doc.status = Some(DocumentStatus::Unpaid);
        assert!(validate_new_document(&doc).is_err());

        let mut doc = NewDocument::new(DocumentKind::Invoice, "Khun Malee");
        doc.items = vec![LineItem::new("x", 1, dec!(1)); MAX_LINE_ITEMS + 1];
        assert!(matches!(
            validate_new_document(&doc),
            Err(ValidationError::TooMany { .. })
        ));
    }
}
