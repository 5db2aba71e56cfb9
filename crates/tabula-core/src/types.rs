//! # Domain Types
//!
//! Core domain types used throughout Tabula.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────────┐   ┌─────────────────┐   ┌─────────────────┐   │
//! │  │ FinancialDocument   │   │    LineItem     │   │ InstallmentEntry│   │
//! │  │  ─────────────────  │   │  ─────────────  │   │  ─────────────  │   │
//! │  │  id (INV2026…)      │   │  name           │   │  description    │   │
//! │  │  kind / status      │   │  quantity       │   │  amount         │   │
//! │  │  items, VAT, disc.  │   │  unit_price     │   │  due_date       │   │
//! │  │  totals snapshot    │   └─────────────────┘   └─────────────────┘   │
//! │  │  checkout session   │                                                │
//! │  └─────────────────────┘                                                │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  DocumentKind   │   │ DocumentStatus  │   │  DiscountType   │       │
//! │  │  Quotation  (Q) │   │  Pending        │   │  Percent        │       │
//! │  │  Invoice  (INV) │   │  Unpaid         │   │  Fixed          │       │
//! │  │  Receipt  (REC) │   │  Paid           │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Status Domain per Kind
//! - quotation → {pending}
//! - invoice   → {unpaid, paid}, and only unpaid → paid ever happens
//! - receipt   → {paid}

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::totals::{DocumentTotals, PricingInput};
use crate::DEFAULT_VAT_RATE;

// =============================================================================
// Document Kind
// =============================================================================

/// The kind of financial document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Quotation,
    Invoice,
    Receipt,
}

impl DocumentKind {
    /// Prefix used by the document ID generator.
    pub const fn id_prefix(&self) -> &'static str {
        match self {
            DocumentKind::Quotation => "Q",
            DocumentKind::Invoice => "INV",
            DocumentKind::Receipt => "REC",
        }
    }

    /// Status a freshly created document of this kind starts in.
    pub const fn initial_status(&self) -> DocumentStatus {
        match self {
            DocumentKind::Quotation => DocumentStatus::Pending,
            DocumentKind::Invoice => DocumentStatus::Unpaid,
            DocumentKind::Receipt => DocumentStatus::Paid,
        }
    }

    /// Checks whether `status` belongs to this kind's status domain.
    pub const fn allows_status(&self, status: DocumentStatus) -> bool {
        matches!(
            (self, status),
            (DocumentKind::Quotation, DocumentStatus::Pending)
                | (DocumentKind::Invoice, DocumentStatus::Unpaid)
                | (DocumentKind::Invoice, DocumentStatus::Paid)
                | (DocumentKind::Receipt, DocumentStatus::Paid)
        )
    }

    /// Database / wire representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Quotation => "quotation",
            DocumentKind::Invoice => "invoice",
            DocumentKind::Receipt => "receipt",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quotation" => Ok(DocumentKind::Quotation),
            "invoice" => Ok(DocumentKind::Invoice),
            "receipt" => Ok(DocumentKind::Receipt),
            _ => Err(ValidationError::NotAllowed {
                field: "type".to_string(),
                allowed: vec![
                    "quotation".to_string(),
                    "invoice".to_string(),
                    "receipt".to_string(),
                ],
            }),
        }
    }
}

// =============================================================================
// Document Status
// =============================================================================

/// Lifecycle status of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Quotation awaiting the customer's decision.
    Pending,
    /// Invoice issued, payment outstanding.
    Unpaid,
    /// Invoice settled, or a receipt.
    Paid,
}

impl DocumentStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Pending => "pending",
            DocumentStatus::Unpaid => "unpaid",
            DocumentStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(DocumentStatus::Pending),
            "unpaid" => Ok(DocumentStatus::Unpaid),
            "paid" => Ok(DocumentStatus::Paid),
            _ => Err(ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: vec![
                    "pending".to_string(),
                    "unpaid".to_string(),
                    "paid".to_string(),
                ],
            }),
        }
    }
}

// =============================================================================
// Discount Type
// =============================================================================

/// How the `discount` figure on a document is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// `discount` is a percentage of the subtotal.
    Percent,
    /// `discount` is an absolute amount.
    #[default]
    Fixed,
}

impl DiscountType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percent => "percent",
            DiscountType::Fixed => "fixed",
        }
    }
}

impl FromStr for DiscountType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "percent" => Ok(DiscountType::Percent),
            "fixed" => Ok(DiscountType::Fixed),
            _ => Err(ValidationError::NotAllowed {
                field: "discountType".to_string(),
                allowed: vec!["percent".to_string(), "fixed".to_string()],
            }),
        }
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// A priced line on a document.
///
/// Quantity and price are taken as given here; the total calculator clamps
/// them (`quantity >= 1`, `unit_price >= 0`) rather than rejecting them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Description shown on the document. Blank names get a placeholder.
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default = "default_quantity")]
    pub quantity: i64,

    /// Price per unit in major units.
    #[serde(default, alias = "price")]
    #[ts(type = "string")]
    pub unit_price: Decimal,
}

fn default_quantity() -> i64 {
    1
}

impl LineItem {
    /// Creates a named line item.
    pub fn new(name: impl Into<String>, quantity: i64, unit_price: Decimal) -> Self {
        LineItem {
            name: Some(name.into()),
            quantity,
            unit_price,
        }
    }

    /// Quantity used for pricing: never below one.
    #[inline]
    pub fn effective_quantity(&self) -> i64 {
        self.quantity.max(1)
    }

    /// Unit price used for pricing: never negative.
    #[inline]
    pub fn effective_unit_price(&self) -> Money {
        Money::new(self.unit_price.max(Decimal::ZERO))
    }

    /// Effective quantity × effective unit price.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.effective_unit_price() * self.effective_quantity()
    }

    /// The display name, or `placeholder` when the name is missing or blank.
    pub fn display_name<'a>(&'a self, placeholder: &'a str) -> &'a str {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => placeholder,
        }
    }

    /// Returns the item as it is stored: clamped quantity/price and a
    /// non-blank name.
    pub fn normalized(&self, placeholder: &str) -> LineItem {
        LineItem {
            name: Some(self.display_name(placeholder).to_string()),
            quantity: self.effective_quantity(),
            unit_price: self.effective_unit_price().amount(),
        }
    }
}

// =============================================================================
// Installment Entry
// =============================================================================

/// One entry of an installment schedule. Stored as-is, not priced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentEntry {
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    #[ts(type = "string")]
    pub amount: Decimal,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
}

// =============================================================================
// Financial Document
// =============================================================================

/// A quotation, invoice or receipt with its pricing snapshot.
///
/// ## Snapshot Pattern
/// `subtotal`, `after_discount`, `vat` and `total` are frozen at creation.
/// Recomputing them from the stored inputs yields the same values because
/// the total calculator is a pure function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct FinancialDocument {
    /// Human-readable ID, assigned once at creation (e.g. `INV2026A3F0123456`).
    pub id: String,

    #[serde(rename = "type")]
    pub kind: DocumentKind,

    pub customer_name: String,
    pub property: String,

    #[ts(as = "String")]
    pub date: NaiveDate,
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub valid_until: Option<NaiveDate>,

    pub payment_method: Option<String>,
    pub notes: Option<String>,

    pub items: Vec<LineItem>,

    pub include_vat: bool,
    #[ts(type = "string")]
    pub vat_rate: Decimal,
    #[ts(type = "string")]
    pub discount: Decimal,
    pub discount_type: DiscountType,

    pub enable_installments: bool,
    pub installments: Vec<InstallmentEntry>,

    pub subtotal: Money,
    pub after_discount: Money,
    pub vat: Money,
    pub total: Money,

    pub status: DocumentStatus,

    /// Hosted checkout session most recently opened for this invoice.
    pub checkout_session_id: Option<String>,
    /// Processor payment reference recorded when the invoice was paid.
    pub payment_reference_id: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl FinancialDocument {
    /// Only unpaid invoices can be sent to checkout.
    pub fn is_payable(&self) -> bool {
        self.kind == DocumentKind::Invoice && self.status != DocumentStatus::Paid
    }

    /// The calculator input this document was priced from.
    pub fn pricing_input(&self) -> PricingInput<'_> {
        PricingInput {
            items: &self.items,
            include_vat: self.include_vat,
            vat_rate: self.vat_rate,
            discount: self.discount,
            discount_type: self.discount_type,
        }
    }

    /// The stored totals snapshot.
    pub fn totals(&self) -> DocumentTotals {
        DocumentTotals {
            subtotal: self.subtotal,
            discount_amount: self.subtotal - self.after_discount,
            after_discount: self.after_discount,
            vat: self.vat,
            total: self.total,
        }
    }
}

// =============================================================================
// New Document (creation input)
// =============================================================================

/// Input for creating a document. Everything not given gets a default.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewDocument {
    #[serde(rename = "type")]
    pub kind: DocumentKind,

    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub property: String,

    /// Document date; today (UTC) when absent.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub valid_until: Option<NaiveDate>,

    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub items: Vec<LineItem>,

    #[serde(default)]
    pub include_vat: bool,
    #[serde(default = "default_vat_rate")]
    #[ts(type = "string")]
    pub vat_rate: Decimal,
    #[serde(default)]
    #[ts(type = "string")]
    pub discount: Decimal,
    #[serde(default)]
    pub discount_type: DiscountType,

    #[serde(default)]
    pub enable_installments: bool,
    #[serde(default)]
    pub installments: Vec<InstallmentEntry>,

    /// Explicit status; must fit the kind. The kind's initial status when absent.
    #[serde(default)]
    pub status: Option<DocumentStatus>,
}

fn default_vat_rate() -> Decimal {
    Decimal::from(DEFAULT_VAT_RATE)
}

impl NewDocument {
    /// A blank document of `kind` for `customer_name`, all policy at defaults.
    pub fn new(kind: DocumentKind, customer_name: impl Into<String>) -> Self {
        NewDocument {
            kind,
            customer_name: customer_name.into(),
            property: String::new(),
            date: None,
            due_date: None,
            valid_until: None,
            payment_method: None,
            notes: None,
            items: Vec::new(),
            include_vat: false,
            vat_rate: default_vat_rate(),
            discount: Decimal::ZERO,
            discount_type: DiscountType::default(),
            enable_installments: false,
            installments: Vec::new(),
            status: None,
        }
    }

    pub fn pricing_input(&self) -> PricingInput<'_> {
        PricingInput {
            items: &self.items,
            include_vat: self.include_vat,
            vat_rate: self.vat_rate,
            discount: self.discount,
            discount_type: self.discount_type,
        }
    }

    /// Status the document will be stored with.
    pub fn resolved_status(&self) -> DocumentStatus {
        self.status.unwrap_or_else(|| self.kind.initial_status())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_id_prefixes() {
        assert_eq!(DocumentKind::Quotation.id_prefix(), "Q");
        assert_eq!(DocumentKind::Invoice.id_prefix(), "INV");
        assert_eq!(DocumentKind::Receipt.id_prefix(), "REC");
    }

    #[test]
    fn test_status_domains() {
        use DocumentKind::*;
        use DocumentStatus::*;

        assert!(Quotation.allows_status(Pending));
        assert!(!Quotation.allows_status(Unpaid));
        assert!(!Quotation.allows_status(Paid));

        assert!(Invoice.allows_status(Unpaid));
        assert!(Invoice.allows_status(Paid));
        assert!(!Invoice.allows_status(Pending));

        assert!(Receipt.allows_status(Paid));
        assert!(!Receipt.allows_status(Unpaid));

        for kind in [Quotation, Invoice, Receipt] {
            assert!(kind.allows_status(kind.initial_status()));
        }
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("Invoice".parse::<DocumentKind>().unwrap(), DocumentKind::Invoice);
        assert!("bill".parse::<DocumentKind>().is_err());
        assert_eq!("PAID".parse::<DocumentStatus>().unwrap(), DocumentStatus::Paid);
        assert_eq!("percent".parse::<DiscountType>().unwrap(), DiscountType::Percent);
    }

    #[test]
    fn test_line_item_clamping() {
        let item = LineItem::new("Lawn mowing", 0, dec!(-50));
        assert_eq!(item.effective_quantity(), 1);
        assert_eq!(item.effective_unit_price(), Money::zero());

        let item = LineItem::new("Hedge trim", 3, dec!(250.50));
        assert_eq!(item.line_total().amount(), dec!(751.50));
    }

    #[test]
    fn test_line_item_placeholder_name() {
        let unnamed = LineItem {
            name: Some("   ".to_string()),
            quantity: 1,
            unit_price: dec!(10),
        };
        assert_eq!(unnamed.display_name("Item"), "Item");

        let normalized = unnamed.normalized("Item");
        assert_eq!(normalized.name.as_deref(), Some("Item"));
    }

    #[test]
    fn test_line_item_wire_format() {
        let item: LineItem =
            serde_json::from_str(r#"{"name":"Pruning","quantity":2,"price":100}"#).unwrap();
        assert_eq!(item.quantity, 2);
        assert_eq!(item.unit_price, dec!(100));

        let bare: LineItem = serde_json::from_str("{}").unwrap();
        assert_eq!(bare.quantity, 1);
        assert_eq!(bare.unit_price, Decimal::ZERO);
        assert!(bare.name.is_none());
    }

    #[test]
    fn test_new_document_defaults() {
        let doc: NewDocument =
            serde_json::from_str(r#"{"type":"invoice","customerName":"Khun Somchai"}"#).unwrap();
        assert_eq!(doc.vat_rate, dec!(7));
        assert_eq!(doc.discount, Decimal::ZERO);
        assert_eq!(doc.discount_type, DiscountType::Fixed);
        assert_eq!(doc.resolved_status(), DocumentStatus::Unpaid);
    }
}
