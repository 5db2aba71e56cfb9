//! # Document Row Schema
//!
//! The `documents` table as it actually exists on disk, and the adapter that
//! turns any stored row, old or new, into a [`FinancialDocument`].
//!
//! ## Versions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Concept            v1 column            v2 column                      │
//! │  ─────────────────  ───────────────────  ─────────────────────────     │
//! │  customer name      customer             customer_name                  │
//! │  VAT on/off         vat_included         include_vat                    │
//! │  discount kind      discount_percent=1   discount_type                  │
//! │  after discount     (none)               after_discount                 │
//! │  checkout session   stripe_session_id    checkout_session_id            │
//! │  payment reference  (none)               payment_reference_id           │
//! │  installments       (none)               enable_installments, installm. │
//! │  last change        (none)               updated_at                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Fallback Rules (applied in `into_document`)
//! `schema_version` selects which column answers each concept.
//! 1. customer name: v1 `customer`, v2 `customer_name`; missing is ""
//! 2. include VAT: v1 `vat_included`, v2 `include_vat`; missing is false
//! 3. discount type: v1 percent when `discount_percent = 1`, v2
//!    `discount_type`; otherwise fixed
//! 4. VAT rate: `vat_rate`, else 7. Discount: `discount`, else 0
//! 5. checkout session: `checkout_session_id`, else `stripe_session_id`
//! 6. after discount: v2 `after_discount`; v1 (or a v2 row without it)
//!    recomputed from the stored inputs
//! 7. status missing or outside the kind's domain: the kind's initial status
//!
//! A value that is present but unreadable is an error, never a default.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::str::FromStr;

use tabula_core::{
    calculate_totals, DiscountType, DocumentKind, DocumentStatus, FinancialDocument,
    InstallmentEntry, LineItem, Money, PricingInput, DEFAULT_VAT_RATE,
};
use tabula_core::validation::validate_line_items;

use crate::error::{DbError, DbResult};

/// Columns selected by every document query, in table order.
pub(crate) const DOCUMENT_COLUMNS: &str = "\
    id, kind, customer, property, date, due_date, valid_until, payment_method, notes, \
    items, vat_included, vat_rate, discount, discount_percent, subtotal, vat, total, \
    status, stripe_session_id, created_at, customer_name, include_vat, discount_type, \
    after_discount, checkout_session_id, payment_reference_id, enable_installments, \
    installments, schema_version, updated_at";

// =============================================================================
// Schema Version
// =============================================================================

/// Which generation of the table layout wrote a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    V1,
    V2,
}

impl SchemaVersion {
    /// Version stamped on rows written today.
    pub const CURRENT: SchemaVersion = SchemaVersion::V2;

    pub const fn as_i64(self) -> i64 {
        match self {
            SchemaVersion::V1 => 1,
            SchemaVersion::V2 => 2,
        }
    }

    /// Unknown or missing versions are read as v1, the most permissive layout.
    pub fn from_column(value: Option<i64>) -> Self {
        match value {
            Some(2) => SchemaVersion::V2,
            _ => SchemaVersion::V1,
        }
    }
}

// =============================================================================
// Row
// =============================================================================

/// One row of `documents`, every column optional unless the table says
/// NOT NULL.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DocumentRow {
    pub id: String,
    pub kind: String,

    // v1 columns
    pub customer: Option<String>,
    pub property: Option<String>,
    pub date: String,
    pub due_date: Option<String>,
    pub valid_until: Option<String>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub items: String,
    pub vat_included: Option<bool>,
    pub vat_rate: Option<String>,
    pub discount: Option<String>,
    pub discount_percent: Option<bool>,
    pub subtotal: String,
    pub vat: String,
    pub total: String,
    pub status: Option<String>,
    pub stripe_session_id: Option<String>,
    pub created_at: String,

    // v2 columns
    pub customer_name: Option<String>,
    pub include_vat: Option<bool>,
    pub discount_type: Option<String>,
    pub after_discount: Option<String>,
    pub checkout_session_id: Option<String>,
    pub payment_reference_id: Option<String>,
    pub enable_installments: Option<bool>,
    pub installments: Option<String>,
    pub schema_version: Option<i64>,
    pub updated_at: Option<String>,
}

impl DocumentRow {
    pub fn version(&self) -> SchemaVersion {
        SchemaVersion::from_column(self.schema_version)
    }

    /// Builds the v2 row for a document about to be inserted.
    pub fn from_document(doc: &FinancialDocument) -> DbResult<Self> {
        let items = serde_json::to_string(&doc.items).map_err(|e| DbError::corrupt("items", e))?;
        let installments = serde_json::to_string(&doc.installments)
            .map_err(|e| DbError::corrupt("installments", e))?;

        Ok(DocumentRow {
            id: doc.id.clone(),
            kind: doc.kind.as_str().to_string(),
            customer: None,
            property: Some(doc.property.clone()),
            date: format_date(doc.date),
            due_date: doc.due_date.map(format_date),
            valid_until: doc.valid_until.map(format_date),
            payment_method: doc.payment_method.clone(),
            notes: doc.notes.clone(),
            items,
            vat_included: None,
            vat_rate: Some(doc.vat_rate.to_string()),
            discount: Some(doc.discount.to_string()),
            discount_percent: None,
            subtotal: doc.subtotal.amount().to_string(),
            vat: doc.vat.amount().to_string(),
            total: doc.total.amount().to_string(),
            status: Some(doc.status.as_str().to_string()),
            stripe_session_id: None,
            created_at: format_timestamp(doc.created_at),
            customer_name: Some(doc.customer_name.clone()),
            include_vat: Some(doc.include_vat),
            discount_type: Some(doc.discount_type.as_str().to_string()),
            after_discount: Some(doc.after_discount.amount().to_string()),
            checkout_session_id: doc.checkout_session_id.clone(),
            payment_reference_id: doc.payment_reference_id.clone(),
            enable_installments: Some(doc.enable_installments),
            installments: Some(installments),
            schema_version: Some(SchemaVersion::CURRENT.as_i64()),
            updated_at: Some(format_timestamp(doc.updated_at)),
        })
    }

    /// Converts a stored row of any version into a domain document.
    pub fn into_document(self) -> DbResult<FinancialDocument> {
        let kind = DocumentKind::from_str(&self.kind).map_err(|e| DbError::corrupt("kind", e))?;

        let version = self.version();

        // Rule 1
        let customer_name = match version {
            SchemaVersion::V1 => self.customer,
            SchemaVersion::V2 => self.customer_name,
        }
        .unwrap_or_default();

        // Rule 2
        let include_vat = match version {
            SchemaVersion::V1 => self.vat_included,
            SchemaVersion::V2 => self.include_vat,
        }
        .unwrap_or(false);

        // Rule 3
        let discount_type = match (version, self.discount_type.as_deref()) {
            (SchemaVersion::V1, _) if self.discount_percent == Some(true) => DiscountType::Percent,
            (SchemaVersion::V1, _) | (SchemaVersion::V2, None) => DiscountType::Fixed,
            (SchemaVersion::V2, Some(raw)) => {
                DiscountType::from_str(raw).map_err(|e| DbError::corrupt("discount_type", e))?
            }
        };

        // Rule 4
        let vat_rate = parse_decimal_or("vat_rate", self.vat_rate.as_deref(), Decimal::from(DEFAULT_VAT_RATE))?;
        let discount = parse_decimal_or("discount", self.discount.as_deref(), Decimal::ZERO)?;

        // Rule 5: v1 rows can gain a session after the upgrade, so both layouts
        // read the v2 column first.
        let checkout_session_id = self.checkout_session_id.or(self.stripe_session_id);

        let items: Vec<LineItem> = parse_json("items", &self.items)?;
        let installments: Vec<InstallmentEntry> = match (version, self.installments.as_deref()) {
            (SchemaVersion::V2, Some(raw)) => parse_json("installments", raw)?,
            _ => Vec::new(),
        };

        let subtotal = parse_decimal("subtotal", &self.subtotal)?;
        let vat = parse_decimal("vat", &self.vat)?;
        let total = parse_decimal("total", &self.total)?;

        // Rule 6
        let after_discount = match (version, self.after_discount.as_deref()) {
            (SchemaVersion::V2, Some(raw)) => Money::new(parse_decimal("after_discount", raw)?),
            _ => {
                // Legacy items never went through creation validation.
                validate_line_items(&items).map_err(|e| DbError::corrupt("items", e))?;
                calculate_totals(&PricingInput {
                    items: &items,
                    include_vat,
                    vat_rate,
                    discount,
                    discount_type,
                })
                .after_discount
            }
        };

        // Rule 7
        let status = self
            .status
            .as_deref()
            .and_then(|raw| DocumentStatus::from_str(raw).ok())
            .filter(|status| kind.allows_status(*status))
            .unwrap_or_else(|| kind.initial_status());

        let created_at = parse_timestamp("created_at", &self.created_at)?;
        let updated_at = match self.updated_at.as_deref() {
            Some(raw) => parse_timestamp("updated_at", raw)?,
            None => created_at,
        };

        Ok(FinancialDocument {
            id: self.id,
            kind,
            customer_name,
            property: self.property.unwrap_or_default(),
            date: parse_date("date", &self.date)?,
            due_date: parse_optional_date("due_date", self.due_date.as_deref())?,
            valid_until: parse_optional_date("valid_until", self.valid_until.as_deref())?,
            payment_method: self.payment_method,
            notes: self.notes,
            items,
            include_vat,
            vat_rate,
            discount,
            discount_type,
            enable_installments: self.enable_installments.unwrap_or(false),
            installments,
            subtotal: Money::new(subtotal),
            after_discount,
            vat: Money::new(vat),
            total: Money::new(total),
            status,
            checkout_session_id,
            payment_reference_id: self.payment_reference_id,
            created_at,
            updated_at,
        })
    }
}

// =============================================================================
// Column Codecs
// =============================================================================

/// Timestamps are written as RFC 3339 with milliseconds so that text order
/// matches time order.
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn parse_decimal(column: &str, raw: &str) -> DbResult<Decimal> {
    Decimal::from_str(raw.trim())
        .or_else(|_| Decimal::from_scientific(raw.trim()))
        .map_err(|e| DbError::corrupt(column, format!("{raw:?}: {e}")))
}

fn parse_decimal_or(column: &str, raw: Option<&str>, default: Decimal) -> DbResult<Decimal> {
    match raw {
        Some(raw) => parse_decimal(column, raw),
        None => Ok(default),
    }
}

fn parse_json<T: DeserializeOwned>(column: &str, raw: &str) -> DbResult<T> {
    serde_json::from_str(raw).map_err(|e| DbError::corrupt(column, e))
}

fn parse_date(column: &str, raw: &str) -> DbResult<NaiveDate> {
    // v1 rows sometimes carry a full timestamp in the date column.
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| DbError::corrupt(column, format!("{raw:?}: {e}")))
}

fn parse_optional_date(column: &str, raw: Option<&str>) -> DbResult<Option<NaiveDate>> {
    match raw {
        Some(raw) if !raw.trim().is_empty() => parse_date(column, raw).map(Some),
        _ => Ok(None),
    }
}

/// Accepts RFC 3339 (v2) and SQLite's `CURRENT_TIMESTAMP` format (v1).
fn parse_timestamp(column: &str, raw: &str) -> DbResult<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DbError::corrupt(column, format!("{raw:?}: {e}")))
}

// =============================================================================
// Unit Tests
// =============================================================================
