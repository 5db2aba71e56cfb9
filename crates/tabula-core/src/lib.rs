//! # tabula-core: Pure Pricing Logic for Tabula
//!
//! Domain types and pure functions for quotations, invoices and receipts.
//! Nothing in this crate touches a database, the network or the filesystem.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Tabula Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 billing-api (axum HTTP surface)                 │   │
//! │  │   /api/documents ─ /api/checkout ─ /api/webhooks/stripe         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │       tabula-billing (services, payment gateway, webhooks)      │   │
//! │  └──────────────┬──────────────────────────────┬───────────────────┘   │
//! │                 │                              │                        │
//! │  ┌──────────────▼──────────────────────────┐   │                        │
//! │  │         tabula-db (SQLite store)         │   │                        │
//! │  └──────────────┬──────────────────────────┘   │                        │
//! │                 │                              │                        │
//! │  ┌──────────────▼──────────────────────────────▼───────────────────┐   │
//! │  │               ★ tabula-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ │   │
//! │  │   │  types  │ │  money  │ │ totals  │ │   id    │ │ checkout │ │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └──────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Documents, line items, kinds and statuses
//! - [`money`] - Exact decimal money (no floating point)
//! - [`totals`] - Subtotal / discount / VAT / total calculation
//! - [`id`] - Human-readable document IDs
//! - [`checkout`] - Line items as charged by the payment processor
//! - [`validation`] - Creation-input rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use tabula_core::{DocumentKind, LineItem, NewDocument};
//!
//! let mut doc = NewDocument::new(DocumentKind::Invoice, "Khun Somchai");
//! doc.items.push(LineItem::new("Garden cleanup", 2, Decimal::from(100)));
//! doc.include_vat = true;
//!
//! let totals = tabula_core::calculate_totals(&doc.pricing_input());
//! assert_eq!(totals.total.to_string(), "214.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod id;
pub mod money;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use checkout::{to_checkout_line_items, CheckoutLineItem};
pub use error::{CoreError, CoreResult, ValidationError};
pub use id::{generate_document_id, is_valid_document_id};
pub use money::Money;
pub use totals::{calculate_totals, DocumentTotals, PricingInput};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// VAT rate in percent applied when a document does not state one.
pub const DEFAULT_VAT_RATE: i64 = 7;

/// Name given to line items that arrive without one.
pub const DEFAULT_ITEM_NAME: &str = "Item";

/// Maximum line items on one document.
pub const MAX_LINE_ITEMS: usize = 200;

/// Largest quantity accepted on one line item.
pub const MAX_QUANTITY: i64 = 1_000_000;

/// Largest unit price accepted on one line item, in major units.
///
/// With `MAX_QUANTITY` and `MAX_LINE_ITEMS` the largest document total,
/// VAT at 100% included, stays far inside `Decimal` range.
pub const MAX_UNIT_PRICE: i64 = 1_000_000_000_000;

/// Maximum length in characters of free-text header fields
/// (customer name, property).
pub const MAX_TEXT_LEN: usize = 200;

/// The single currency every document is priced and charged in.
pub const CURRENCY: &str = "thb";
