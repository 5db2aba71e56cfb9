//! # Document Service
//!
//! Creating and reading quotations, invoices and receipts.
//!
//! ## Create Flow
//! ```text
//! NewDocument
//!     │
//!     ├── validate_new_document()          → Validation
//!     ├── normalize items                  (placeholder name, clamped qty/price)
//!     ├── calculate_totals()               → frozen snapshot
//!     ├── resolve status                   (explicit, else kind's initial)
//!     │
//!     └── loop up to MAX_ID_ATTEMPTS
//!            generate_document_id(kind)
//!            store.insert()
//!              ├── Ok        → done
//!              ├── Conflict  → new ID, try again
//!              └── Backend   → Upstream
//! ```

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use tabula_core::validation::{validate_document_id, validate_new_document};
use tabula_core::{
    calculate_totals, generate_document_id, FinancialDocument, LineItem, NewDocument,
    DEFAULT_ITEM_NAME,
};

use crate::error::{BillingError, BillingResult};
use crate::store::{DocumentStore, StoreError};

/// How many IDs are tried before creation gives up.
pub const MAX_ID_ATTEMPTS: usize = 5;

/// Page size when the caller does not give one.
pub const DEFAULT_LIST_LIMIT: u32 = 50;

/// Largest page `list_recent` returns.
pub const MAX_LIST_LIMIT: u32 = 100;

/// Creates and reads documents.
#[derive(Clone)]
pub struct DocumentService {
    store: Arc<dyn DocumentStore>,
    item_placeholder: String,
}

impl DocumentService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        DocumentService {
            store,
            item_placeholder: DEFAULT_ITEM_NAME.to_string(),
        }
    }

    /// Name stored for items submitted without one.
    pub fn with_item_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.item_placeholder = placeholder.into();
        self
    }

    /// Prices, identifies and stores a new document.
    #[instrument(skip(self, input), fields(kind = %input.kind))]
    pub async fn create(&self, input: NewDocument) -> BillingResult<FinancialDocument> {
        validate_new_document(&input)?;

        let items: Vec<LineItem> = input
            .items
            .iter()
            .map(|item| item.normalized(&self.item_placeholder))
            .collect();

        let status = input.resolved_status();
        let now = Utc::now();

        let mut doc = FinancialDocument {
            id: String::new(),
            kind: input.kind,
            customer_name: input.customer_name.trim().to_string(),
            property: input.property.trim().to_string(),
            date: input.date.unwrap_or_else(|| now.date_naive()),
            due_date: input.due_date,
            valid_until: input.valid_until,
            payment_method: input.payment_method,
            notes: input.notes,
            items,
            include_vat: input.include_vat,
            vat_rate: input.vat_rate,
            discount: input.discount,
            discount_type: input.discount_type,
            enable_installments: input.enable_installments,
            installments: input.installments,
            subtotal: Default::default(),
            after_discount: Default::default(),
            vat: Default::default(),
            total: Default::default(),
            status,
            checkout_session_id: None,
            payment_reference_id: None,
            created_at: now,
            updated_at: now,
        };

        let totals = calculate_totals(&doc.pricing_input());
        doc.subtotal = totals.subtotal;
        doc.after_discount = totals.after_discount;
        doc.vat = totals.vat;
        doc.total = totals.total;

        for attempt in 1..=MAX_ID_ATTEMPTS {
            doc.id = generate_document_id(doc.kind);

            match self.store.insert(&doc).await {
                Ok(()) => {
                    info!(document_id = %doc.id, total = %doc.total, "Document created");
                    return Ok(doc);
                }
                Err(StoreError::Conflict { id }) => {
                    warn!(document_id = %id, attempt, "Document ID already taken, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(BillingError::Conflict(format!(
            "could not allocate a unique document id after {MAX_ID_ATTEMPTS} attempts"
        )))
    }

    /// Loads one document.
    pub async fn get(&self, id: &str) -> BillingResult<FinancialDocument> {
        validate_document_id(id)?;

        self.store
            .get(id)
            .await?
            .ok_or_else(|| BillingError::document_not_found(id))
    }

    /// Newest documents first. `limit` defaults to 50 and is clamped to 1..=100.
    pub async fn list_recent(&self, limit: Option<u32>) -> BillingResult<Vec<FinancialDocument>> {
        let limit = limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT);
        Ok(self.store.list_recent(limit).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
