//! # Checkout Orchestrator
//!
//! Turns an unpaid invoice into a hosted checkout session.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_checkout(document_id, base_url)                                 │
//! │                                                                         │
//! │  1. store.get(id)                  missing       → NotFound            │
//! │  2. kind == invoice                otherwise     → Conflict            │
//! │  3. status != paid                 otherwise     → Conflict            │
//! │  4. to_checkout_line_items()       empty         → Conflict            │
//! │  5. gateway.create_checkout_session()  failure   → Upstream            │
//! │  6. store.attach_checkout_session()    best-effort, logged             │
//! │  7. return session (id + hosted url)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Step 6 runs after the processor already created the session. If it
//! fails the session is left orphaned at the processor; nothing retries or
//! cancels it. A later webhook still settles the invoice because the
//! session metadata carries the document ID.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};

use tabula_core::validation::validate_document_id;
use tabula_core::{
    to_checkout_line_items, CoreError, DocumentKind, DocumentStatus, FinancialDocument,
    CURRENCY, DEFAULT_ITEM_NAME,
};

use crate::error::{BillingError, BillingResult};
use crate::gateway::{
    CheckoutMode, CheckoutSession, CheckoutSessionRequest, PaymentGateway,
    DOCUMENT_ID_METADATA_KEY,
};
use crate::store::DocumentStore;

/// Opens checkout sessions for invoices.
#[derive(Clone)]
pub struct CheckoutOrchestrator {
    store: Arc<dyn DocumentStore>,
    gateway: Arc<dyn PaymentGateway>,
    item_placeholder: String,
}

impl CheckoutOrchestrator {
    pub fn new(store: Arc<dyn DocumentStore>, gateway: Arc<dyn PaymentGateway>) -> Self {
        CheckoutOrchestrator {
            store,
            gateway,
            item_placeholder: DEFAULT_ITEM_NAME.to_string(),
        }
    }

    /// Product name shown for items without one.
    pub fn with_item_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.item_placeholder = placeholder.into();
        self
    }

    /// Creates a hosted checkout session for an unpaid invoice.
    ///
    /// `base_url` is the application origin the processor redirects back to.
    pub async fn create_checkout(
        &self,
        document_id: &str,
        base_url: &str,
    ) -> BillingResult<CheckoutSession> {
        validate_document_id(document_id)?;

        let doc = self
            .store
            .get(document_id)
            .await?
            .ok_or_else(|| BillingError::document_not_found(document_id))?;

        let request = self.session_request(&doc, base_url)?;

        let session = self.gateway.create_checkout_session(&request).await?;
        info!(
            document_id = %doc.id,
            session_id = %session.id,
            gateway = self.gateway.name(),
            "Checkout session created"
        );

        match self
            .store
            .attach_checkout_session(&doc.id, &session.id)
            .await
        {
            Ok(true) => {}
            Ok(false) => warn!(
                document_id = %doc.id,
                session_id = %session.id,
                "Invoice no longer unpaid, checkout session not recorded"
            ),
            Err(e) => error!(
                document_id = %doc.id,
                session_id = %session.id,
                error = %e,
                "Failed to record checkout session; session is orphaned at the processor"
            ),
        }

        Ok(session)
    }

    /// Checks the preconditions and builds the processor request.
    fn session_request(
        &self,
        doc: &FinancialDocument,
        base_url: &str,
    ) -> Result<CheckoutSessionRequest, CoreError> {
        if doc.kind != DocumentKind::Invoice {
            return Err(CoreError::NotPayable {
                document_id: doc.id.clone(),
                kind: doc.kind.to_string(),
            });
        }
        if doc.status == DocumentStatus::Paid {
            return Err(CoreError::AlreadyPaid {
                document_id: doc.id.clone(),
            });
        }

        let line_items = to_checkout_line_items(&doc.items, &self.item_placeholder)?;
        if line_items.is_empty() {
            return Err(CoreError::NoItems {
                document_id: doc.id.clone(),
            });
        }

        let base = base_url.trim_end_matches('/');
        Ok(CheckoutSessionRequest {
            mode: CheckoutMode::Payment,
            currency: CURRENCY.to_string(),
            line_items,
            success_url: format!(
                "{base}/payment/success?documentId={}&session_id={{CHECKOUT_SESSION_ID}}",
                doc.id
            ),
            cancel_url: format!("{base}/payment/cancel?documentId={}", doc.id),
            metadata: BTreeMap::from([(DOCUMENT_ID_METADATA_KEY.to_string(), doc.id.clone())]),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
