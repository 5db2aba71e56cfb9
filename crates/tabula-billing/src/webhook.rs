//! # Webhook Reconciler
//!
//! Applies signed payment notifications to invoices.
//!
//! ## State Machine
//! ```text
//!   unpaid ──[verified checkout.session.completed, metadata.documentId]──► paid
//! ```
//!
//! ## Contract
//! 1. Signature must verify → otherwise `Authentication`, nothing written
//! 2. Only `checkout.session.completed` is acted on; other events are
//!    acknowledged as no-ops
//! 3. No `documentId` in session metadata → acknowledged no-op
//! 4. Otherwise: status = paid, payment reference recorded, keyed by ID and
//!    not gated on the current status, so redelivery converges to the same row
//! 5. Success is returned whether or not a document matched

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{BillingError, BillingResult};
use crate::gateway::DOCUMENT_ID_METADATA_KEY;
use crate::signature::WebhookVerifier;
use crate::store::DocumentStore;

/// The only event type that changes a document.
pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

/// What a successfully verified delivery did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// `mark_paid` ran. `matched` is false when no invoice had that ID.
    Applied { document_id: String, matched: bool },
    /// Acknowledged without touching the store.
    Ignored { reason: IgnoreReason },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    UnhandledEventType(String),
    MissingDocumentId,
}

#[derive(Debug, Deserialize)]
struct Event {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type")]
    event_type: String,
    data: EventData,
}

#[derive(Debug, Deserialize)]
struct EventData {
    object: Value,
}

#[derive(Debug, Deserialize)]
struct CompletedSession {
    id: String,
    /// A string ID, or the expanded object when the sender expands it.
    #[serde(default)]
    payment_intent: Option<Value>,
    #[serde(default)]
    metadata: Option<HashMap<String, String>>,
}

impl CompletedSession {
    fn document_id(&self) -> Option<&str> {
        self.metadata
            .as_ref()?
            .get(DOCUMENT_ID_METADATA_KEY)
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
    }

    /// The payment intent ID, else the session ID.
    fn payment_reference(&self) -> &str {
        match &self.payment_intent {
            Some(Value::String(id)) if !id.is_empty() => id.as_str(),
            Some(Value::Object(intent)) => intent
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or(self.id.as_str()),
            _ => self.id.as_str(),
        }
    }
}

/// Verifies deliveries and settles invoices.
#[derive(Clone)]
pub struct WebhookReconciler {
    store: Arc<dyn DocumentStore>,
    verifier: WebhookVerifier,
}

impl WebhookReconciler {
    pub fn new(store: Arc<dyn DocumentStore>, verifier: WebhookVerifier) -> Self {
        WebhookReconciler { store, verifier }
    }

    /// Handles one delivery: raw body plus signature header value.
    pub async fn handle(
        &self,
        payload: &[u8],
        signature_header: Option<&str>,
    ) -> BillingResult<WebhookOutcome> {
        if let Err(e) = self.verifier.verify(payload, signature_header) {
            warn!(error = %e, "Rejected webhook delivery");
            return Err(e.into());
        }

        self.apply(payload).await
    }

    /// Steps 2 to 5, for a payload whose signature already verified.
    async fn apply(&self, payload: &[u8]) -> BillingResult<WebhookOutcome> {
        let event: Event = serde_json::from_slice(payload)
            .map_err(|e| BillingError::Validation(format!("malformed webhook payload: {e}")))?;

        debug!(event_id = ?event.id, event_type = %event.event_type, "Webhook verified");

        if event.event_type != CHECKOUT_SESSION_COMPLETED {
            return Ok(WebhookOutcome::Ignored {
                reason: IgnoreReason::UnhandledEventType(event.event_type),
            });
        }

        let session: CompletedSession = serde_json::from_value(event.data.object)
            .map_err(|e| BillingError::Validation(format!("malformed checkout session: {e}")))?;

        let Some(document_id) = session.document_id() else {
            info!(session_id = %session.id, "Completed session carries no documentId, ignoring");
            return Ok(WebhookOutcome::Ignored {
                reason: IgnoreReason::MissingDocumentId,
            });
        };

        let payment_reference = session.payment_reference();
        let matched = self.store.mark_paid(document_id, payment_reference).await?;

        if matched {
            info!(
                document_id = %document_id,
                session_id = %session.id,
                payment_reference = %payment_reference,
                "Invoice marked paid"
            );
        } else {
            warn!(
                document_id = %document_id,
                session_id = %session.id,
                "Completed session references no known invoice"
            );
        }

        Ok(WebhookOutcome::Applied {
            document_id: document_id.to_string(),
            matched,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::sign_payload;
    use crate::testing::{sample_document, MemoryStore};
    use chrono::Utc;
    use serde_json::json;
    use std::sync::atomic::Ordering;
    use tabula_core::{DocumentKind, DocumentStatus};

    const SECRET: &str = "whsec_test_secret";
    const INVOICE_ID: &str = "INV2026A3F0600042";

    fn reconciler(store: Arc<MemoryStore>) -> WebhookReconciler {
        WebhookReconciler::new(store, WebhookVerifier::new(SECRET))
    }

    fn completed_event(document_id: Option<&str>, payment_intent: Value) -> Vec<u8> {
        let metadata = match document_id {
            Some(id) => json!({ "documentId": id }),
            None => json!({}),
        };
        json!({
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": { "object": {
                "id": "cs_test_1",
                "object": "checkout.session",
                "payment_intent": payment_intent,
                "payment_status": "paid",
                "metadata": metadata
            }}
        })
        .to_string()
        .into_bytes()
    }

    fn sign(payload: &[u8]) -> String {
        sign_payload(SECRET, Utc::now().timestamp(), payload).unwrap()
    }

    fn store_with_invoice() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::with(vec![sample_document(
            INVOICE_ID,
            DocumentKind::Invoice,
        )]))
    }

    #[tokio::test]
    async fn test_completed_event_marks_invoice_paid() {
        let store = store_with_invoice();
        let payload = completed_event(Some(INVOICE_ID), json!("pi_123"));

        let outcome = reconciler(store.clone())
            .handle(&payload, Some(&sign(&payload)))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            WebhookOutcome::Applied {
                document_id: INVOICE_ID.to_string(),
                matched: true
            }
        );
        let doc = store.snapshot(INVOICE_ID).await.unwrap();
        assert_eq!(doc.status, DocumentStatus::Paid);
        assert_eq!(doc.payment_reference_id.as_deref(), Some("pi_123"));
    }

    #[tokio::test]
    async fn test_duplicate_delivery_is_idempotent() {
        let store = store_with_invoice();
        let reconciler = reconciler(store.clone());
        let payload = completed_event(Some(INVOICE_ID), json!("pi_123"));
        let header = sign(&payload);

        let first = reconciler.handle(&payload, Some(&header)).await.unwrap();
        let after_first = store.snapshot(INVOICE_ID).await.unwrap();
        let second = reconciler.handle(&payload, Some(&header)).await.unwrap();
        let after_second = store.snapshot(INVOICE_ID).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(after_second.status, DocumentStatus::Paid);
        assert_eq!(after_first.payment_reference_id, after_second.payment_reference_id);
        assert_eq!(after_second.payment_reference_id.as_deref(), Some("pi_123"));
    }

    #[tokio::test]
    async fn test_invalid_signature_never_mutates() {
        let store = store_with_invoice();
        let reconciler = reconciler(store.clone());
        let payload = completed_event(Some(INVOICE_ID), json!("pi_123"));

        let forged = sign_payload("whsec_attacker", Utc::now().timestamp(), &payload).unwrap();
        let headers = [None, Some("garbage"), Some(forged.as_str())];

        for header in headers {
            let err = reconciler.handle(&payload, header).await.unwrap_err();
            assert!(matches!(err, BillingError::Authentication(_)));
        }

        // Signed for a different body.
        let other = completed_event(Some(INVOICE_ID), json!("pi_999"));
        let err = reconciler
            .handle(&payload, Some(&sign(&other)))
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::Authentication(_)));

        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
        let doc = store.snapshot(INVOICE_ID).await.unwrap();
        assert_eq!(doc.status, DocumentStatus::Unpaid);
    }

    #[tokio::test]
    async fn test_other_event_types_are_ignored() {
        let store = store_with_invoice();
        let payload = json!({
            "id": "evt_2",
            "type": "payment_intent.succeeded",
            "data": { "object": { "id": "pi_1", "metadata": { "documentId": INVOICE_ID } } }
        })
        .to_string()
        .into_bytes();

        let outcome = reconciler(store.clone())
            .handle(&payload, Some(&sign(&payload)))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            WebhookOutcome::Ignored {
                reason: IgnoreReason::UnhandledEventType("payment_intent.succeeded".to_string())
            }
        );
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_document_id_is_ignored() {
        let store = store_with_invoice();
        let payload = completed_event(None, json!("pi_123"));

        let outcome = reconciler(store.clone())
            .handle(&payload, Some(&sign(&payload)))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            WebhookOutcome::Ignored {
                reason: IgnoreReason::MissingDocumentId
            }
        );
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_document_still_succeeds() {
        let store = store_with_invoice();
        let payload = completed_event(Some("INV2026FFFF999999"), json!("pi_123"));

        let outcome = reconciler(store)
            .handle(&payload, Some(&sign(&payload)))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            WebhookOutcome::Applied {
                document_id: "INV2026FFFF999999".to_string(),
                matched: false
            }
        );
    }

    #[tokio::test]
    async fn test_payment_reference_fallbacks() {
        let store = store_with_invoice();
        let reconciler = reconciler(store.clone());

        let payload = completed_event(Some(INVOICE_ID), Value::Null);
        reconciler.handle(&payload, Some(&sign(&payload))).await.unwrap();
        let doc = store.snapshot(INVOICE_ID).await.unwrap();
        assert_eq!(doc.payment_reference_id.as_deref(), Some("cs_test_1"));

        let payload = completed_event(Some(INVOICE_ID), json!({ "id": "pi_expanded" }));
        reconciler.handle(&payload, Some(&sign(&payload))).await.unwrap();
        let doc = store.snapshot(INVOICE_ID).await.unwrap();
        assert_eq!(doc.payment_reference_id.as_deref(), Some("pi_expanded"));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_validation_error() {
        let store = store_with_invoice();
        let payload = b"{not json".to_vec();

        let err = reconciler(store.clone())
            .handle(&payload, Some(&sign(&payload)))
            .await
            .unwrap_err();

        assert!(matches!(err, BillingError::Validation(_)));
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }
}
