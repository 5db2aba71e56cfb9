//! In-memory doubles for the store and payment gateway.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;

use tabula_core::{
    calculate_totals, DiscountType, DocumentKind, DocumentStatus, FinancialDocument, LineItem,
    Money,
};

use crate::gateway::{CheckoutSession, CheckoutSessionRequest, GatewayError, PaymentGateway};
use crate::store::{DocumentStore, StoreError};

/// A priced document: 2 × 100 with 7% VAT, total 214.
pub(crate) fn sample_document(id: &str, kind: DocumentKind) -> FinancialDocument {
    let now = Utc::now();
    let mut doc = FinancialDocument {
        id: id.to_string(),
        kind,
        customer_name: "Khun Somchai".to_string(),
        property: "Baan Suan 12".to_string(),
        date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
        due_date: None,
        valid_until: None,
        payment_method: None,
        notes: None,
        items: vec![LineItem::new("Garden cleanup", 2, dec!(100))],
        include_vat: true,
        vat_rate: dec!(7),
        discount: Decimal::ZERO,
        discount_type: DiscountType::Fixed,
        enable_installments: false,
        installments: Vec::new(),
        subtotal: Money::zero(),
        after_discount: Money::zero(),
        vat: Money::zero(),
        total: Money::zero(),
        status: kind.initial_status(),
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
    doc
}

// =============================================================================
// Memory Store
// =============================================================================

#[derive(Default)]
pub(crate) struct MemoryStore {
    docs: Mutex<Vec<FinancialDocument>>,
    conflicts_remaining: AtomicUsize,
    fail_attach: AtomicBool,
    pub(crate) inserts: AtomicUsize,
    pub(crate) writes: AtomicUsize,
}

impl MemoryStore {
    pub(crate) fn with(docs: Vec<FinancialDocument>) -> Self {
        MemoryStore {
            docs: Mutex::new(docs),
            ..Default::default()
        }
    }

    /// The next `n` inserts report an ID conflict.
    pub(crate) fn conflict_next(&self, n: usize) {
        self.conflicts_remaining.store(n, Ordering::SeqCst);
    }

    pub(crate) fn fail_attach(&self) {
        self.fail_attach.store(true, Ordering::SeqCst);
    }

    pub(crate) async fn snapshot(&self, id: &str) -> Option<FinancialDocument> {
        self.docs.lock().await.iter().find(|d| d.id == id).cloned()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, doc: &FinancialDocument) -> Result<(), StoreError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        let pending = self.conflicts_remaining.load(Ordering::SeqCst);
        if pending > 0 {
            self.conflicts_remaining.store(pending - 1, Ordering::SeqCst);
            return Err(StoreError::Conflict { id: doc.id.clone() });
        }

        let mut docs = self.docs.lock().await;
        if docs.iter().any(|d| d.id == doc.id) {
            return Err(StoreError::Conflict { id: doc.id.clone() });
        }
        docs.push(doc.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<FinancialDocument>, StoreError> {
        Ok(self.snapshot(id).await)
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<FinancialDocument>, StoreError> {
        let mut docs = self.docs.lock().await.clone();
        docs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        docs.truncate(limit as usize);
        Ok(docs)
    }

    async fn attach_checkout_session(&self, id: &str, session_id: &str) -> Result<bool, StoreError> {
        if self.fail_attach.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("connection reset".to_string()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);

        let mut docs = self.docs.lock().await;
        match docs.iter_mut().find(|d| {
            d.id == id && d.kind == DocumentKind::Invoice && d.status != DocumentStatus::Paid
        }) {
            Some(doc) => {
                doc.checkout_session_id = Some(session_id.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_paid(&self, id: &str, payment_reference: &str) -> Result<bool, StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);

        let mut docs = self.docs.lock().await;
        match docs
            .iter_mut()
            .find(|d| d.id == id && d.kind == DocumentKind::Invoice)
        {
            Some(doc) => {
                doc.status = DocumentStatus::Paid;
                doc.payment_reference_id = Some(payment_reference.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// =============================================================================
// Fake Gateway
// =============================================================================

#[derive(Default)]
pub(crate) struct FakeGateway {
    pub(crate) requests: Mutex<Vec<CheckoutSessionRequest>>,
    fail: AtomicBool,
    counter: AtomicUsize,
}

impl FakeGateway {
    pub(crate) fn failing() -> Self {
        let gateway = FakeGateway::default();
        gateway.fail.store(true, Ordering::SeqCst);
        gateway
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(GatewayError::Api {
                status: 500,
                message: "processor down".to_string(),
            });
        }
        self.requests.lock().await.push(request.clone());

        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(CheckoutSession {
            id: format!("cs_test_{n}"),
            url: format!("https://checkout.example/pay/cs_test_{n}"),
        })
    }
}
