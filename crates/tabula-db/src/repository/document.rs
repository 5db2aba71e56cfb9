//! # Document Repository
//!
//! Database operations for quotations, invoices and receipts.
//!
//! ## Invoice Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Invoice Lifecycle                                 │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── insert() → status: unpaid                                      │
//! │                                                                         │
//! │  2. CHECKOUT (any number of times while unpaid)                        │
//! │     └── attach_checkout_session() → checkout_session_id = cs_...      │
//! │         WHERE kind = 'invoice' AND status <> 'paid'                    │
//! │                                                                         │
//! │  3. WEBHOOK                                                            │
//! │     └── mark_paid() → status: paid, payment_reference_id = pi_...     │
//! │         WHERE kind = 'invoice'  (re-delivery rewrites the same values) │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows are read through [`DocumentRow`] so v1 rows load the same way as
//! rows written today.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use tabula_core::FinancialDocument;

use crate::error::{DbError, DbResult};
use crate::schema::{format_timestamp, DocumentRow, DOCUMENT_COLUMNS};

/// Repository for document database operations.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    pool: SqlitePool,
}

impl DocumentRepository {
    /// Creates a new DocumentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DocumentRepository { pool }
    }

    /// Inserts a new document.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - a document with this ID already exists
    pub async fn insert(&self, doc: &FinancialDocument) -> DbResult<()> {
        debug!(id = %doc.id, kind = %doc.kind, "Inserting document");

        let row = DocumentRow::from_document(doc)?;

        sqlx::query(
            r#"
            INSERT INTO documents (
                id, kind, property, date, due_date, valid_until, payment_method, notes,
                items, vat_rate, discount, subtotal, vat, total, status, created_at,
                customer_name, include_vat, discount_type, after_discount,
                checkout_session_id, payment_reference_id, enable_installments,
                installments, schema_version, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8,
                ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                ?17, ?18, ?19, ?20,
                ?21, ?22, ?23,
                ?24, ?25, ?26
            )
            "#,
        )
        .bind(&row.id)
        .bind(&row.kind)
        .bind(&row.property)
        .bind(&row.date)
        .bind(&row.due_date)
        .bind(&row.valid_until)
        .bind(&row.payment_method)
        .bind(&row.notes)
        .bind(&row.items)
        .bind(&row.vat_rate)
        .bind(&row.discount)
        .bind(&row.subtotal)
        .bind(&row.vat)
        .bind(&row.total)
        .bind(&row.status)
        .bind(&row.created_at)
        .bind(&row.customer_name)
        .bind(row.include_vat)
        .bind(&row.discount_type)
        .bind(&row.after_discount)
        .bind(&row.checkout_session_id)
        .bind(&row.payment_reference_id)
        .bind(row.enable_installments)
        .bind(&row.installments)
        .bind(row.schema_version)
        .bind(&row.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: doc.id.clone(),
            },
            other => other,
        })?;

        Ok(())
    }

    /// Gets a document by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<FinancialDocument>> {
        let sql = format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ?1");

        let row: Option<DocumentRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(DocumentRow::into_document).transpose()
    }

    /// Lists the most recently created documents, newest first.
    ///
    /// A row that fails to load is logged and skipped so one corrupt
    /// document does not hide the rest.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<FinancialDocument>> {
        let sql = format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents \
             ORDER BY julianday(created_at) DESC, rowid DESC LIMIT ?1"
        );

        let rows: Vec<DocumentRow> = sqlx::query_as(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        let mut documents = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.id.clone();
            match row.into_document() {
                Ok(doc) => documents.push(doc),
                Err(e) => warn!(document_id = %id, error = %e, "Skipping unreadable document"),
            }
        }

        Ok(documents)
    }

    /// Records the checkout session opened for an unpaid invoice.
    ///
    /// ## Returns
    /// * `true` - the session ID was stored
    /// * `false` - no unpaid invoice with this ID (missing, other kind, or
    ///   already paid)
    pub async fn attach_checkout_session(&self, id: &str, session_id: &str) -> DbResult<bool> {
        debug!(document_id = %id, session_id = %session_id, "Attaching checkout session");

        let result = sqlx::query(
            r#"
            UPDATE documents
            SET checkout_session_id = ?2,
                updated_at = ?3
            WHERE id = ?1
              AND kind = 'invoice'
              AND COALESCE(status, 'unpaid') <> 'paid'
            "#,
        )
        .bind(id)
        .bind(session_id)
        .bind(format_timestamp(Utc::now()))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Marks an invoice as paid and records the payment reference.
    ///
    /// Not gated on the current status: applying the same completion twice
    /// leaves the row exactly as the first application did.
    ///
    /// ## Returns
    /// * `true` - an invoice with this ID was updated
    /// * `false` - no invoice with this ID
    pub async fn mark_paid(&self, id: &str, payment_reference: &str) -> DbResult<bool> {
        debug!(document_id = %id, payment_reference = %payment_reference, "Marking invoice paid");

        let result = sqlx::query(
            r#"
            UPDATE documents
            SET status = 'paid',
                payment_reference_id = ?2,
                updated_at = ?3
            WHERE id = ?1
              AND kind = 'invoice'
            "#,
        )
        .bind(id)
        .bind(payment_reference)
        .bind(format_timestamp(Utc::now()))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
