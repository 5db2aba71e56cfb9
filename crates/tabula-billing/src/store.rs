//! # Document Store
//!
//! The storage seam the services depend on, and its SQLite implementation.
//!
//! ```text
//! DocumentService ─┐
//! CheckoutOrchestrator ─┼──► Arc<dyn DocumentStore> ──► DocumentRepository (SQLite)
//! WebhookReconciler ─┘                            └──► in-memory fake (tests)
//! ```

use async_trait::async_trait;
use thiserror::Error;

use tabula_core::FinancialDocument;
use tabula_db::{DbError, DocumentRepository};

/// Failures a store can report.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A document with this ID already exists.
    #[error("document {id} already exists")]
    Conflict { id: String },

    /// The store could not complete the operation.
    #[error("document store failed: {0}")]
    Backend(String),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation { value, .. } => StoreError::Conflict { id: value },
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// Row-level access to financial documents, keyed by document ID.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts a new document. `Conflict` when the ID is taken.
    async fn insert(&self, doc: &FinancialDocument) -> Result<(), StoreError>;

    async fn get(&self, id: &str) -> Result<Option<FinancialDocument>, StoreError>;

    /// Newest first.
    async fn list_recent(&self, limit: u32) -> Result<Vec<FinancialDocument>, StoreError>;

    /// Stores the checkout session on an unpaid invoice. `false` when no
    /// unpaid invoice with this ID exists.
    async fn attach_checkout_session(&self, id: &str, session_id: &str) -> Result<bool, StoreError>;

    /// Sets an invoice to paid with the given payment reference, whatever its
    /// current status. `false` when no invoice with this ID exists.
    async fn mark_paid(&self, id: &str, payment_reference: &str) -> Result<bool, StoreError>;
}

#[async_trait]
impl DocumentStore for DocumentRepository {
    async fn insert(&self, doc: &FinancialDocument) -> Result<(), StoreError> {
        Ok(DocumentRepository::insert(self, doc).await?)
    }

    async fn get(&self, id: &str) -> Result<Option<FinancialDocument>, StoreError> {
        Ok(self.get_by_id(id).await?)
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<FinancialDocument>, StoreError> {
        Ok(DocumentRepository::list_recent(self, limit).await?)
    }

    async fn attach_checkout_session(&self, id: &str, session_id: &str) -> Result<bool, StoreError> {
        Ok(DocumentRepository::attach_checkout_session(self, id, session_id).await?)
    }

    async fn mark_paid(&self, id: &str, payment_reference: &str) -> Result<bool, StoreError> {
        Ok(DocumentRepository::mark_paid(self, id, payment_reference).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_document;
    use std::sync::Arc;
    use tabula_core::DocumentKind;
    use tabula_db::{Database, DbConfig};

    #[tokio::test]
    async fn test_repository_behind_trait_object() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store: Arc<dyn DocumentStore> = Arc::new(db.documents());

        let doc = sample_document("INV2026A3F0600042", DocumentKind::Invoice);
        store.insert(&doc).await.unwrap();

        let err = store.insert(&doc).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { ref id } if id == &doc.id));

        assert!(store.get(&doc.id).await.unwrap().is_some());
        assert_eq!(store.list_recent(5).await.unwrap().len(), 1);
        assert!(store.attach_checkout_session(&doc.id, "cs_1").await.unwrap());
        assert!(store.mark_paid(&doc.id, "pi_1").await.unwrap());
    }
}
