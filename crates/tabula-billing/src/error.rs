//! # Billing Errors
//!
//! The error taxonomy every service operation reports.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Variant         Meaning                               Mutation?        │
//! │  ──────────────  ────────────────────────────────────  ─────────        │
//! │  Validation      malformed input                       none             │
//! │  NotFound        unknown document                      none             │
//! │  Conflict        wrong kind / already paid / no items  none             │
//! │  Authentication  bad or missing webhook signature      none             │
//! │  Upstream        store or payment processor failed     as reported      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use tabula_core::{CoreError, ValidationError};

use crate::gateway::GatewayError;
use crate::signature::SignatureError;
use crate::store::StoreError;

/// Errors returned by document, checkout and webhook services.
#[derive(Debug, Error)]
pub enum BillingError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Authentication(String),

    #[error("{0}")]
    Upstream(String),
}

impl BillingError {
    /// Creates a NotFound error for a document ID.
    pub fn document_not_found(id: &str) -> Self {
        BillingError::NotFound(format!("document {id} not found"))
    }
}

impl From<ValidationError> for BillingError {
    fn from(err: ValidationError) -> Self {
        BillingError::Validation(err.to_string())
    }
}

impl From<CoreError> for BillingError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotPayable { .. } | CoreError::AlreadyPaid { .. } | CoreError::NoItems { .. } => {
                BillingError::Conflict(err.to_string())
            }
            CoreError::AmountOutOfRange { .. } => BillingError::Validation(err.to_string()),
            CoreError::Validation(inner) => inner.into(),
        }
    }
}

impl From<StoreError> for BillingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { .. } => BillingError::Conflict(err.to_string()),
            StoreError::Backend(_) => BillingError::Upstream(err.to_string()),
        }
    }
}

impl From<GatewayError> for BillingError {
    fn from(err: GatewayError) -> Self {
        BillingError::Upstream(err.to_string())
    }
}

impl From<SignatureError> for BillingError {
    fn from(err: SignatureError) -> Self {
        BillingError::Authentication(err.to_string())
    }
}

/// Result type for billing operations.
pub type BillingResult<T> = Result<T, BillingError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_map_to_conflict() {
        let err: BillingError = CoreError::AlreadyPaid {
            document_id: "INV2026A3F0600042".to_string(),
        }
        .into();
        assert!(matches!(err, BillingError::Conflict(ref m) if m.contains("already paid")));
    }

    #[test]
    fn test_validation_passes_through_core_error() {
        let err: BillingError = CoreError::Validation(ValidationError::Required {
            field: "customerName".to_string(),
        })
        .into();
        assert!(matches!(err, BillingError::Validation(ref m) if m == "customerName is required"));
    }

    #[test]
    fn test_store_and_signature_mapping() {
        let err: BillingError = StoreError::Backend("disk full".to_string()).into();
        assert!(matches!(err, BillingError::Upstream(_)));

        let err: BillingError = SignatureError::Mismatch.into();
        assert!(matches!(err, BillingError::Authentication(_)));
    }
}
