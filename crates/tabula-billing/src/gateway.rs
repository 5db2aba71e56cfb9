//! # Payment Gateway
//!
//! The seam between checkout orchestration and the payment processor.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use tabula_core::CheckoutLineItem;

/// Metadata key binding a checkout session to its document.
pub const DOCUMENT_ID_METADATA_KEY: &str = "documentId";

/// Hosted checkout mode. Only one-off payments are used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutMode {
    Payment,
}

impl CheckoutMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CheckoutMode::Payment => "payment",
        }
    }
}

/// Everything needed to open a hosted checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSessionRequest {
    pub mode: CheckoutMode,
    /// ISO currency code, lowercase.
    pub currency: String,
    pub line_items: Vec<CheckoutLineItem>,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: BTreeMap<String, String>,
}

/// A session opened by the processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// Hosted page the customer is redirected to.
    pub url: String,
}

/// Payment processor failures.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request never got a response (DNS, TLS, timeout, ...).
    #[error("payment processor unreachable: {0}")]
    Transport(String),

    /// The processor answered with an error status.
    #[error("payment processor rejected the request ({status}): {message}")]
    Api { status: u16, message: String },

    /// The processor answered 2xx with a body we could not use.
    #[error("unexpected payment processor response: {0}")]
    InvalidResponse(String),
}

/// Opens hosted checkout sessions.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Short processor name for logs.
    fn name(&self) -> &'static str;

    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError>;
}
