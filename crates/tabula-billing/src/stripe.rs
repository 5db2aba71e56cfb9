//! # Stripe Gateway
//!
//! [`PaymentGateway`] over Stripe's REST API (no SDK dependency).
//!
//! ## Request Shape
//! ```text
//! POST {api_base}/v1/checkout/sessions
//! Authorization: Basic base64(secret_key:)
//! Content-Type: application/x-www-form-urlencoded
//!
//! mode=payment
//! success_url=...  cancel_url=...
//! line_items[0][quantity]=2
//! line_items[0][price_data][currency]=thb
//! line_items[0][price_data][unit_amount]=10000
//! line_items[0][price_data][product_data][name]=Garden cleanup
//! metadata[documentId]=INV2026A3F0600042
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::gateway::{CheckoutSession, CheckoutSessionRequest, GatewayError, PaymentGateway};

/// Production API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

/// Request timeout when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

// =============================================================================
// Configuration
// =============================================================================

/// Stripe client settings.
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Secret API key (`sk_live_...` / `sk_test_...`).
    pub secret_key: String,
    /// Base URL, overridable for test doubles.
    pub api_base: String,
    pub timeout: Duration,
}

impl StripeConfig {
    pub fn new(secret_key: impl Into<String>) -> Self {
        StripeConfig {
            secret_key: secret_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// =============================================================================
// Gateway
// =============================================================================

/// Stripe Checkout client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct StripeGateway {
    http: Client,
    config: StripeConfig,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl StripeGateway {
    /// Builds the HTTP client with the configured timeout.
    pub fn new(config: StripeConfig) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(StripeGateway { http, config })
    }

    fn sessions_url(&self) -> String {
        format!(
            "{}/v1/checkout/sessions",
            self.config.api_base.trim_end_matches('/')
        )
    }
}

/// Flattens a session request into Stripe's bracketed form encoding.
pub fn encode_session_form(request: &CheckoutSessionRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), request.mode.as_str().to_string()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
    ];

    for (i, item) in request.line_items.iter().enumerate() {
        let prefix = format!("line_items[{i}]");
        form.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
        form.push((
            format!("{prefix}[price_data][currency]"),
            request.currency.clone(),
        ));
        form.push((
            format!("{prefix}[price_data][unit_amount]"),
            item.unit_amount.to_string(),
        ));
        form.push((
            format!("{prefix}[price_data][product_data][name]"),
            item.name.clone(),
        ));
    }

    for (key, value) in &request.metadata {
        form.push((format!("metadata[{key}]"), value.clone()));
    }

    form
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    fn name(&self) -> &'static str {
        "stripe"
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let form = encode_session_form(request);
        debug!(line_items = request.line_items.len(), "Creating Stripe checkout session");

        let response = self
            .http
            .post(self.sessions_url())
            .basic_auth(&self.config.secret_key, None::<&str>)
            .form(&form)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|envelope| envelope.error.message)
                .unwrap_or_else(|| body.clone());
            warn!(status = status.as_u16(), %message, "Stripe rejected checkout session");
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let session: SessionResponse = serde_json::from_str(&body)
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        let url = session.url.ok_or_else(|| {
            GatewayError::InvalidResponse(format!("session {} has no url", session.id))
        })?;

        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
