//! # Tabula Billing API
//!
//! HTTP surface for documents, hosted checkout and payment webhooks.
//!
//! ## Routes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /api/documents          create a quotation / invoice / receipt   │
//! │  GET  /api/documents?limit=   newest first                             │
//! │  GET  /api/documents/{id}     one document                             │
//! │  POST /api/checkout           {documentId} → {url}                     │
//! │  POST /api/webhooks/stripe    signed event → {received: true}          │
//! │  GET  /health                 {status, database}                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod base_url;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::extract::Request;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info_span;
use uuid::Uuid;

use crate::routes::{checkout, documents, health, method_not_allowed, webhook};
pub use crate::state::{AppState, SharedState};

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/api/documents",
            post(documents::create_document).get(documents::list_documents),
        )
        .route("/api/documents/{id}", get(documents::get_document))
        .route(
            "/api/checkout",
            post(checkout::create_checkout).fallback(method_not_allowed),
        )
        .route(
            "/api/webhooks/stripe",
            post(webhook::stripe_webhook).fallback(method_not_allowed),
        )
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            info_span!(
                "http_request",
                method = %request.method(),
                path = %request.uri().path(),
                request_id = %Uuid::new_v4(),
            )
        }))
        .with_state(Arc::new(state))
}

// =============================================================================
// Router Tests
// =============================================================================
