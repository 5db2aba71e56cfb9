//! Hosted checkout for unpaid invoices.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::base_url::resolve_base_url;
use crate::error::ApiResult;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// Missing and empty are both rejected by the orchestrator.
    #[serde(default)]
    pub document_id: String,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub url: String,
}

/// `POST /api/checkout` `{documentId}` → `{url}`
pub async fn create_checkout(
    State(state): State<SharedState>,
    headers: HeaderMap,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> ApiResult<Json<CheckoutResponse>> {
    let Json(request) = payload?;
    let base_url = resolve_base_url(state.app_url.as_deref(), &headers);

    let session = state
        .checkout
        .create_checkout(request.document_id.trim(), &base_url)
        .await?;

    Ok(Json(CheckoutResponse { url: session.url }))
}
