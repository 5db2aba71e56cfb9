//! Payment processor webhook endpoint.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;
use tabula_billing::signature::SIGNATURE_HEADER;
use tabula_billing::WebhookOutcome;
use tracing::debug;

use crate::error::ApiResult;
use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// `POST /api/webhooks/stripe`
///
/// The body is taken raw: the signature covers the exact bytes sent.
pub async fn stripe_webhook(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WebhookAck>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    match state.webhooks.handle(&body, signature).await? {
        WebhookOutcome::Applied { document_id, matched } => {
            debug!(document_id = %document_id, matched, "Webhook applied");
        }
        WebhookOutcome::Ignored { reason } => {
            debug!(reason = ?reason, "Webhook ignored");
        }
    }

    Ok(Json(WebhookAck { received: true }))
}
