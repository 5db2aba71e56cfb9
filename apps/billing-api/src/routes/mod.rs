//! HTTP route handlers.

pub mod checkout;
pub mod documents;
pub mod health;
pub mod webhook;

use crate::error::ApiError;

/// Fallback for a known path hit with the wrong method.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
