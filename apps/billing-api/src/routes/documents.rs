//! Document creation and lookup.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tabula_core::{FinancialDocument, NewDocument};

use crate::error::ApiResult;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<u32>,
}

/// `POST /api/documents`
pub async fn create_document(
    State(state): State<SharedState>,
    payload: Result<Json<NewDocument>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<FinancialDocument>)> {
    let Json(input) = payload?;
    let doc = state.documents.create(input).await?;
    Ok((StatusCode::CREATED, Json(doc)))
}

/// `GET /api/documents?limit=`, newest first.
pub async fn list_documents(
    State(state): State<SharedState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<Vec<FinancialDocument>>> {
    let Query(params) = params?;
    let docs = state.documents.list_recent(params.limit).await?;
    Ok(Json(docs))
}

/// `GET /api/documents/{id}`
pub async fn get_document(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<FinancialDocument>> {
    let doc = state.documents.get(&id).await?;
    Ok(Json(doc))
}
