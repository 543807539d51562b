/// Single-document upload endpoint
use crate::{
    api::agents::parse_body,
    context::AppContext,
    error::{StoreError, StoreResult},
};
use axum::{body::Bytes, extract::State, routing::put, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Build document routes
pub fn routes() -> Router<AppContext> {
    Router::new().route("/", put(save_document))
}

#[derive(Debug, Default, Deserialize)]
pub struct SaveDocumentRequest {
    pub contents: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDocumentResponse {
    pub file_name: String,
}

/// Write the request contents to the configured object
async fn save_document(
    State(ctx): State<AppContext>,
    body: Bytes,
) -> StoreResult<Json<SaveDocumentResponse>> {
    let request: SaveDocumentRequest = parse_body(&body)?;
    let contents = request
        .contents
        .filter(|contents| !contents.is_null())
        .ok_or_else(|| StoreError::Validation("contents is required".to_string()))?;

    let file_name = ctx.records.save_document(&contents).await.map_err(|e| {
        tracing::error!("Failed to save document: {}", e);
        e
    })?;

    Ok(Json(SaveDocumentResponse { file_name }))
}
