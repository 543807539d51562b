/// Call transcription endpoints
use crate::{context::AppContext, error::StoreError, records::Message};
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tracing::{error, info};

/// Build transcription routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/transcriptions", get(missing_call_sid))
        .route("/transcriptions/", get(missing_call_sid))
        .route("/transcriptions/:call_sid", get(get_transcription))
}

async fn missing_call_sid() -> Response {
    StoreError::Validation("callSid is required".to_string()).into_response()
}

/// Get a call transcription without system messages
///
/// Retrieval failures of any kind are answered with an empty list.
async fn get_transcription(State(ctx): State<AppContext>, Path(call_sid): Path<String>) -> Response {
    if call_sid.trim().is_empty() {
        return missing_call_sid().await;
    }

    info!(call_sid = %call_sid, "fetching transcription");

    match ctx.records.get_transcription(&call_sid).await {
        Ok(messages) => Json(messages).into_response(),
        Err(e) => {
            error!("Failed to get transcription {}: {}", call_sid, e);
            Json(Vec::<Message>::new()).into_response()
        }
    }
}
