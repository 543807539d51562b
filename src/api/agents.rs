/// Agent configuration endpoints
use crate::{
    context::AppContext,
    error::{StoreError, StoreResult},
    records::{AgentDetails, Record, RecordKind, RecordPayload, RecordSummary},
};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{error, info};

/// Build agent routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/agents", get(list_agents).post(create_agent))
        .route(
            "/agents/:id",
            get(get_agent).put(update_agent).delete(delete_agent),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAgentRequest {
    pub name: Option<String>,
    pub system_instruction: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateAgentResponse {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateAgentRequest {
    pub name: Option<String>,
    pub details: Option<AgentDetails>,
}

#[derive(Debug, Serialize)]
pub struct AgentResponse {
    pub name: String,
    pub details: AgentDetails,
}

#[derive(Debug, Serialize)]
pub struct AgentIdResponse {
    pub id: String,
}

/// Parse a JSON body; an empty body reads as the default value
pub(crate) fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> StoreResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    serde_json::from_slice(body)
        .map_err(|e| StoreError::Validation(format!("invalid request body: {}", e)))
}

/// 404 carrying the requested id
fn agent_not_found(id: String) -> Response {
    (StatusCode::NOT_FOUND, Json(AgentIdResponse { id })).into_response()
}

fn into_agent_response(record: Record) -> StoreResult<AgentResponse> {
    let name = record
        .name
        .ok_or_else(|| StoreError::NotFound(format!("agent {} has no name", record.id)))?;

    match record.payload {
        RecordPayload::Agent(details) => Ok(AgentResponse { name, details }),
        RecordPayload::Transcription(_) => Err(StoreError::Internal(format!(
            "record {} is not an agent",
            record.id
        ))),
    }
}

/// Create an agent with a freshly generated id
async fn create_agent(
    State(ctx): State<AppContext>,
    body: Bytes,
) -> StoreResult<Json<CreateAgentResponse>> {
    let request: CreateAgentRequest = parse_body(&body)?;
    let name = request
        .name
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| StoreError::Validation("name is required".to_string()))?;

    let id = ctx.ids.next_id();
    info!(id = %id, name = %name, "creating agent");

    let details = AgentDetails::with_instruction(request.system_instruction.unwrap_or_default());
    ctx.records
        .create(RecordKind::Agent, &id, Some(&name), RecordPayload::Agent(details))
        .await?;

    Ok(Json(CreateAgentResponse { id, name }))
}

/// List agents with their names and timestamps
async fn list_agents(State(ctx): State<AppContext>) -> StoreResult<Json<Vec<RecordSummary>>> {
    let agents = ctx.records.list(RecordKind::Agent).await.map_err(|e| {
        error!("Failed to list agents: {}", e);
        e
    })?;

    Ok(Json(agents))
}

/// Get one agent; any failure other than missing configuration is a 404
async fn get_agent(State(ctx): State<AppContext>, Path(id): Path<String>) -> Response {
    let result = ctx
        .records
        .get(RecordKind::Agent, &id)
        .await
        .and_then(into_agent_response);

    match result {
        Ok(agent) => Json(agent).into_response(),
        Err(e) if e.is_configuration() => {
            error!("Failed to get agent {}: {}", id, e);
            e.into_response()
        }
        Err(e) => {
            error!("Failed to get agent {}: {}", id, e);
            agent_not_found(id)
        }
    }
}

/// Replace an agent's name and details
async fn update_agent(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    body: Bytes,
) -> StoreResult<Json<AgentIdResponse>> {
    let request: UpdateAgentRequest = parse_body(&body)?;
    let details = request.details.unwrap_or_default();

    ctx.records
        .update(
            RecordKind::Agent,
            &id,
            request.name.as_deref(),
            RecordPayload::Agent(details),
        )
        .await
        .map_err(|e| {
            error!("Failed to update agent {}: {}", id, e);
            e
        })?;

    Ok(Json(AgentIdResponse { id }))
}

/// Delete an agent; any failure other than missing configuration is a 404
async fn delete_agent(State(ctx): State<AppContext>, Path(id): Path<String>) -> Response {
    match ctx.records.delete(RecordKind::Agent, &id).await {
        Ok(()) => Json(AgentIdResponse { id }).into_response(),
        Err(e) if e.is_configuration() => {
            error!("Failed to delete agent {}: {}", id, e);
            e.into_response()
        }
        Err(e) => {
            error!("Failed to delete agent {}: {}", id, e);
            agent_not_found(id)
        }
    }
}
