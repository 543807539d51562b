/// HTTP API tests
///
/// Drive the full router against the in-memory blob backend.
use agent_store::{
    blob_store::{memory::MemoryBlobBackend, BlobBackend, BlobStore},
    config::{BlobstoreConfig, LogFormat, LoggingConfig, ServerConfig, ServiceConfig, StorageConfig},
    context::AppContext,
    records::IdGenerator,
    server::build_router,
};
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_config(storage: StorageConfig) -> ServerConfig {
    ServerConfig {
        service: ServiceConfig {
            hostname: "127.0.0.1".to_string(),
            port: 8080,
        },
        storage,
        logging: LoggingConfig {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        },
    }
}

fn storage() -> StorageConfig {
    StorageConfig {
        bucket_name: "records".to_string(),
        agents_path: Some("agents/".to_string()),
        transcriptions_directory: Some("transcripts/".to_string()),
        object_name: Some("document.json".to_string()),
        blobstore: BlobstoreConfig::Memory,
    }
}

fn app_with(storage: StorageConfig) -> (Router, Arc<MemoryBlobBackend>) {
    let backend = Arc::new(MemoryBlobBackend::new());
    let store = BlobStore::new("records", backend.clone());
    let ids = IdGenerator::with_clock(|| 1_700_000_000_000);
    let ctx = AppContext::with_store(test_config(storage), store, ids);
    (build_router(ctx), backend)
}

fn app() -> (Router, Arc<MemoryBlobBackend>) {
    app_with(storage())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&value).unwrap())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, body).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_agent_lifecycle() {
    let (app, _backend) = app();

    let (status, created) = send_json(
        &app,
        Method::POST,
        "/agents",
        Some(json!({"name": "Bot", "systemInstruction": "be nice"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created, json!({"id": "1700000000000", "name": "Bot"}));

    let (status, agent) = send_json(&app, Method::GET, "/agents/1700000000000", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        agent,
        json!({"name": "Bot", "details": {"systemInstruction": "be nice"}})
    );

    let (status, deleted) = send_json(&app, Method::DELETE, "/agents/1700000000000", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, json!({"id": "1700000000000"}));

    let (status, missing) = send_json(&app, Method::GET, "/agents/1700000000000", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing, json!({"id": "1700000000000"}));
}

#[tokio::test]
async fn test_create_agent_requires_name() {
    let (app, backend) = app();

    let (status, body) = send(&app, Method::POST, "/agents", Some(json!({"systemInstruction": "x"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, b"name is required".to_vec());

    let (status, _) = send(&app, Method::POST, "/agents", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(backend.write_count(), 0);
}

#[tokio::test]
async fn test_create_agent_defaults_instruction() {
    let (app, backend) = app();

    send_json(&app, Method::POST, "/agents", Some(json!({"name": "Bot"}))).await;

    let stored: Value =
        serde_json::from_slice(&backend.get("agents/1700000000000.json").await.unwrap()).unwrap();
    assert_eq!(stored, json!({"systemInstruction": ""}));
}

#[tokio::test]
async fn test_agents_created_in_same_millisecond_get_distinct_ids() {
    let (app, _backend) = app();

    let (_, first) = send_json(&app, Method::POST, "/agents", Some(json!({"name": "A"}))).await;
    let (_, second) = send_json(&app, Method::POST, "/agents", Some(json!({"name": "B"}))).await;
    assert_eq!(first["id"], "1700000000000");
    assert_eq!(second["id"], "1700000000001");
}

#[tokio::test]
async fn test_list_agents() {
    let (app, _backend) = app();
    send_json(&app, Method::POST, "/agents", Some(json!({"name": "A"}))).await;
    send_json(&app, Method::POST, "/agents", Some(json!({"name": "B"}))).await;

    let (status, listed) = send_json(&app, Method::GET, "/agents", None).await;
    assert_eq!(status, StatusCode::OK);

    let listed = listed.as_array().unwrap().clone();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["id"], "1700000000000");
    assert_eq!(listed[0]["name"], "A");
    assert!(listed[0]["created"].is_string());
    assert!(listed[0]["updated"].is_string());
    assert_eq!(listed[1]["name"], "B");
}

#[tokio::test]
async fn test_update_agent_replaces_details() {
    let (app, _backend) = app();
    send_json(&app, Method::POST, "/agents", Some(json!({"name": "Bot"}))).await;

    let (status, updated) = send_json(
        &app,
        Method::PUT,
        "/agents/1700000000000",
        Some(json!({"name": "Renamed", "details": {"systemInstruction": "be brief", "voice": "alloy"}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated, json!({"id": "1700000000000"}));

    let (_, agent) = send_json(&app, Method::GET, "/agents/1700000000000", None).await;
    assert_eq!(
        agent,
        json!({"name": "Renamed", "details": {"systemInstruction": "be brief", "voice": "alloy"}})
    );
}

#[tokio::test]
async fn test_update_unknown_agent_creates_it() {
    let (app, _backend) = app();

    let (status, _) = send_json(
        &app,
        Method::PUT,
        "/agents/42",
        Some(json!({"name": "New", "details": {"systemInstruction": ""}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, agent) = send_json(&app, Method::GET, "/agents/42", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(agent["name"], "New");
}

#[tokio::test]
async fn test_delete_missing_agent_is_not_found() {
    let (app, _backend) = app();

    let (status, body) = send_json(&app, Method::DELETE, "/agents/123", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"id": "123"}));
}

#[tokio::test]
async fn test_agent_without_name_is_not_found() {
    let (app, backend) = app();
    backend
        .put("agents/5.json", br#"{"systemInstruction":"x"}"#.to_vec(), None)
        .await
        .unwrap();

    let (status, body) = send_json(&app, Method::GET, "/agents/5", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"id": "5"}));
}

#[tokio::test]
async fn test_null_instruction_round_trips() {
    let (app, _backend) = app();
    let details = json!({"systemInstruction": null, "x": null});

    let (status, _) = send_json(
        &app,
        Method::PUT,
        "/agents/9",
        Some(json!({"name": "B", "details": details.clone()})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, agent) = send_json(&app, Method::GET, "/agents/9", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(agent, json!({"name": "B", "details": details}));
}

#[tokio::test]
async fn test_missing_agents_path_is_server_error() {
    let mut storage = storage();
    storage.agents_path = None;
    let (app, backend) = app_with(storage);

    let (status, _) = send(&app, Method::POST, "/agents", Some(json!({"name": "Bot"}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = send(&app, Method::GET, "/agents/1", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(backend.write_count(), 0);
}

#[tokio::test]
async fn test_transcription_filters_system_messages() {
    let (app, backend) = app();
    let stored = json!([{"role": "system", "content": "x"}, {"role": "user", "content": "hi"}]);
    backend
        .put("transcripts/CA123.json", serde_json::to_vec(&stored).unwrap(), None)
        .await
        .unwrap();

    let (status, messages) = send_json(&app, Method::GET, "/transcriptions/CA123", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(messages, json!([{"role": "user", "content": "hi"}]));
}

#[tokio::test]
async fn test_transcription_failures_return_empty_list() {
    let (app, backend) = app();
    backend
        .put("transcripts/broken.json", b"not json".to_vec(), None)
        .await
        .unwrap();

    for uri in ["/transcriptions/missing", "/transcriptions/broken"] {
        let (status, messages) = send_json(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(messages, json!([]));
    }

    let mut storage = storage();
    storage.transcriptions_directory = None;
    let (app, _backend) = app_with(storage);
    let (status, messages) = send_json(&app, Method::GET, "/transcriptions/CA1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(messages, json!([]));
}

#[tokio::test]
async fn test_transcription_requires_call_sid() {
    let (app, _backend) = app();

    for uri in ["/transcriptions", "/transcriptions/"] {
        let (status, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, b"callSid is required".to_vec());
    }
}

#[tokio::test]
async fn test_save_document() {
    let (app, backend) = app();

    let (status, body) = send_json(&app, Method::PUT, "/", Some(json!({"contents": {"hello": "world"}}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"fileName": "document.json"}));
    assert_eq!(
        backend.get("document.json").await.unwrap(),
        br#"{"hello":"world"}"#.to_vec()
    );

    let (status, body) = send(&app, Method::PUT, "/", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, b"contents is required".to_vec());
}

#[tokio::test]
async fn test_health_and_request_id() {
    let (app, _backend) = app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "abc-123");
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let (app, _backend) = app();

    let (status, body) = send_json(&app, Method::GET, "/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _backend) = app();
    send(&app, Method::GET, "/agents", None).await;

    let (status, body) = send(&app, Method::GET, "/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("blob_store_operations_total"));
}
