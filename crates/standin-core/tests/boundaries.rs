//! Integration tests for composed boundary scopes.
//!
//! Covers the end-to-end flows:
//! - All four substitutions active inside one composed acquisition
//! - Full restoration after a panicking scope body
//! - Synthetic requests driven through a real router, session attached
//! - Outbound calls resolved by the transport double, never the network

use std::collections::HashMap;
use std::env;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use axum::extract::{Extension, Form, Query};
use axum::http::{Method, Request, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use serde_json::{json, Value};
use tower::ServiceExt;

use standin_core::{
    current_session, BoundaryMock, BoundarySpec, HttpTransport, MockFile, MockFileSystem,
    MockResponse, RequestBuilder, SessionState, TransportError,
};

/// The kind of production code the doubles stand in for: reads its base URL
/// from the environment and talks through the transport seam.
async fn fetch_completion(
    transport: &dyn HttpTransport,
    prompt: &str,
) -> Result<String, TransportError> {
    let base_url = env::var("STANDIN_IT_BASE_URL")
        .map_err(|err| TransportError::Transport(err.to_string()))?;
    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("{base_url}/v1/chat"))
        .body(Bytes::from(prompt.to_string()))
        .expect("static request parts");

    let response = transport.send(request).await?;
    Ok(String::from_utf8_lossy(response.body()).into_owned())
}

async fn profile_handler(
    Extension(session): Extension<SessionState>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    Json(json!({
        "user": session.get("user_id"),
        "verbose": query.get("verbose"),
        "prompt": body["prompt"],
    }))
}

async fn login_handler(Form(fields): Form<HashMap<String, String>>) -> Json<Value> {
    Json(json!({ "user": fields.get("user") }))
}

async fn read_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_composed_scope_serves_all_four_boundaries() -> anyhow::Result<()> {
    let spec = BoundarySpec::new()
        .route(
            Method::POST,
            "https://llm.test/v1/chat",
            MockResponse::text("mocked completion"),
        )
        .filesystem(
            MockFileSystem::new()
                .with_dir("workspace")
                .with_file(MockFile::json("workspace/settings.json", json!({"retries": 2}))),
        )
        .env("STANDIN_IT_BASE_URL", "https://llm.test")
        .session(SessionState::new().with("user_id", "u-7"));

    let scope = BoundaryMock::acquire(spec)?;

    // Outbound HTTP resolves through the double, steered by the env scope.
    let completion = fetch_completion(&scope.http(), "hi").await?;
    assert_eq!(completion, "mocked completion");
    assert_eq!(scope.http().calls_to("https://llm.test/v1/chat").len(), 1);

    // Filesystem layout is materialized under the ephemeral root.
    let raw = std::fs::read_to_string(scope.fs_path("workspace/settings.json"))?;
    let settings: Value = serde_json::from_str(&raw)?;
    assert_eq!(settings, json!({"retries": 2}));

    // The session accessor observes the seeded state.
    assert_eq!(
        current_session().unwrap().get("user_id"),
        Some(&json!("u-7"))
    );

    Ok(())
}

#[tokio::test]
async fn test_unregistered_url_never_succeeds() {
    let scope = BoundaryMock::acquire(
        BoundarySpec::new().route_any("https://llm.test/known", MockResponse::ok()),
    )
    .unwrap();

    let request = Request::builder()
        .method(Method::GET)
        .uri("https://llm.test/unknown")
        .body(Bytes::new())
        .unwrap();

    let err = scope.http().send(request).await.unwrap_err();
    assert!(matches!(err, TransportError::Unmatched { .. }));
}

#[test]
fn test_teardown_runs_after_panicking_body() {
    env::remove_var("STANDIN_IT_PANIC_KEY");

    let root = Arc::new(Mutex::new(std::path::PathBuf::new()));
    let captured = root.clone();

    let result = catch_unwind(AssertUnwindSafe(move || {
        let scope = BoundaryMock::acquire(
            BoundarySpec::new()
                .env("STANDIN_IT_PANIC_KEY", "set")
                .filesystem(MockFileSystem::new().with_file(MockFile::text("tmp.txt", "x")))
                .session(SessionState::new().with("user_id", "doomed")),
        )
        .unwrap();
        *captured.lock().unwrap() = scope.fs_root().to_path_buf();

        assert_eq!(env::var("STANDIN_IT_PANIC_KEY").unwrap(), "set");
        panic!("innermost scope body failed");
    }));
    assert!(result.is_err());

    // Every boundary is back to its pre-scope state.
    assert!(current_session().is_none());
    assert!(env::var("STANDIN_IT_PANIC_KEY").is_err());
    assert!(!root.lock().unwrap().exists());
}

#[tokio::test]
async fn test_synthetic_json_request_drives_router() {
    let app = Router::new().route("/profile", post(profile_handler));

    let request = RequestBuilder::post("/profile")
        .query("verbose", "1")
        .json(json!({"prompt": "hello"}))
        .session(SessionState::new().with("user_id", "u-9"))
        .build()
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_body(response).await;
    assert_eq!(body, json!({"user": "u-9", "verbose": "1", "prompt": "hello"}));
}

#[tokio::test]
async fn test_synthetic_form_request_drives_router() {
    let app = Router::new().route("/login", post(login_handler));

    let request = RequestBuilder::post("/login")
        .form([("user", "ada"), ("password", "s3cret!")])
        .build()
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_body(response).await;
    assert_eq!(body, json!({"user": "ada"}));
}

#[tokio::test]
async fn test_handler_reads_patched_session_accessor() {
    async fn whoami() -> Json<Value> {
        let user = current_session().and_then(|session| session.get("user_id").cloned());
        Json(json!({ "user": user }))
    }

    let scope = BoundaryMock::acquire(
        BoundarySpec::new().session(SessionState::new().with("user_id", "u-11")),
    )
    .unwrap();

    let app = Router::new().route("/whoami", get(whoami));
    let request = RequestBuilder::get("/whoami").build().unwrap();
    let response = app.oneshot(request).await.unwrap();

    let body = read_body(response).await;
    assert_eq!(body, json!({"user": "u-11"}));

    drop(scope);
    assert!(current_session().is_none());
}
