//! Shared helpers for agent-shim-proxy integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use agent_shim_core::{CompletionService, ShimSettings};
use agent_shim_proxy::{ProxyState, create_router};
use agent_shim_runtime::ProcessCommandRunner;

/// Model name configured for every test router.
pub const TEST_MODEL: &str = "test-agent";

/// Router backed by real processes running `template`.
pub fn router_for(template: &str) -> Router {
    router_with_timeout(template, None)
}

/// Router backed by real processes with a deadline per run.
pub fn router_with_timeout(template: &str, timeout: Option<Duration>) -> Router {
    let mut settings = ShimSettings::with_template(template);
    settings.model_name = TEST_MODEL.to_string();
    settings.timeout = timeout;

    let runner = Arc::new(ProcessCommandRunner::from_settings(&settings));
    let service = Arc::new(CompletionService::from_settings(&settings, runner));
    create_router(ProxyState::new(service, settings.model_name))
}

/// POST a raw body to `/v1/chat/completions`.
pub async fn post_raw(app: Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/chat/completions")
                .header("content-type", "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("non-JSON body ({e}): {}", String::from_utf8_lossy(&bytes)));
    (status, json)
}

/// POST a chat request built from `messages`.
pub async fn post_chat(app: Router, messages: Value) -> (StatusCode, Value) {
    let body = serde_json::json!({ "model": TEST_MODEL, "messages": messages });
    post_raw(app, body.to_string()).await
}

/// Content of the first choice.
pub fn content_of(json: &Value) -> &str {
    json["choices"][0]["message"]["content"]
        .as_str()
        .unwrap_or_else(|| panic!("no content in {json}"))
}
