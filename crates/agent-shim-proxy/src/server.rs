//! Axum HTTP server for the OpenAI-compatible facade.
//!
//! This module provides `create_router()` for tests and embedding, and
//! `serve()` which runs the router on a pre-bound `TcpListener` until the
//! cancellation token fires.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use agent_shim_core::{CompletionService, ShimError};

use crate::models::{ChatCompletionRequest, ChatCompletionResponse, ErrorResponse, ModelsResponse};

/// Shared application state for the proxy server.
#[derive(Clone)]
pub struct ProxyState {
    /// Translate → invoke pipeline.
    service: Arc<CompletionService>,
    /// Model id advertised by `/v1/models` and used when a request omits `model`.
    model_name: Arc<str>,
    /// Unix timestamp reported as the model's `created`.
    started_at: i64,
}

impl ProxyState {
    /// Create the state shared by all handlers.
    pub fn new(service: Arc<CompletionService>, model_name: impl Into<Arc<str>>) -> Self {
        Self {
            service,
            model_name: model_name.into(),
            started_at: chrono::Utc::now().timestamp(),
        }
    }
}

/// Build the router with every route of the facade.
pub fn create_router(state: ProxyState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/models", get(list_models))
        .route("/v1/chat/completions", post(chat_completions))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the server with a pre-bound listener.
///
/// # Arguments
///
/// * `listener` - Pre-bound TCP listener
/// * `state` - Shared handler state
/// * `cancel` - Cancellation token for graceful shutdown
///
/// # Returns
///
/// Returns `Ok(())` on clean shutdown, or an error if the server fails.
pub async fn serve(
    listener: TcpListener,
    state: ProxyState,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!("agent-shim server starting on {addr}");

    let app = create_router(state);

    info!("Configure OpenAI clients to use: http://{addr}/v1");

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await?;

    info!("agent-shim server shut down");
    Ok(())
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok"
    }))
}

/// List the single configured backend in OpenAI format.
async fn list_models(State(state): State<ProxyState>) -> impl IntoResponse {
    debug!("GET /v1/models");
    Json(ModelsResponse::single(
        state.model_name.as_ref(),
        state.started_at,
    ))
}

/// Handle chat completions by running the backend command.
async fn chat_completions(State(state): State<ProxyState>, body: Bytes) -> Response {
    debug!("POST /v1/chat/completions");

    // Parse by hand so malformed bodies still get an OpenAI-shaped error.
    let request: ChatCompletionRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            error!("Failed to parse request: {e}");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::invalid_request(e)),
            )
                .into_response();
        }
    };

    let model_name = request
        .model
        .clone()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| state.model_name.to_string());

    info!(
        model = %model_name,
        messages = request.messages.len(),
        streaming = %request.stream,
        "Processing chat completion request"
    );

    if request.stream {
        warn!("Streaming was requested but is not supported, answering with a single response");
    }

    match state.service.complete(&request.domain_messages()).await {
        Ok(output) => {
            info!(
                model = %model_name,
                elapsed = ?output.elapsed,
                "Chat completion finished"
            );
            Json(ChatCompletionResponse::from_output(model_name, &output)).into_response()
        }
        Err(e) => handle_shim_error(&e),
    }
}

/// Convert a pipeline error to an HTTP response.
///
/// Every failure class is a server-side problem from the client's point of
/// view, so all map to 500.
fn handle_shim_error(err: &ShimError) -> Response {
    let status = match err {
        ShimError::Configuration(_)
        | ShimError::Invocation { .. }
        | ShimError::CommandFailed { .. }
        | ShimError::TempFile(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error!(error_type = err.error_type(), "Chat completion failed: {err}");
    (status, Json(ErrorResponse::from(err))).into_response()
}
