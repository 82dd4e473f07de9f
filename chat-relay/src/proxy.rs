// Copyright 2026 The Chat Relay Project
// SPDX-License-Identifier: Apache-2.0

// HTTP surface
//
// Responsibilities:
// - Chat endpoint: read, validate, open the upstream stream, emit fragments
// - CORS preflight and permissive CORS headers on every response
// - Heartbeat endpoint
// - Map every pre-stream failure to a JSON error response

use crate::message::{ChatRequest, ValidationError};
use crate::stream::FragmentStream;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CACHE_CONTROL, CONTENT_TYPE, TRANSFER_ENCODING,
};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::StreamExt;
use std::convert::Infallible;
use std::sync::Arc;

/// Largest request body the chat endpoint will read.
pub const MAX_REQUEST_BODY_BYTES: usize = 10 * 1024 * 1024;

pub const CORS_ALLOW_ORIGIN: &str = "*";
pub const CORS_ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";
pub const CORS_ALLOW_METHODS: &str = "POST, OPTIONS";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Every way a chat request can fail before the first fragment is sent.
///
/// The `Display` text carries internal detail for logs. Clients only ever
/// see the fixed public messages produced by `IntoResponse`.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("system_prompt and messages are required")]
    MissingFields,

    #[error("request body is not valid JSON: {0}")]
    MalformedJson(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("upstream returned status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("upstream request failed: {0}")]
    UpstreamFailure(String),

    #[error("upstream request timed out: {0}")]
    UpstreamTimeout(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ValidationError> for ProxyError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::MissingFields => ProxyError::MissingFields,
            ValidationError::MalformedJson(detail) => ProxyError::MalformedJson(detail),
            ValidationError::InvalidShape(detail) => ProxyError::InvalidRequest(detail),
        }
    }
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::MissingFields
            | ProxyError::MalformedJson(_)
            | ProxyError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::UpstreamStatus { .. } | ProxyError::UpstreamFailure(_) => {
                StatusCode::BAD_GATEWAY
            }
            ProxyError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = match &self {
            ProxyError::MissingFields => {
                serde_json::json!({"error": "system_prompt and messages are required"})
            }
            ProxyError::MalformedJson(_) => {
                serde_json::json!({"error": "request body is not valid JSON"})
            }
            ProxyError::InvalidRequest(detail) => {
                serde_json::json!({"error": format!("invalid request: {detail}")})
            }
            ProxyError::UpstreamStatus { status, .. } => {
                serde_json::json!({"error": "Claude API error", "status": status})
            }
            ProxyError::UpstreamFailure(_) => serde_json::json!({"error": "Claude API error"}),
            ProxyError::UpstreamTimeout(_) => serde_json::json!({"error": "Claude API timeout"}),
            ProxyError::Internal(detail) => {
                tracing::error!(error = %detail, "internal error handling chat request");
                serde_json::json!({"error": "Internal server error"})
            }
        };
        (self.status_code(), Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Trait: UpstreamClient (dependency injection point)
// ---------------------------------------------------------------------------

/// Opens one streaming completion for a validated chat request.
///
/// `Ok` means the provider accepted the call; every later failure ends the
/// returned stream early instead of surfacing as an error.
#[async_trait::async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn open_stream(&self, request: ChatRequest) -> Result<FragmentStream, ProxyError>;
}

// ---------------------------------------------------------------------------
// Shared application state
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<dyn UpstreamClient>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Heartbeat endpoint: GET /v1/heartbeat -> 200 OK
pub async fn heartbeat() -> StatusCode {
    StatusCode::OK
}

/// Preflight endpoint: OPTIONS /v1/chat -> 200 "ok"
pub async fn preflight() -> &'static str {
    "ok"
}

/// Chat endpoint: POST /v1/chat
///
/// Validation finishes before the upstream is contacted. Once the provider
/// accepts the call the response is committed as 200 and fragments are
/// written as they arrive.
pub async fn chat_handler(State(state): State<AppState>, request: Request) -> Response {
    match relay_chat(&state, request).await {
        Ok(fragments) => stream_response(fragments),
        Err(e) => e.into_response(),
    }
}

async fn relay_chat(state: &AppState, request: Request) -> Result<FragmentStream, ProxyError> {
    let body = axum::body::to_bytes(request.into_body(), MAX_REQUEST_BODY_BYTES)
        .await
        .map_err(|e| ProxyError::InvalidRequest(format!("failed to read request body: {e}")))?;

    let chat = ChatRequest::from_json(&body).map_err(|e| {
        tracing::debug!(error = %e, "chat request rejected");
        ProxyError::from(e)
    })?;

    state.upstream.open_stream(chat).await
}

// ---------------------------------------------------------------------------
// Response emitter
// ---------------------------------------------------------------------------

/// Wrap a fragment stream in a chunked plain-text 200 response.
///
/// Each fragment is written as its own chunk. Dropping the response body
/// (client disconnect) drops the fragment stream and with it the upstream.
pub fn stream_response(fragments: FragmentStream) -> Response {
    let body = Body::from_stream(fragments.map(Ok::<_, Infallible>));
    let mut response = Response::new(body);
    let headers = response.headers_mut();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
    response
}

// ---------------------------------------------------------------------------
// CORS
// ---------------------------------------------------------------------------

/// Stamp the permissive CORS headers onto any outgoing response.
pub async fn apply_cors(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(CORS_ALLOW_ORIGIN),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(CORS_ALLOW_HEADERS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(CORS_ALLOW_METHODS),
    );
    response
}

// ---------------------------------------------------------------------------
// Router construction
// ---------------------------------------------------------------------------

/// Build the axum router with the chat, preflight and heartbeat routes.
///
/// The upstream client is injected; the router itself holds no network state.
pub fn build_router(upstream: Arc<dyn UpstreamClient>) -> Router {
    let state = AppState { upstream };

    Router::new()
        .route("/v1/chat", post(chat_handler).options(preflight))
        .route("/v1/heartbeat", get(heartbeat))
        .layer(axum::middleware::map_response(apply_cors))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
