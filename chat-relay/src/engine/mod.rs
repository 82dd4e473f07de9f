// Copyright 2026 The Chat Relay Project
// SPDX-License-Identifier: Apache-2.0

// Upstream client
//
// Turns a validated chat request into exactly one streaming call to the
// Anthropic Messages API:
// - Assemble the final system prompt
// - Build the request with the configured model parameters and credential
// - Reject non-success responses before any byte is streamed
// - Hand the response body to the frame decoder

use crate::config::Config;
use crate::message::{ChatRequest, Message};
use crate::prompt::assemble_system_prompt;
use crate::proxy::{ProxyError, UpstreamClient};
use crate::stream::{fragments, FragmentStream, StreamContext};
use async_trait::async_trait;
use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use bytes::Bytes;
use futures_util::stream::{Stream, StreamExt};
use futures_util::TryStreamExt;
use serde::Serialize;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Upper bound on how much of an upstream error body is kept for logging.
pub const MAX_ERROR_BODY_BYTES: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Request context for structured logging
// ---------------------------------------------------------------------------

struct RequestContext {
    request_id: String,
    model: String,
}

// ---------------------------------------------------------------------------
// Interfaces
// ---------------------------------------------------------------------------

/// Sends HTTP requests to the upstream provider.
#[async_trait]
pub trait HttpSender: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

// ---------------------------------------------------------------------------
// Transport types
// ---------------------------------------------------------------------------

/// A fully built upstream POST.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, HttpError>> + Send>>;

/// Upstream response with its body still unread.
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: ByteStream,
}

impl HttpResponse {
    /// Drain the body as text, keeping at most `MAX_ERROR_BODY_BYTES`.
    /// A transport error, or a wait longer than `idle_timeout` for the next
    /// chunk, ends collection early with whatever was read.
    pub async fn collect_text(mut self, idle_timeout: Option<Duration>) -> String {
        let mut collected = Vec::new();
        loop {
            let next = match idle_timeout {
                Some(limit) => match tokio::time::timeout(limit, self.body.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        tracing::debug!(
                            idle_timeout_ms = limit.as_millis() as u64,
                            collected_bytes = collected.len(),
                            "upstream error body stalled"
                        );
                        break;
                    }
                },
                None => self.body.next().await,
            };
            let Some(Ok(bytes)) = next else {
                break;
            };
            let room = MAX_ERROR_BODY_BYTES.saturating_sub(collected.len());
            collected.extend_from_slice(&bytes[..bytes.len().min(room)]);
            if collected.len() >= MAX_ERROR_BODY_BYTES {
                break;
            }
        }
        String::from_utf8_lossy(&collected).into_owned()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("upstream request failed: {0}")]
    Transport(String),
    #[error("upstream request timed out: {0}")]
    Timeout(String),
}

// ---------------------------------------------------------------------------
// Provider wire format
// ---------------------------------------------------------------------------

/// Body of `POST /v1/messages`.
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: &'a [Message],
    stream: bool,
}

// ---------------------------------------------------------------------------
// Engine dependencies
// ---------------------------------------------------------------------------

pub struct EngineDeps {
    pub config: Arc<Config>,
    pub http: Arc<dyn HttpSender>,
}

// ---------------------------------------------------------------------------
// EngineUpstreamClient
// ---------------------------------------------------------------------------

/// Upstream client backed by the Anthropic Messages API.
pub struct EngineUpstreamClient {
    deps: EngineDeps,
}

impl EngineUpstreamClient {
    pub fn new_with(deps: EngineDeps) -> Self {
        Self { deps }
    }

    /// Build the upstream request for a validated chat request.
    ///
    /// Fails only on local problems (a credential that is not a valid
    /// header value, a body that cannot be serialized).
    pub fn build_request(&self, request: &ChatRequest) -> Result<HttpRequest, ProxyError> {
        let upstream = &self.deps.config.upstream;
        let model = &self.deps.config.model;

        let system = assemble_system_prompt(request.system_prompt(), request.visitor_profile());
        let payload = MessagesRequest {
            model: &model.name,
            max_tokens: model.max_tokens,
            temperature: model.temperature,
            system: &system,
            messages: request.messages(),
            stream: true,
        };
        let body = serde_json::to_vec(&payload)
            .map_err(|e| ProxyError::Internal(format!("failed to serialize upstream request: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));

        let mut api_key = HeaderValue::from_str(&upstream.api_key)
            .map_err(|_| ProxyError::Internal("configured api_key is not a valid header value".into()))?;
        api_key.set_sensitive(true);
        headers.insert("x-api-key", api_key);

        let version = HeaderValue::from_str(&upstream.api_version)
            .map_err(|_| ProxyError::Internal("configured api_version is not a valid header value".into()))?;
        headers.insert("anthropic-version", version);

        Ok(HttpRequest {
            url: upstream.messages_url(),
            headers,
            body: Bytes::from(body),
        })
    }
}

#[async_trait]
impl UpstreamClient for EngineUpstreamClient {
    async fn open_stream(&self, request: ChatRequest) -> Result<FragmentStream, ProxyError> {
        let idle_timeout = self
            .deps
            .config
            .upstream
            .idle_timeout_ms
            .map(Duration::from_millis);
        let ctx = RequestContext {
            request_id: Uuid::new_v4().to_string(),
            model: self.deps.config.model.name.clone(),
        };

        tracing::debug!(
            request_id = %ctx.request_id,
            model = %ctx.model,
            messages = request.messages().len(),
            visitor_profile = request.visitor_profile().is_some(),
            "processing chat request"
        );

        let http_req = self.build_request(&request)?;

        let upstream = self.deps.http.send(http_req).await.map_err(|e| {
            tracing::warn!(
                request_id = %ctx.request_id,
                model = %ctx.model,
                error = %e,
                "upstream request failed before streaming"
            );
            match e {
                HttpError::Timeout(msg) => ProxyError::UpstreamTimeout(msg),
                HttpError::Transport(msg) => ProxyError::UpstreamFailure(msg),
            }
        })?;

        if !upstream.status.is_success() {
            let status = upstream.status.as_u16();
            let provider_request_id = upstream
                .headers
                .get("request-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            let body = upstream.collect_text(idle_timeout).await;
            tracing::warn!(
                request_id = %ctx.request_id,
                model = %ctx.model,
                status,
                provider_request_id = %provider_request_id,
                body = %body,
                "upstream returned non-success status"
            );
            return Err(ProxyError::UpstreamStatus { status, body });
        }

        tracing::info!(
            request_id = %ctx.request_id,
            model = %ctx.model,
            "upstream stream opened"
        );

        let stream_ctx = StreamContext {
            request_id: ctx.request_id,
            idle_timeout,
        };
        Ok(fragments(upstream.body, stream_ctx))
    }
}

// ---------------------------------------------------------------------------
// Reqwest HTTP sender
// ---------------------------------------------------------------------------

pub struct ReqwestHttpSender {
    client: reqwest::Client,
}

impl ReqwestHttpSender {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build a client honouring the configured connect timeout. No overall
    /// request timeout is set: it would also cut off healthy long streams.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(ms) = config.upstream.connect_timeout_ms {
            builder = builder.connect_timeout(Duration::from_millis(ms));
        }
        Ok(Self::new(builder.build()?))
    }
}

#[async_trait]
impl HttpSender for ReqwestHttpSender {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let resp = self
            .client
            .post(&request.url)
            .headers(request.headers)
            .body(request.body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    HttpError::Timeout(e.to_string())
                } else {
                    HttpError::Transport(e.to_string())
                }
            })?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let stream = resp
            .bytes_stream()
            .map_err(|e| HttpError::Transport(e.to_string()));

        Ok(HttpResponse {
            status,
            headers,
            body: Box::pin(stream),
        })
    }
}

// ---------------------------------------------------------------------------
// Public factory for default engine client
// ---------------------------------------------------------------------------

pub fn build_engine_client(config: Arc<Config>) -> Result<EngineUpstreamClient, reqwest::Error> {
    let http = ReqwestHttpSender::from_config(&config)?;
    Ok(EngineUpstreamClient::new_with(EngineDeps {
        config,
        http: Arc::new(http),
    }))
}
