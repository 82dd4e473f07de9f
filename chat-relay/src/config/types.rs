// Copyright 2026 The Chat Relay Project
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use super::defaults::{
    DEFAULT_API_VERSION, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE,
};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level parsed and validated relay config.
#[derive(Debug, Clone)]
pub struct Config {
    pub upstream: UpstreamConfig,
    pub model: ModelConfig,
    /// Environment label (e.g. "staging", "production"). Only used in logs.
    pub environment: String,
    /// SHA256 hash of the raw YAML (pre-interpolation): "sha256:{hex}".
    pub config_hash: String,
}

// ---------------------------------------------------------------------------
// Upstream
// ---------------------------------------------------------------------------

/// Where and how to reach the provider.
#[derive(Clone)]
pub struct UpstreamConfig {
    /// Base URL without the `/v1/messages` path.
    pub base_url: String,
    /// Provider credential, sent as `x-api-key`. May be empty.
    pub api_key: String,
    pub api_version: String,
    pub connect_timeout_ms: Option<u64>,
    /// Maximum wait for the next upstream chunk once streaming has begun.
    /// `None` leaves the stream bounded only by transport limits.
    pub idle_timeout_ms: Option<u64>,
}

impl UpstreamConfig {
    /// Full URL of the streaming messages endpoint.
    pub fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            api_version: DEFAULT_API_VERSION.to_string(),
            connect_timeout_ms: None,
            idle_timeout_ms: None,
        }
    }
}

// Hand-written so the credential never reaches a log line.
impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = if self.api_key.is_empty() { "<empty>" } else { "<redacted>" };
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &key)
            .field("api_version", &self.api_version)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("idle_timeout_ms", &self.idle_timeout_ms)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Model parameters
// ---------------------------------------------------------------------------

/// Fixed generation parameters sent with every upstream call.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub name: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}
