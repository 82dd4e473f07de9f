// Copyright 2026 The Chat Relay Project
// SPDX-License-Identifier: Apache-2.0

// Raw YAML deserialization types (internal)
// Kept apart from the public Config structs so interpolation and
// validation happen between parsing and the typed result.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RawConfig {
    pub relay: String,
    pub upstream: Option<RawUpstreamConfig>,
    pub model: Option<RawModelConfig>,
    pub environment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawUpstreamConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub api_version: Option<String>,
    pub connect_timeout_ms: Option<u64>,
    pub idle_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct RawModelConfig {
    pub name: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}
