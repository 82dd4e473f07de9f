// Copyright 2026 The Chat Relay Project
// SPDX-License-Identifier: Apache-2.0

/// Anthropic API root.
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Value sent in the `anthropic-version` header.
pub const DEFAULT_API_VERSION: &str = "2023-06-01";

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

pub const DEFAULT_MAX_TOKENS: u32 = 1024;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Config file used when no `--config` is given.
pub const DEFAULT_CONFIG_PATH: &str = "chat-relay.yaml";
