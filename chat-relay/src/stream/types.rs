// Copyright 2026 The Chat Relay Project
// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;

/// Prefix that marks an SSE data line. Matched exactly, including the space.
pub const DATA_PREFIX: &str = "data: ";

/// Payload some providers send as a final data line. Carries no output and
/// does not end the stream; only the upstream connection closing does.
pub const DONE_SENTINEL: &str = "[DONE]";

// ---------------------------------------------------------------------------
// Upstream events
// ---------------------------------------------------------------------------

/// One decoded SSE payload from the Anthropic Messages stream.
///
/// Only `ContentBlockDelta` can produce output. `Error` is surfaced to the
/// log. Every other discriminant (`message_start`, `ping`,
/// `content_block_stop`, ...) parses as `Other` and is dropped.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpstreamEvent {
    ContentBlockDelta { delta: TextDelta },
    Error { error: ProviderErrorBody },
    #[serde(other)]
    Other,
}

/// The `delta` object of a `content_block_delta` event.
///
/// Tool-input deltas (`input_json_delta`) carry `partial_json` instead of
/// `text` and therefore deserialize with `text: None`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TextDelta {
    #[serde(default)]
    pub text: Option<String>,
}

/// The `error` object of an in-stream provider error event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProviderErrorBody {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub message: String,
}

// ---------------------------------------------------------------------------
// Line classification
// ---------------------------------------------------------------------------

/// What a single complete SSE line contributes to the output.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// Non-empty text to emit immediately.
    Fragment(String),
    /// The provider reported an error inside the stream.
    ProviderError(ProviderErrorBody),
    /// Everything else: comments, `event:` lines, blank separators,
    /// `[DONE]`, unparseable payloads, other event types.
    Ignored,
}
