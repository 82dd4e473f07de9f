// Copyright 2026 The Chat Relay Project
// SPDX-License-Identifier: Apache-2.0

use super::types::{LineOutcome, UpstreamEvent, DATA_PREFIX, DONE_SENTINEL};

/// Classify one complete SSE line (without its terminating newline).
///
/// Unparseable payloads are ignored without logging: a single malformed
/// event must never end an otherwise healthy stream.
pub fn classify_line(line: &str) -> LineOutcome {
    let Some(rest) = line.strip_prefix(DATA_PREFIX) else {
        return LineOutcome::Ignored;
    };

    let payload = rest.trim();
    if payload == DONE_SENTINEL {
        return LineOutcome::Ignored;
    }

    match serde_json::from_str::<UpstreamEvent>(payload) {
        Ok(UpstreamEvent::ContentBlockDelta { delta }) => match delta.text {
            Some(text) if !text.is_empty() => LineOutcome::Fragment(text),
            _ => LineOutcome::Ignored,
        },
        Ok(UpstreamEvent::Error { error }) => LineOutcome::ProviderError(error),
        Ok(UpstreamEvent::Other) | Err(_) => LineOutcome::Ignored,
    }
}
