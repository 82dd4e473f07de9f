// Copyright 2026 The Chat Relay Project
// SPDX-License-Identifier: Apache-2.0

// Pull-based fragment stream
//
// Each poll from downstream either yields an already-decoded fragment
// or reads exactly one chunk from upstream. Nothing is read ahead of
// demand, and dropping the stream drops the upstream body with it.

use std::collections::VecDeque;
use std::fmt;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use futures_util::stream::{self, Stream, StreamExt};

use super::decoder::FrameDecoder;
use super::types::LineOutcome;

/// Text fragments in emission order. Finite and not restartable.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Bytes> + Send>>;

/// Per-request settings carried into the stream.
#[derive(Debug, Clone, Default)]
pub struct StreamContext {
    /// Correlates log lines with the request that opened the stream.
    pub request_id: String,
    /// Maximum wait for a single upstream chunk. `None` waits indefinitely.
    pub idle_timeout: Option<Duration>,
}

/// Turn an upstream SSE byte stream into a stream of text fragments.
///
/// A transport error or idle timeout ends the stream early and is logged;
/// the client sees a truncated body. A trailing partial line at end of
/// stream is discarded.
pub fn fragments<S, E>(input: S, ctx: StreamContext) -> FragmentStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    let state = PullState {
        input: Box::pin(input),
        decoder: FrameDecoder::new(),
        ready: VecDeque::new(),
        emitted: 0,
        ctx,
    };
    Box::pin(stream::unfold(state, pull_next))
}

struct PullState<E> {
    input: Pin<Box<dyn Stream<Item = Result<Bytes, E>> + Send>>,
    decoder: FrameDecoder,
    ready: VecDeque<String>,
    emitted: usize,
    ctx: StreamContext,
}

impl<E> PullState<E> {
    fn absorb(&mut self, chunk: &[u8]) {
        for outcome in self.decoder.feed(chunk) {
            match outcome {
                LineOutcome::Fragment(text) => self.ready.push_back(text),
                LineOutcome::ProviderError(error) => {
                    tracing::warn!(
                        request_id = %self.ctx.request_id,
                        error_type = %error.kind,
                        error_message = %error.message,
                        "provider reported an error mid-stream"
                    );
                }
                LineOutcome::Ignored => {}
            }
        }
    }
}

async fn pull_next<E: fmt::Display>(mut state: PullState<E>) -> Option<(Bytes, PullState<E>)> {
    loop {
        if let Some(fragment) = state.ready.pop_front() {
            state.emitted += 1;
            return Some((Bytes::from(fragment), state));
        }

        let next = match state.ctx.idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, state.input.next()).await {
                Ok(next) => next,
                Err(_) => {
                    tracing::warn!(
                        request_id = %state.ctx.request_id,
                        idle_timeout_ms = limit.as_millis() as u64,
                        fragments = state.emitted,
                        "upstream stream idle; closing response"
                    );
                    return None;
                }
            },
            None => state.input.next().await,
        };

        match next {
            Some(Ok(chunk)) => state.absorb(&chunk),
            Some(Err(e)) => {
                tracing::warn!(
                    request_id = %state.ctx.request_id,
                    error = %e,
                    fragments = state.emitted,
                    "upstream stream failed mid-response; closing response"
                );
                return None;
            }
            None => {
                tracing::debug!(
                    request_id = %state.ctx.request_id,
                    fragments = state.emitted,
                    discarded_bytes = state.decoder.pending_bytes(),
                    "upstream stream ended"
                );
                return None;
            }
        }
    }
}
