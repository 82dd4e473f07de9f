// Copyright 2026 The Chat Relay Project
// SPDX-License-Identifier: Apache-2.0

// SSE frame decoding
//
// Responsibilities:
// - Decode raw upstream bytes as UTF-8, carrying split code points
//   across chunk boundaries
// - Hold the trailing partial line until a later chunk completes it
// - Extract `content_block_delta` text from `data: ` lines
// - Hand fragments downstream one at a time, reading upstream only
//   when nothing is pending
// - Never flush a trailing partial line at end of stream

mod classifier;
mod decoder;
mod processor;
mod types;

pub use classifier::classify_line;
pub use decoder::{append_chunk, split_lines, FrameDecoder, Utf8Decoder};
pub use processor::{fragments, FragmentStream, StreamContext};
pub use types::{LineOutcome, ProviderErrorBody, TextDelta, UpstreamEvent, DATA_PREFIX, DONE_SENTINEL};
