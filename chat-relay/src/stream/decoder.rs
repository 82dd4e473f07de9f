// Copyright 2026 The Chat Relay Project
// SPDX-License-Identifier: Apache-2.0

use super::classifier::classify_line;
use super::types::LineOutcome;

// ---------------------------------------------------------------------------
// UTF-8 carry
// ---------------------------------------------------------------------------

/// Incremental UTF-8 decoder.
///
/// A code point split across two chunks is held back until the rest of
/// its bytes arrive. Bytes that can never form valid UTF-8 decode to
/// U+FFFD rather than failing the stream.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode as much of `pending + chunk` as is complete.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(chunk);

        let mut out = String::with_capacity(bytes.len());
        let mut rest: &[u8] = &bytes;
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    // `valid_up_to` guarantees this prefix converts.
                    if let Ok(text) = std::str::from_utf8(valid) {
                        out.push_str(text);
                    }
                    match e.error_len() {
                        // Incomplete sequence at the end: wait for more bytes.
                        None => {
                            self.pending = after.to_vec();
                            break;
                        }
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                    }
                }
            }
        }
        out
    }

    /// Bytes of an incomplete code point still waiting for a later chunk.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

// ---------------------------------------------------------------------------
// Line buffering
// ---------------------------------------------------------------------------

/// Pure line-buffer transition: `(buffer, chunk) -> (complete_lines, new_buffer)`.
///
/// Every segment of `buffer + chunk` that is followed by a `\n` is a
/// complete line. The text after the last `\n` (possibly empty) is the new
/// buffer.
pub fn split_lines(buffer: &str, chunk: &str) -> (Vec<String>, String) {
    let mut next = buffer.to_string();
    let lines = append_chunk(&mut next, chunk);
    (lines, next)
}

/// In-place form of `split_lines`: appends `chunk` to `buffer` and returns
/// the lines it completes.
///
/// Only `chunk` is searched for newlines, so a long unterminated line
/// arriving in many small chunks costs time linear in its length.
pub fn append_chunk(buffer: &mut String, chunk: &str) -> Vec<String> {
    let Some((complete, rest)) = chunk.rsplit_once('\n') else {
        buffer.push_str(chunk);
        return Vec::new();
    };

    let mut segments = complete.split('\n');
    let mut lines = Vec::new();
    // The first segment finishes the line already held in the buffer.
    if let Some(first) = segments.next() {
        buffer.push_str(first);
        lines.push(std::mem::take(buffer));
    }
    lines.extend(segments.map(String::from));
    buffer.push_str(rest);
    lines
}

// ---------------------------------------------------------------------------
// Frame decoder
// ---------------------------------------------------------------------------

/// Byte chunks in, line outcomes out.
///
/// Holds exactly the bytes after the last newline seen so far. Dropping
/// the decoder discards that partial line; it is never flushed.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    utf8: Utf8Decoder,
    buffer: String,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one upstream chunk and classify every line it completes.
    /// Outcomes are returned in stream order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<LineOutcome> {
        let text = self.utf8.decode(chunk);
        if text.is_empty() {
            return Vec::new();
        }

        append_chunk(&mut self.buffer, &text)
            .iter()
            .map(|line| classify_line(line))
            .collect()
    }

    /// Feed one chunk, keeping only the text fragments.
    pub fn feed_fragments(&mut self, chunk: &[u8]) -> Vec<String> {
        self.feed(chunk)
            .into_iter()
            .filter_map(|outcome| match outcome {
                LineOutcome::Fragment(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// The unterminated trailing line held for the next chunk.
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    /// Total bytes held back: the partial line plus any split code point.
    pub fn pending_bytes(&self) -> usize {
        self.buffer.len() + self.utf8.pending_len()
    }
}
