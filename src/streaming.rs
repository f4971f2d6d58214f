//! NDJSON streaming response parser.
//!
//! Ollama streams replies as newline-delimited JSON: one object per line,
//! with the final line carrying `done: true`. This module splits a raw byte
//! stream into lines across chunk boundaries and turns `/api/chat` lines
//! into incremental content fragments.

use std::fmt;

use futures::stream::{self, Stream, StreamExt};

use crate::errors::OllamaError;
use crate::types::ChatChunk;

// ─── Line framing ────────────────────────────────────────────────────────────

/// Split a byte stream into trimmed, non-empty NDJSON lines.
///
/// Buffers partial lines across chunk boundaries and flushes a trailing
/// unterminated line when the underlying stream ends.
pub(crate) fn ndjson_lines<S, B, E>(byte_stream: S) -> impl Stream<Item = Result<String, OllamaError>>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: fmt::Display,
{
    stream::unfold(
        (byte_stream, String::new(), false),
        |(mut byte_stream, mut buffer, ended)| async move {
            if ended {
                return None;
            }
            loop {
                // Drain complete lines from the buffer first
                if let Some(pos) = buffer.find('\n') {
                    let line = buffer[..pos].trim().to_string();
                    buffer = buffer[pos + 1..].to_string();
                    if line.is_empty() {
                        continue;
                    }
                    return Some((Ok(line), (byte_stream, buffer, false)));
                }

                match byte_stream.next().await {
                    Some(Ok(bytes)) => {
                        buffer.push_str(&String::from_utf8_lossy(bytes.as_ref()));
                    }
                    Some(Err(e)) => {
                        return Some((
                            Err(OllamaError::StreamError {
                                reason: format!("stream read error: {e}"),
                            }),
                            (byte_stream, buffer, true),
                        ));
                    }
                    None => {
                        // Stream ended — flush any unterminated final line
                        let tail = buffer.trim().to_string();
                        buffer.clear();
                        if tail.is_empty() {
                            return None;
                        }
                        return Some((Ok(tail), (byte_stream, buffer, true)));
                    }
                }
            }
        },
    )
}

// ─── Chat chunk parsing ──────────────────────────────────────────────────────

/// Parse one `/api/chat` NDJSON line.
///
/// Returns the content fragment carried by the line (if any, may be empty)
/// and whether the service signalled completion.
fn process_chat_line(line: &str) -> Result<(Option<String>, bool), OllamaError> {
    let chunk: ChatChunk =
        serde_json::from_str(line).map_err(|e| OllamaError::StreamError {
            reason: format!("failed to parse chunk: {e} (line: {line})"),
        })?;

    if let Some(error) = chunk.error {
        return Err(OllamaError::StreamError { reason: error });
    }

    let fragment = chunk
        .message
        .map(|m| m.content)
        .filter(|c| !c.is_empty());

    Ok((fragment, chunk.done))
}

/// Turn a streaming `/api/chat` response body into content fragments.
///
/// Yields each non-empty incremental `message.content` until the line with
/// `done: true`, then ends. A mid-stream error ends the stream after the
/// `Err` item.
pub fn parse_chat_stream(
    response: reqwest::Response,
) -> impl Stream<Item = Result<String, OllamaError>> {
    chat_fragments(Box::pin(ndjson_lines(Box::pin(response.bytes_stream()))))
}

/// Fragment extraction over an already-framed line stream.
pub(crate) fn chat_fragments<S>(lines: S) -> impl Stream<Item = Result<String, OllamaError>>
where
    S: Stream<Item = Result<String, OllamaError>> + Unpin,
{
    stream::unfold((lines, false), |(mut lines, finished)| async move {
        if finished {
            return None;
        }
        loop {
            match lines.next().await {
                Some(Ok(line)) => match process_chat_line(&line) {
                    Ok((Some(fragment), done)) => {
                        return Some((Ok(fragment), (lines, done)));
                    }
                    Ok((None, true)) => return None,
                    Ok((None, false)) => continue,
                    Err(e) => return Some((Err(e), (lines, true))),
                },
                Some(Err(e)) => return Some((Err(e), (lines, true))),
                None => return None,
            }
        }
    })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
