//! NDJSON → SSE streaming translator.
//!
//! The backend streams newline-delimited JSON fragments over an open byte
//! connection, with record boundaries falling anywhere relative to chunk
//! boundaries. This module reassembles complete lines, decodes them, and
//! re-emits each content delta as a Server-Sent Event in the OpenAI chunk
//! format, ending with the `[DONE]` sentinel once the backend reports
//! completion. Events are produced lazily and flushed one at a time; the
//! full output is never buffered.

use std::convert::Infallible;
use std::fmt::Display;

use axum::response::sse::{Event, Sse};
use bytes::{Bytes, BytesMut};
use futures_util::stream::BoxStream;
use futures_util::{Stream, StreamExt};
use ollagate_core::GatewayError;
use tracing::{debug, warn};

use crate::openai::{ChatChunkChoice, ChatCompletionChunk, ChatDelta};
use crate::ollama::OllamaChatFragment;

// ── Line reassembly ────────────────────────────────────────────────────

/// Buffered line reader decoupled from the transport.
///
/// Bytes are accumulated until a newline completes a record; a trailing
/// unterminated line stays buffered, since a chunk boundary can fall in
/// the middle of a JSON object.
#[derive(Debug, Default)]
pub(crate) struct LineAssembler {
    buf: BytesMut,
}

impl LineAssembler {
    pub(crate) fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Extract the next complete line (including its newline), or `None`
    /// when no full line is buffered yet.
    pub(crate) fn next_line(&mut self) -> Option<String> {
        let end = find_newline(&self.buf)?;
        let line = self.buf.split_to(end);
        Some(String::from_utf8_lossy(&line).into_owned())
    }
}

/// Find the next newline in the buffer, returning the position after it.
fn find_newline(buf: &BytesMut) -> Option<usize> {
    buf.iter().position(|&b| b == b'\n').map(|pos| pos + 1)
}

// ── Translation ────────────────────────────────────────────────────────

/// Identity stamped on every chunk of one streaming response.
#[derive(Debug, Clone)]
pub(crate) struct StreamHead {
    pub id: String,
    pub model: String,
    pub created: i64,
}

impl StreamHead {
    pub(crate) fn new(model: &str) -> Self {
        Self {
            id: format!("chatcmpl-{}", uuid::Uuid::new_v4()),
            model: model.to_string(),
            created: chrono::Utc::now().timestamp(),
        }
    }

    fn chunk(&self, delta: ChatDelta, finish_reason: Option<String>) -> ChatCompletionChunk {
        ChatCompletionChunk {
            id: self.id.clone(),
            object: "chat.completion.chunk".to_string(),
            created: self.created,
            model: self.model.clone(),
            choices: vec![ChatChunkChoice {
                index: 0,
                delta,
                finish_reason,
            }],
        }
    }

    fn delta_chunk(&self, text: &str, first: bool) -> ChatCompletionChunk {
        self.chunk(
            ChatDelta {
                role: first.then(|| "assistant".to_string()),
                content: Some(text.to_string()),
            },
            None,
        )
    }

    fn finish_chunk(&self) -> ChatCompletionChunk {
        self.chunk(ChatDelta::default(), Some("stop".to_string()))
    }
}

/// One emitted event: a chunk envelope or the terminal sentinel.
#[derive(Debug)]
pub(crate) enum SseFrame {
    Chunk(ChatCompletionChunk),
    Done,
}

impl SseFrame {
    /// The SSE `data:` payload for this frame.
    pub(crate) fn data(&self) -> String {
        match self {
            Self::Chunk(chunk) => serde_json::to_string(chunk).unwrap_or_default(),
            Self::Done => "[DONE]".to_string(),
        }
    }
}

/// Where the translation currently stands. After the backend reports
/// `done` we still owe the caller a finish chunk and the sentinel.
enum Phase {
    Reading,
    Finish,
    Sentinel,
    Complete,
}

/// State threaded through the `unfold` stream.
struct TranslateState<E> {
    stream: BoxStream<'static, Result<Bytes, E>>,
    lines: LineAssembler,
    head: StreamHead,
    first: bool,
    phase: Phase,
}

/// Translate a backend NDJSON byte stream into an ordered sequence of SSE
/// frames.
///
/// Frames appear in the exact order their originating lines did. Lines
/// that fail to decode are skipped; a source that ends without ever
/// reporting `done` simply ends the sequence without a sentinel. Once
/// `done` is observed no further input is read.
pub(crate) fn translate<S, E>(
    byte_stream: S,
    head: StreamHead,
) -> impl Stream<Item = SseFrame> + Send + 'static
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = TranslateState {
        stream: byte_stream.boxed(),
        lines: LineAssembler::default(),
        head,
        first: true,
        phase: Phase::Reading,
    };

    futures_util::stream::unfold(state, |mut st| async move {
        match st.phase {
            Phase::Complete => return None,
            Phase::Finish => {
                st.phase = Phase::Sentinel;
                return Some((SseFrame::Chunk(st.head.finish_chunk()), st));
            }
            Phase::Sentinel => {
                st.phase = Phase::Complete;
                return Some((SseFrame::Done, st));
            }
            Phase::Reading => {}
        }

        loop {
            // Drain complete lines before asking the source for more.
            while let Some(line) = st.lines.next_line() {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                let fragment: OllamaChatFragment = match serde_json::from_str(trimmed) {
                    Ok(fragment) => fragment,
                    Err(e) => {
                        // Backends occasionally emit partial or malformed
                        // lines mid-stream; skipping keeps the stream alive.
                        debug!("{}", GatewayError::StreamDecodeGlitch(e.to_string()));
                        continue;
                    }
                };

                if fragment.done {
                    let delta = fragment.delta_text();
                    if delta.is_empty() {
                        st.phase = Phase::Sentinel;
                        return Some((SseFrame::Chunk(st.head.finish_chunk()), st));
                    }
                    let chunk = st.head.delta_chunk(delta, st.first);
                    st.phase = Phase::Finish;
                    return Some((SseFrame::Chunk(chunk), st));
                }

                let delta = fragment.delta_text();
                if delta.is_empty() {
                    continue;
                }
                let chunk = st.head.delta_chunk(delta, st.first);
                st.first = false;
                return Some((SseFrame::Chunk(chunk), st));
            }

            match st.stream.next().await {
                Some(Ok(bytes)) => st.lines.push(&bytes),
                Some(Err(e)) => {
                    warn!("backend stream failed mid-read: {e}");
                    st.phase = Phase::Complete;
                    return None;
                }
                None => {
                    // Source exhausted without `done`: a legitimate (if
                    // unusual) backend behaviour. End without a sentinel.
                    st.phase = Phase::Complete;
                    return None;
                }
            }
        }
    })
}

/// Wrap translated frames as an SSE response, one event per frame.
pub(crate) fn into_sse<S>(frames: S) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    S: Stream<Item = SseFrame> + Send + 'static,
{
    Sse::new(frames.map(|frame| Ok(Event::default().data(frame.data()))))
}
