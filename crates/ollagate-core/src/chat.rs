//! Canonical chat types.
//!
//! These types represent a chat request after inbound normalization,
//! independent of either wire dialect. A canonical request is built once
//! per inbound call, owned by that call's handling flow, and dropped when
//! the response is complete.

use serde::{Deserialize, Serialize};

/// Default sampling temperature applied when the caller omits one.
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Default nucleus-sampling parameter.
pub const DEFAULT_TOP_P: f32 = 0.9;

/// Default generation cap in tokens.
pub const DEFAULT_MAX_TOKENS: u32 = 512;

/// A single chat message with flattened text content.
///
/// Multi-part content is resolved before this type is constructed: only
/// text parts survive, joined with newlines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Generation parameters with defaults applied.
///
/// Immutable once constructed for a request. `context_window` is not a
/// caller-supplied field; it comes from model resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    pub stream: bool,
    pub context_window: u64,
}

impl GenerationParams {
    /// Build parameters from optional caller fields, falling back to the
    /// documented defaults field by field.
    #[must_use]
    pub fn resolve(
        temperature: Option<f32>,
        top_p: Option<f32>,
        max_tokens: Option<u32>,
        stream: bool,
        context_window: u64,
    ) -> Self {
        Self {
            temperature: temperature.unwrap_or(DEFAULT_TEMPERATURE),
            top_p: top_p.unwrap_or(DEFAULT_TOP_P),
            max_tokens: max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            stream,
            context_window,
        }
    }
}

/// A fully normalized chat request ready for backend translation.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Canonical backend model tag (already resolved).
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub params: GenerationParams,
}
