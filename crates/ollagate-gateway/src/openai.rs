//! OpenAI-compatible API data models for request/response handling.
//!
//! This module contains the wire types the gateway exposes to callers and
//! the normalization from those shapes into the canonical domain types.
//! Everything is decoded once at the boundary into typed, partially
//! optional structures; handlers never walk raw JSON trees.

use ollagate_core::{ChatMessage, ChatRequest, GenerationParams, GatewayError, ResolvedModel};
use serde::{Deserialize, Serialize};

// =============================================================================
// Chat Completion Request Types
// =============================================================================

/// Request to /v1/chat/completions endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionRequest {
    /// Model name to use. Blank falls back to the default tag.
    #[serde(default)]
    pub model: String,
    /// Chat messages; absent is treated as an empty conversation.
    #[serde(default)]
    pub messages: Vec<IncomingMessage>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Top-p sampling parameter.
    pub top_p: Option<f32>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// Whether to stream the response.
    #[serde(default)]
    pub stream: bool,
}

/// A single inbound chat message, before content flattening.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub content: MessageContent,
}

fn default_role() -> String {
    "user".to_string()
}

/// Message content as clients actually send it: plain text, a multi-part
/// array, or (from sloppy SDKs) some other scalar to coerce.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
    Other(serde_json::Value),
}

impl Default for MessageContent {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

/// One element of a multi-part content array. Non-text parts decode with
/// an empty `text` and are dropped during flattening.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: String,
}

impl MessageContent {
    /// Flatten to plain text: text parts joined with newlines, everything
    /// else dropped; already-text content is the identity.
    #[must_use]
    pub fn flatten(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Parts(parts) => parts
                .iter()
                .filter(|part| part.kind == "text")
                .map(|part| part.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            Self::Other(serde_json::Value::Null) => String::new(),
            Self::Other(value) => value
                .as_str()
                .map_or_else(|| value.to_string(), str::to_string),
        }
    }
}

impl ChatCompletionRequest {
    /// Normalize into the canonical request, applying generation defaults
    /// and the resolved model tag.
    #[must_use]
    pub fn into_canonical(self, resolved: &ResolvedModel) -> ChatRequest {
        let messages = self
            .messages
            .iter()
            .map(|m| ChatMessage::new(m.role.clone(), m.content.flatten()))
            .collect();

        ChatRequest {
            model: resolved.tag.clone(),
            messages,
            params: GenerationParams::resolve(
                self.temperature,
                self.top_p,
                self.max_tokens,
                self.stream,
                resolved.context_window,
            ),
        }
    }
}

// =============================================================================
// Legacy Completion Request
// =============================================================================

/// Request to the legacy /v1/completions endpoint (single-prompt form).
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionRequest {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub prompt: String,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub stream: bool,
}

impl CompletionRequest {
    /// Normalize to a canonical request with the prompt as one user message.
    #[must_use]
    pub fn into_canonical(self, resolved: &ResolvedModel) -> ChatRequest {
        ChatRequest {
            model: resolved.tag.clone(),
            messages: vec![ChatMessage::new("user", self.prompt)],
            params: GenerationParams::resolve(
                self.temperature,
                self.top_p,
                self.max_tokens,
                false,
                resolved.context_window,
            ),
        }
    }
}

// =============================================================================
// Embedding Request Types
// =============================================================================

/// Request to /v1/embeddings endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingRequest {
    #[serde(default)]
    pub model: String,
    /// Absent input is a client error, not a default.
    pub input: Option<EmbeddingInput>,
}

/// Embedding input: a single string or a batch of values coerced to text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EmbeddingInput {
    Single(String),
    Batch(Vec<serde_json::Value>),
}

impl EmbeddingInput {
    /// Normalize to a non-empty list of texts. A present-but-empty batch
    /// becomes a single empty string so the fan-out always has work.
    #[must_use]
    pub fn into_texts(self) -> Vec<String> {
        let texts = match self {
            Self::Single(text) => vec![text],
            Self::Batch(values) => values
                .into_iter()
                .map(|value| {
                    value
                        .as_str()
                        .map_or_else(|| value.to_string(), str::to_string)
                })
                .collect(),
        };
        if texts.is_empty() {
            vec![String::new()]
        } else {
            texts
        }
    }
}

// =============================================================================
// Response Envelope Types
// =============================================================================

/// A message as sent back to callers.
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingMessage {
    pub role: String,
    pub content: String,
}

/// Response from /v1/chat/completions (non-streaming).
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionResponse {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<ChatChoice>,
    pub usage: Usage,
}

/// A single chat completion choice.
#[derive(Debug, Clone, Serialize)]
pub struct ChatChoice {
    pub index: u32,
    pub message: OutgoingMessage,
    pub finish_reason: Option<String>,
}

/// Streaming chunk from /v1/chat/completions.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionChunk {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<ChatChunkChoice>,
}

/// A single streaming choice.
#[derive(Debug, Clone, Serialize)]
pub struct ChatChunkChoice {
    pub index: u32,
    pub delta: ChatDelta,
    pub finish_reason: Option<String>,
}

/// Delta content in a streaming response.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChatDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Response from the legacy /v1/completions endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionResponse {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<CompletionChoice>,
    pub usage: Usage,
}

/// A single legacy completion choice.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionChoice {
    pub text: String,
    pub index: u32,
    pub finish_reason: Option<String>,
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl Usage {
    /// Build usage from optional backend eval counts (zeros when absent).
    #[must_use]
    pub fn from_counts(prompt_tokens: Option<u32>, completion_tokens: Option<u32>) -> Self {
        let prompt_tokens = prompt_tokens.unwrap_or(0);
        let completion_tokens = completion_tokens.unwrap_or(0);
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

// =============================================================================
// Embedding Response Types
// =============================================================================

/// Response from /v1/embeddings endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingResponse {
    pub object: String,
    pub data: Vec<EmbeddingData>,
    pub model: String,
    pub usage: Usage,
}

/// One embedding vector, indexed to match the input order.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingData {
    pub object: String,
    pub index: u32,
    pub embedding: Vec<f32>,
}

impl EmbeddingData {
    #[must_use]
    pub fn new(index: u32, embedding: Vec<f32>) -> Self {
        Self {
            object: "embedding".to_string(),
            index,
            embedding,
        }
    }
}

// =============================================================================
// Models Endpoint Types
// =============================================================================

/// Response from /v1/models endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ModelsResponse {
    pub object: String,
    pub data: Vec<ModelInfo>,
}

impl ModelsResponse {
    /// Wrap backend model names in the OpenAI listing format.
    #[must_use]
    pub fn from_names(names: Vec<String>) -> Self {
        Self {
            object: "list".to_string(),
            data: names
                .into_iter()
                .map(|id| ModelInfo {
                    id,
                    object: "model".to_string(),
                    owned_by: "ollama".to_string(),
                })
                .collect(),
        }
    }
}

/// Information about a single model (OpenAI format).
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub id: String,
    pub object: String,
    pub owned_by: String,
}

// =============================================================================
// Error Response Types
// =============================================================================

/// Error response matching the OpenAI format.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail within an error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub message: String,
    pub r#type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response.
    #[must_use]
    pub fn new(message: impl Into<String>, error_type: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                message: message.into(),
                r#type: error_type.into(),
                code: None,
            },
        }
    }

    /// Create an error response with a code.
    #[must_use]
    pub fn with_code(
        message: impl Into<String>,
        error_type: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorDetail {
                message: message.into(),
                r#type: error_type.into(),
                code: Some(code.into()),
            },
        }
    }

    /// Error response for an operation this gateway deliberately does not
    /// support.
    #[must_use]
    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::with_code(message, "invalid_request_error", "not_implemented")
    }
}

impl From<&GatewayError> for ErrorResponse {
    fn from(err: &GatewayError) -> Self {
        match err {
            GatewayError::MalformedRequest(_) => {
                Self::new(err.to_string(), "invalid_request_error")
            }
            GatewayError::MissingInput => {
                Self::with_code(err.to_string(), "invalid_request_error", "missing_input")
            }
            GatewayError::UpstreamUnreachable(_) => {
                Self::with_code(err.to_string(), "server_error", "upstream_unreachable")
            }
            GatewayError::UpstreamError { .. } | GatewayError::StreamDecodeGlitch(_) => {
                Self::with_code(err.to_string(), "server_error", "upstream_error")
            }
            GatewayError::Internal(_) => Self::new(err.to_string(), "server_error"),
        }
    }
}
