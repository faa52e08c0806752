//! Ollama wire types.
//!
//! The backend speaks Ollama's JSON dialect: `/api/chat` and
//! `/api/generate` return either a single object (non-streaming) or
//! newline-delimited fragments (streaming), `/api/embed` returns one of
//! several embedding shapes, `/api/tags` lists installed models.

use ollagate_core::ChatRequest;
use serde::{Deserialize, Serialize};

// ── Requests ───────────────────────────────────────────────────────────

/// Generation options nested under `options` in backend requests.
#[derive(Debug, Clone, Serialize)]
pub struct OllamaOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub num_ctx: u64,
    pub num_predict: u32,
}

/// A chat message in backend format.
#[derive(Debug, Clone, Serialize)]
pub struct OllamaChatMessage {
    pub role: String,
    pub content: String,
}

/// Body for POST /api/chat.
#[derive(Debug, Clone, Serialize)]
pub struct OllamaChatRequest {
    pub model: String,
    pub messages: Vec<OllamaChatMessage>,
    pub stream: bool,
    pub options: OllamaOptions,
}

impl OllamaChatRequest {
    /// Translate a canonical request into the backend chat body.
    #[must_use]
    pub fn from_canonical(request: &ChatRequest) -> Self {
        Self {
            model: request.model.clone(),
            messages: request
                .messages
                .iter()
                .map(|m| OllamaChatMessage {
                    role: m.role.clone(),
                    content: m.content.clone(),
                })
                .collect(),
            stream: request.params.stream,
            options: options_from(request),
        }
    }
}

/// Body for POST /api/generate (single-prompt form).
#[derive(Debug, Clone, Serialize)]
pub struct OllamaGenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    pub options: OllamaOptions,
}

impl OllamaGenerateRequest {
    /// Translate a canonical request into the backend generate body. The
    /// legacy form has exactly one user message, which becomes the prompt.
    #[must_use]
    pub fn from_canonical(request: &ChatRequest) -> Self {
        Self {
            model: request.model.clone(),
            prompt: request
                .messages
                .first()
                .map(|m| m.content.clone())
                .unwrap_or_default(),
            stream: false,
            options: options_from(request),
        }
    }
}

fn options_from(request: &ChatRequest) -> OllamaOptions {
    OllamaOptions {
        temperature: request.params.temperature,
        top_p: request.params.top_p,
        num_ctx: request.params.context_window,
        num_predict: request.params.max_tokens,
    }
}

/// Body for POST /api/embed, one input per call.
#[derive(Debug, Clone, Serialize)]
pub struct OllamaEmbedRequest {
    pub model: String,
    pub input: String,
}

// ── Responses ──────────────────────────────────────────────────────────

/// One decoded line of a streaming backend response. A complete
/// non-streaming response has the same shape, so this doubles as the
/// buffered chat/generate response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OllamaChatFragment {
    #[serde(default)]
    pub message: Option<OllamaFragmentMessage>,
    /// Generate responses carry their text here instead of `message`.
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub prompt_eval_count: Option<u32>,
    #[serde(default)]
    pub eval_count: Option<u32>,
}

/// The message object inside a chat fragment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OllamaFragmentMessage {
    #[serde(default)]
    pub content: String,
}

impl OllamaChatFragment {
    /// The text this fragment contributes, whichever field carries it.
    /// Missing content is empty text, not an error.
    #[must_use]
    pub fn delta_text(&self) -> &str {
        if let Some(message) = &self.message {
            return &message.content;
        }
        self.response.as_deref().unwrap_or("")
    }
}

/// Response from GET /api/tags (the backend model listing).
#[derive(Debug, Clone, Deserialize)]
pub struct OllamaTagsResponse {
    #[serde(default)]
    pub models: Vec<OllamaTagModel>,
}

/// One installed model in the tags listing.
#[derive(Debug, Clone, Deserialize)]
pub struct OllamaTagModel {
    pub name: String,
}

impl OllamaTagsResponse {
    /// Just the model names, in listing order.
    #[must_use]
    pub fn into_names(self) -> Vec<String> {
        self.models.into_iter().map(|m| m.name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ollagate_core::{ChatMessage, GenerationParams};

    fn canonical() -> ChatRequest {
        ChatRequest {
            model: "llama3:8b".to_string(),
            messages: vec![ChatMessage::new("user", "hi")],
            params: GenerationParams::resolve(None, None, None, true, 8192),
        }
    }

    #[test]
    fn chat_body_carries_options_and_stream() {
        let body = OllamaChatRequest::from_canonical(&canonical());
        assert_eq!(body.model, "llama3:8b");
        assert!(body.stream);
        assert_eq!(body.options.num_ctx, 8192);
        assert_eq!(body.options.num_predict, 512);
    }

    #[test]
    fn chat_fragment_reads_message_content() {
        let fragment: OllamaChatFragment =
            serde_json::from_str(r#"{"message":{"content":"Hi"},"done":false}"#).unwrap();
        assert_eq!(fragment.delta_text(), "Hi");
        assert!(!fragment.done);
    }

    #[test]
    fn generate_fragment_reads_response_field() {
        let fragment: OllamaChatFragment =
            serde_json::from_str(r#"{"response":"out","done":true}"#).unwrap();
        assert_eq!(fragment.delta_text(), "out");
        assert!(fragment.done);
    }

    #[test]
    fn bare_done_fragment_has_empty_delta() {
        let fragment: OllamaChatFragment = serde_json::from_str(r#"{"done":true}"#).unwrap();
        assert_eq!(fragment.delta_text(), "");
    }

    #[test]
    fn tags_listing_yields_names() {
        let tags: OllamaTagsResponse =
            serde_json::from_str(r#"{"models":[{"name":"llama3:8b"},{"name":"phi3:mini"}]}"#)
                .unwrap();
        assert_eq!(tags.into_names(), vec!["llama3:8b", "phi3:mini"]);
    }
}
