//! Non-streaming response translation.
//!
//! Maps a complete backend chat/generate body into the OpenAI completion
//! envelopes. Envelope ids and timestamps are presentational: fresh on
//! every call, no correctness obligation.

use crate::openai::{
    ChatChoice, ChatCompletionResponse, CompletionChoice, CompletionResponse, OutgoingMessage,
    Usage,
};
use crate::ollama::OllamaChatFragment;

/// Translate a buffered backend chat response into a chat completion
/// envelope with a single choice and a fixed `stop` finish reason.
pub(crate) fn chat_completion(
    fragment: &OllamaChatFragment,
    model: &str,
) -> ChatCompletionResponse {
    ChatCompletionResponse {
        id: new_id("chatcmpl"),
        object: "chat.completion".to_string(),
        created: now_unix(),
        model: model.to_string(),
        choices: vec![ChatChoice {
            index: 0,
            message: OutgoingMessage {
                role: "assistant".to_string(),
                content: fragment.delta_text().to_string(),
            },
            finish_reason: Some("stop".to_string()),
        }],
        usage: Usage::from_counts(fragment.prompt_eval_count, fragment.eval_count),
    }
}

/// Translate a buffered backend generate response into a legacy text
/// completion envelope.
pub(crate) fn text_completion(
    fragment: &OllamaChatFragment,
    model: &str,
) -> CompletionResponse {
    CompletionResponse {
        id: new_id("cmpl"),
        object: "text_completion".to_string(),
        created: now_unix(),
        model: model.to_string(),
        choices: vec![CompletionChoice {
            text: fragment.delta_text().to_string(),
            index: 0,
            finish_reason: Some("stop".to_string()),
        }],
        usage: Usage::from_counts(fragment.prompt_eval_count, fragment.eval_count),
    }
}

fn new_id(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4())
}

fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_envelope_extracts_assistant_text() {
        let fragment: OllamaChatFragment = serde_json::from_str(
            r#"{"message":{"content":"hello"},"done":true,"prompt_eval_count":10,"eval_count":4}"#,
        )
        .unwrap();

        let envelope = chat_completion(&fragment, "llama3:8b");
        assert!(envelope.id.starts_with("chatcmpl-"));
        assert_eq!(envelope.object, "chat.completion");
        assert_eq!(envelope.choices.len(), 1);
        assert_eq!(envelope.choices[0].message.content, "hello");
        assert_eq!(envelope.choices[0].finish_reason.as_deref(), Some("stop"));
        assert_eq!(envelope.usage.prompt_tokens, 10);
        assert_eq!(envelope.usage.completion_tokens, 4);
        assert_eq!(envelope.usage.total_tokens, 14);
    }

    #[test]
    fn missing_content_is_empty_text_not_an_error() {
        let fragment: OllamaChatFragment = serde_json::from_str(r#"{"done":true}"#).unwrap();
        let envelope = chat_completion(&fragment, "llama3:8b");
        assert_eq!(envelope.choices[0].message.content, "");
        assert_eq!(envelope.usage.total_tokens, 0);
    }

    #[test]
    fn generate_body_maps_to_text_completion() {
        let fragment: OllamaChatFragment =
            serde_json::from_str(r#"{"response":"out","done":true}"#).unwrap();
        let envelope = text_completion(&fragment, "mistral:7b");
        assert!(envelope.id.starts_with("cmpl-"));
        assert_eq!(envelope.object, "text_completion");
        assert_eq!(envelope.choices[0].text, "out");
    }

    #[test]
    fn envelope_ids_are_unique_per_call() {
        let fragment = OllamaChatFragment::default();
        let a = chat_completion(&fragment, "m");
        let b = chat_completion(&fragment, "m");
        assert_ne!(a.id, b.id);
    }
}
