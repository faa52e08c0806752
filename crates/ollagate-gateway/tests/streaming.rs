//! End-to-end translation tests against a mock NDJSON backend.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use http_body_util::BodyExt;
use tower::ServiceExt;

use common::{spawn_backend, test_settings};
use ollagate_gateway::build_router;

/// Mock backend chat endpoint: NDJSON fragments when streaming was
/// requested, a single complete object otherwise.
fn chat_backend() -> Router {
    Router::new().route(
        "/api/chat",
        post(|Json(body): Json<serde_json::Value>| async move {
            if body["stream"].as_bool().unwrap_or(false) {
                let ndjson = concat!(
                    "{\"message\":{\"content\":\"Hi\"},\"done\":false}\n",
                    "{\"message\":{\"content\":\" there\"},\"done\":false}\n",
                    "{\"done\":true}\n",
                );
                ([("content-type", "application/x-ndjson")], ndjson).into_response()
            } else {
                Json(serde_json::json!({
                    "message": {"role": "assistant", "content": "Hello!"},
                    "done": true,
                    "prompt_eval_count": 12,
                    "eval_count": 3,
                }))
                .into_response()
            }
        }),
    )
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Split an SSE body into its `data:` payloads.
fn sse_data_lines(body: &str) -> Vec<String> {
    body.split("\n\n")
        .map(str::trim)
        .filter(|event| !event.is_empty())
        .map(|event| event.strip_prefix("data: ").unwrap_or(event).to_string())
        .collect()
}

#[tokio::test]
async fn streaming_chat_emits_ordered_sse_events() {
    let backend = spawn_backend(chat_backend()).await;
    let app = build_router(&test_settings(&backend)).unwrap();

    let response = app
        .oneshot(post_json(
            "/v1/chat/completions",
            r#"{"model": "llama3", "stream": true,
                "messages": [{"role": "user", "content": "hi"}]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/event-stream"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let events = sse_data_lines(&String::from_utf8_lossy(&bytes));
    assert_eq!(events.len(), 4);

    let first: serde_json::Value = serde_json::from_str(&events[0]).unwrap();
    assert_eq!(first["object"], "chat.completion.chunk");
    assert_eq!(first["choices"][0]["delta"]["role"], "assistant");
    assert_eq!(first["choices"][0]["delta"]["content"], "Hi");

    let second: serde_json::Value = serde_json::from_str(&events[1]).unwrap();
    assert_eq!(second["choices"][0]["delta"]["content"], " there");

    let finish: serde_json::Value = serde_json::from_str(&events[2]).unwrap();
    assert_eq!(finish["choices"][0]["finish_reason"], "stop");

    assert_eq!(events[3], "[DONE]");
}

#[tokio::test]
async fn non_streaming_chat_returns_completion_envelope() {
    let backend = spawn_backend(chat_backend()).await;
    let app = build_router(&test_settings(&backend)).unwrap();

    let response = app
        .oneshot(post_json(
            "/v1/chat/completions",
            r#"{"model": "llama3", "messages": [{"role": "user", "content": "hi"}]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(json["object"], "chat.completion");
    assert_eq!(json["model"], "llama3:8b");
    assert_eq!(json["choices"][0]["message"]["content"], "Hello!");
    assert_eq!(json["choices"][0]["finish_reason"], "stop");
    assert_eq!(json["usage"]["prompt_tokens"], 12);
    assert_eq!(json["usage"]["completion_tokens"], 3);
    assert_eq!(json["usage"]["total_tokens"], 15);
}

#[tokio::test]
async fn backend_receives_resolved_model_and_options() {
    // The mock echoes what it was sent, so the assertions below verify
    // the outbound translation, not just the response path.
    let backend = spawn_backend(Router::new().route(
        "/api/chat",
        post(|Json(body): Json<serde_json::Value>| async move {
            let echo = format!(
                "model={} num_ctx={} num_predict={}",
                body["model"].as_str().unwrap_or(""),
                body["options"]["num_ctx"],
                body["options"]["num_predict"],
            );
            Json(serde_json::json!({
                "message": {"role": "assistant", "content": echo},
                "done": true,
            }))
        }),
    ))
    .await;
    let app = build_router(&test_settings(&backend)).unwrap();

    let response = app
        .oneshot(post_json(
            "/v1/chat/completions",
            r#"{"model": "mistral:latest", "max_tokens": 64,
                "messages": [{"role": "user", "content": "hi"}]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        json["choices"][0]["message"]["content"],
        "model=mistral:7b num_ctx=8192 num_predict=64"
    );
}

#[tokio::test]
async fn legacy_completion_translates_generate_response() {
    let backend = spawn_backend(Router::new().route(
        "/api/generate",
        post(|Json(body): Json<serde_json::Value>| async move {
            assert_eq!(body["prompt"], "say hi");
            assert_eq!(body["stream"], false);
            Json(serde_json::json!({"response": "hi there", "done": true}))
        }),
    ))
    .await;
    let app = build_router(&test_settings(&backend)).unwrap();

    let response = app
        .oneshot(post_json(
            "/v1/completions",
            r#"{"model": "mistral", "prompt": "say hi"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(json["object"], "text_completion");
    assert_eq!(json["model"], "mistral:7b");
    assert_eq!(json["choices"][0]["text"], "hi there");
    assert_eq!(json["choices"][0]["finish_reason"], "stop");
}
