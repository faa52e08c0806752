//! OpenAI-compatible route handlers.
//!
//! These handlers accept OpenAI-format requests, translate them to the
//! backend's native dialect, forward them, and translate the response
//! (buffered or streamed) back into the OpenAI format. Inbound bodies are
//! decoded explicitly so a malformed request is rejected with our error
//! shape before any backend call is attempted.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

use ollagate_core::{GatewayError, resolve};

use crate::openai::{
    ChatCompletionRequest, CompletionRequest, EmbeddingRequest, ErrorResponse, ModelsResponse,
};
use crate::ollama::{OllamaChatFragment, OllamaChatRequest, OllamaGenerateRequest, OllamaTagsResponse};
use crate::stream::{self, StreamHead};
use crate::translate;
use crate::upstream::Upstream;

// ── Shared State ───────────────────────────────────────────────────────

/// Shared gateway state, cloneable and injected via Axum `State`. The
/// upstream client's connection pool is the only resource shared between
/// requests.
#[derive(Clone)]
pub(crate) struct GatewayState {
    pub upstream: Upstream,
}

/// Wrapper so gateway errors can flow out of handlers with `?`.
pub(crate) struct ApiError(GatewayError);

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = &self.0;
        if err.is_client_error() {
            debug!("rejected request: {err}");
        } else {
            error!("{err}");
        }
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorResponse::from(err))).into_response()
    }
}

/// Decode an inbound body, rejecting invalid JSON before any backend call.
fn decode_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, GatewayError> {
    serde_json::from_slice(body).map_err(|e| GatewayError::MalformedRequest(e.to_string()))
}

// ── GET /healthz ───────────────────────────────────────────────────────

/// Liveness probe reporting the configured backend address.
pub(crate) async fn healthz(State(state): State<GatewayState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "backend": state.upstream.base_url(),
    }))
}

// ── GET /v1/models ─────────────────────────────────────────────────────

/// List models, derived from the backend's own listing.
pub(crate) async fn list_models(
    State(state): State<GatewayState>,
) -> Result<Response, ApiError> {
    debug!("GET /v1/models");
    let tags: OllamaTagsResponse = state.upstream.get_json("/api/tags").await?;
    Ok(Json(ModelsResponse::from_names(tags.into_names())).into_response())
}

// ── POST /v1/chat/completions ──────────────────────────────────────────

pub(crate) async fn chat_completions(
    State(state): State<GatewayState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request: ChatCompletionRequest = decode_body(&body)?;
    let resolved = resolve(&request.model);
    let streaming = request.stream;

    info!(model = %resolved.tag, streaming, "POST /v1/chat/completions");

    let canonical = request.into_canonical(&resolved);
    let backend_body = OllamaChatRequest::from_canonical(&canonical);

    if streaming {
        let upstream_resp = state.upstream.post_stream("/api/chat", &backend_body).await?;
        let head = StreamHead::new(&canonical.model);
        let frames = stream::translate(upstream_resp.bytes_stream(), head);
        Ok(stream::into_sse(frames).into_response())
    } else {
        let fragment: OllamaChatFragment =
            state.upstream.post_json("/api/chat", &backend_body).await?;
        Ok(Json(translate::chat_completion(&fragment, &canonical.model)).into_response())
    }
}

// ── POST /v1/completions ───────────────────────────────────────────────

/// Legacy single-prompt completions, routed to the backend's generate
/// endpoint. Streaming is deliberately unsupported here: buffering the
/// stream would misrepresent the response shape back to the caller.
pub(crate) async fn completions(
    State(state): State<GatewayState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request: CompletionRequest = decode_body(&body)?;

    if request.stream {
        return Ok((
            StatusCode::NOT_IMPLEMENTED,
            Json(ErrorResponse::not_implemented(
                "streaming is not supported on /v1/completions; use /v1/chat/completions",
            )),
        )
            .into_response());
    }

    let resolved = resolve(&request.model);
    info!(model = %resolved.tag, "POST /v1/completions");

    let canonical = request.into_canonical(&resolved);
    let backend_body = OllamaGenerateRequest::from_canonical(&canonical);
    let fragment: OllamaChatFragment = state
        .upstream
        .post_json("/api/generate", &backend_body)
        .await?;

    Ok(Json(translate::text_completion(&fragment, &canonical.model)).into_response())
}

// ── POST /v1/embeddings ────────────────────────────────────────────────

pub(crate) async fn embeddings(
    State(state): State<GatewayState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request: EmbeddingRequest = decode_body(&body)?;
    let texts = crate::embeddings::normalize_input(request.input)?;
    let resolved = resolve(&request.model);

    info!(model = %resolved.tag, inputs = texts.len(), "POST /v1/embeddings");

    let response = crate::embeddings::aggregate(&state.upstream, &resolved, texts).await?;
    Ok(Json(response).into_response())
}
