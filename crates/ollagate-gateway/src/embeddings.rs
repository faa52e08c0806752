//! Embedding fan-out and response-shape normalization.
//!
//! Each normalized input gets its own backend call. Calls run
//! concurrently, but results are reassembled strictly by input index, and
//! any failed call fails the whole batch with no partial results.

use futures_util::future::try_join_all;
use ollagate_core::{GatewayError, ResolvedModel};
use serde_json::Value;

use crate::openai::{EmbeddingData, EmbeddingInput, EmbeddingResponse, Usage};
use crate::ollama::OllamaEmbedRequest;
use crate::upstream::Upstream;

/// Normalize the inbound `input` field. Absent input is a client error;
/// everything else becomes a non-empty list of texts.
pub(crate) fn normalize_input(
    input: Option<EmbeddingInput>,
) -> Result<Vec<String>, GatewayError> {
    input
        .map(EmbeddingInput::into_texts)
        .ok_or(GatewayError::MissingInput)
}

/// Fan out one backend call per input and reassemble the indexed result
/// list.
pub(crate) async fn aggregate(
    upstream: &Upstream,
    model: &ResolvedModel,
    texts: Vec<String>,
) -> Result<EmbeddingResponse, GatewayError> {
    let calls = texts.iter().map(|text| {
        let request = OllamaEmbedRequest {
            model: model.tag.clone(),
            input: text.clone(),
        };
        async move { upstream.post_json::<_, Value>("/api/embed", &request).await }
    });

    // try_join_all keeps results in construction order regardless of
    // completion order, and aborts the batch on the first failure.
    let bodies = try_join_all(calls).await?;

    let mut prompt_tokens: u32 = 0;
    let data = bodies
        .iter()
        .enumerate()
        .map(|(index, body)| {
            prompt_tokens += body
                .get("prompt_eval_count")
                .and_then(Value::as_u64)
                .unwrap_or(0) as u32;
            let vector = extract_vectors(body).into_iter().next().unwrap_or_default();
            EmbeddingData::new(index as u32, vector)
        })
        .collect();

    Ok(EmbeddingResponse {
        object: "list".to_string(),
        data,
        model: model.tag.clone(),
        usage: Usage::from_counts(Some(prompt_tokens), Some(0)),
    })
}

/// All embedding vectors present in a backend response, whichever field
/// shape the backend chose.
///
/// Known shapes: a single vector under `embedding`, a list of vectors
/// under `embeddings`, and a degenerate flat vector under `embeddings`.
/// Anything else yields no vectors; callers fall back to an empty vector
/// rather than failing the batch.
pub(crate) fn extract_vectors(body: &Value) -> Vec<Vec<f32>> {
    if let Some(values) = body.get("embedding").and_then(Value::as_array) {
        return vec![floats(values)];
    }
    if let Some(rows) = body.get("embeddings").and_then(Value::as_array) {
        if !rows.is_empty() && rows.iter().all(Value::is_number) {
            return vec![floats(rows)];
        }
        return rows
            .iter()
            .map(|row| row.as_array().map(|cells| floats(cells)).unwrap_or_default())
            .collect();
    }
    Vec::new()
}

fn floats(values: &[Value]) -> Vec<f32> {
    values
        .iter()
        .filter_map(Value::as_f64)
        .map(|v| v as f32)
        .collect()
}
