//! HTTP calls to the Ollama backend.
//!
//! One `reqwest::Client` shared by every request; its connection pool is
//! the only cross-request shared resource and is safe for concurrent use.
//! Calls either buffer the whole body or hand back the open response for
//! incremental reads. Nothing here retries, and non-success bodies are
//! relayed upward without interpretation.

use std::time::Duration;

use ollagate_core::error::body_preview;
use ollagate_core::{GatewayError, Settings, settings::normalize_base_url};
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Backend call capability, injected into the shared state at startup.
#[derive(Debug, Clone)]
pub struct Upstream {
    client: Client,
    base_url: String,
}

impl Upstream {
    /// Build the shared client with a bounded pool and the configured
    /// total call timeout. The timeout bounds worst-case latency for long
    /// generations, including streaming reads.
    pub fn new(settings: &Settings) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .pool_max_idle_per_host(10)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| GatewayError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: normalize_base_url(&settings.backend_url),
        })
    }

    /// The configured backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET a backend endpoint and decode the fully buffered JSON body.
    pub async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, GatewayError> {
        debug!(path, "backend GET");
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(transport_error)?;
        decode(check_status(response).await?).await
    }

    /// POST JSON to a backend endpoint and decode the fully buffered body.
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, GatewayError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        debug!(path, "backend POST (buffered)");
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        decode(check_status(response).await?).await
    }

    /// POST JSON and return the open response so the caller can read the
    /// body incrementally.
    pub async fn post_stream<B>(&self, path: &str, body: &B) -> Result<reqwest::Response, GatewayError>
    where
        B: Serialize + ?Sized,
    {
        debug!(path, "backend POST (streaming)");
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        check_status(response).await
    }
}

async fn decode<R: DeserializeOwned>(response: reqwest::Response) -> Result<R, GatewayError> {
    let bytes = response.bytes().await.map_err(transport_error)?;
    serde_json::from_slice(&bytes).map_err(|e| {
        GatewayError::Internal(format!(
            "failed to decode backend response: {e}: {}",
            body_preview(&String::from_utf8_lossy(&bytes))
        ))
    })
}

/// Relay a non-success status upward as-is (status plus body preview).
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.bytes().await.unwrap_or_default();
    Err(GatewayError::upstream(
        status.as_u16(),
        &String::from_utf8_lossy(&body),
    ))
}

fn transport_error(err: reqwest::Error) -> GatewayError {
    GatewayError::UpstreamUnreachable(err.to_string())
}
