//! Gateway failure taxonomy.
//!
//! Every failure the translation layer can surface is one of these
//! variants. Caller mistakes map to 4xx, backend and transport failures
//! to 502; nothing here is ever retried automatically.

use thiserror::Error;

/// Upstream bodies relayed inside error messages are truncated to this
/// many bytes.
const BODY_PREVIEW_LIMIT: usize = 512;

/// Errors surfaced by the translation layer.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The inbound body was not valid JSON.
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// An embedding request arrived without an `input` field.
    #[error("Missing required field: input")]
    MissingInput,

    /// Transport-level failure reaching the backend (connection refused,
    /// timeout, DNS).
    #[error("Backend unreachable: {0}")]
    UpstreamUnreachable(String),

    /// The backend answered with a non-success status. The body is a
    /// truncated preview; it is relayed, not interpreted.
    #[error("Backend returned status {status}: {body}")]
    UpstreamError { status: u16, body: String },

    /// A single line of a streaming backend response failed to decode.
    /// Recovered locally by skipping the line; never aborts a stream.
    #[error("Undecodable stream line: {0}")]
    StreamDecodeGlitch(String),

    /// Anything unexpected during translation.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Build an [`GatewayError::UpstreamError`] with a truncated body preview.
    #[must_use]
    pub fn upstream(status: u16, body: &str) -> Self {
        Self::UpstreamError {
            status,
            body: body_preview(body),
        }
    }

    /// HTTP status code this error maps to at the front boundary.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::MalformedRequest(_) | Self::MissingInput => 400,
            Self::UpstreamUnreachable(_)
            | Self::UpstreamError { .. }
            | Self::StreamDecodeGlitch(_) => 502,
            Self::Internal(_) => 500,
        }
    }

    /// True for errors caused by the caller rather than the backend.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::MalformedRequest(_) | Self::MissingInput)
    }
}

/// Truncate an upstream body for inclusion in an error message.
#[must_use]
pub fn body_preview(body: &str) -> String {
    if body.len() <= BODY_PREVIEW_LIMIT {
        return body.to_string();
    }
    // Truncate on a char boundary.
    let mut end = BODY_PREVIEW_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_400() {
        assert_eq!(GatewayError::MissingInput.status_code(), 400);
        assert_eq!(
            GatewayError::MalformedRequest("nope".into()).status_code(),
            400
        );
    }

    #[test]
    fn backend_errors_map_to_502() {
        assert_eq!(GatewayError::upstream(500, "boom").status_code(), 502);
        assert_eq!(
            GatewayError::UpstreamUnreachable("refused".into()).status_code(),
            502
        );
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(2048);
        let preview = body_preview(&body);
        assert!(preview.len() < body.len());
        assert!(preview.ends_with('…'));
    }

    #[test]
    fn short_bodies_pass_through() {
        assert_eq!(body_preview("small"), "small");
    }
}
