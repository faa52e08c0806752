//! Axum HTTP server for the gateway.
//!
//! `serve()` runs the gateway with a pre-bound listener until the
//! cancellation token is triggered; `build_router()` is exposed separately
//! so tests can drive the exact production router without a socket.

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use ollagate_core::Settings;

use crate::handlers::{self, GatewayState};
use crate::upstream::Upstream;

/// Build the gateway router against the configured backend.
pub fn build_router(settings: &Settings) -> anyhow::Result<Router> {
    let upstream = Upstream::new(settings)?;
    let state = GatewayState { upstream };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Ok(Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/v1/models", get(handlers::list_models))
        .route("/v1/chat/completions", post(handlers::chat_completions))
        .route("/v1/completions", post(handlers::completions))
        .route("/v1/embeddings", post(handlers::embeddings))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

/// Start the gateway with a pre-bound listener.
///
/// Runs until `cancel` is triggered, then shuts down gracefully.
pub async fn serve(
    listener: TcpListener,
    settings: &Settings,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    let app = build_router(settings)?;

    info!("Gateway listening on {addr}");
    info!("Translating for backend at {}", settings.backend_url);

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await?;

    info!("Gateway shut down");
    Ok(())
}
