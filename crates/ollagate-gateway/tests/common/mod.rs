//! Shared helpers for gateway integration tests.

use axum::Router;
use ollagate_core::Settings;

/// Settings pointing at the given backend, with a short timeout so
/// failure tests stay fast.
pub fn test_settings(backend: &str) -> Settings {
    Settings {
        listen: "127.0.0.1:0".to_string(),
        backend_url: backend.to_string(),
        timeout_secs: 5,
        debug: false,
    }
}

/// Serve a mock backend router on an ephemeral port and return its base
/// URL. The server task lives until the test process exits.
pub async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}
