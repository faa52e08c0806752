//! Gateway entry point - the composition root.
//!
//! Configuration comes from the environment (see
//! [`ollagate_core::Settings::from_env`]) with command-line flags layered
//! on top. Everything else (routing, translation, the upstream client)
//! is wired inside `ollagate-gateway`.

use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ollagate_core::Settings;

/// OpenAI-compatible gateway for a local Ollama backend.
#[derive(Debug, Parser)]
#[command(name = "ollagate", version, about)]
struct Cli {
    /// Address to listen on (default 127.0.0.1:11435).
    #[arg(long)]
    listen: Option<String>,

    /// Base URL of the Ollama backend (default http://127.0.0.1:11434).
    #[arg(long)]
    backend: Option<String>,

    /// Total per-call timeout for backend requests, in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,
}

impl Cli {
    /// Layer command-line flags over environment-derived settings.
    fn into_settings(self) -> Settings {
        let mut settings = Settings::from_env();
        if let Some(listen) = self.listen {
            settings.listen = listen;
        }
        if let Some(backend) = self.backend {
            settings.set_backend_url(&backend);
        }
        if let Some(timeout_secs) = self.timeout_secs {
            settings.timeout_secs = timeout_secs;
        }
        if self.debug {
            settings.debug = true;
        }
        settings
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before anything reads them
    dotenvy::dotenv().ok();

    let settings = Cli::parse().into_settings();

    let default_filter = if settings.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let listener = TcpListener::bind(&settings.listen).await?;

    // Ctrl+C trips the token; serve() then drains in-flight requests.
    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
            shutdown.cancel();
        }
    });

    ollagate_gateway::serve(listener, &settings, cancel).await
}
