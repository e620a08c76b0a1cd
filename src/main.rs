//! Agent Memo - memoized agent metadata lookups
//!
//! HTTP front end over the cached agent and user directory.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_memo::agents::{AgentDirectory, InMemoryDirectory};
use agent_memo::api::{create_router, AppState};
use agent_memo::thumbnails::HttpImageGenerator;
use agent_memo::Config;

/// Main entry point for the Agent Memo server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load and validate configuration from environment variables
/// 3. Load the agent directory (seed file or empty)
/// 4. Create the cached lookup service and, with an API key, the thumbnail service
/// 5. Start HTTP server on configured port
/// 6. Handle graceful shutdown on SIGINT/SIGTERM, cancelling pending retries
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agent_memo=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Agent Memo server");

    let config = Config::from_env();
    config.validate().context("invalid configuration")?;
    info!(
        "Configuration loaded: agent_cache={}, user_cache={}, port={}, retry_attempts={}",
        config.agent_cache_capacity,
        config.user_cache_capacity,
        config.server_port,
        config.retry_max_attempts
    );

    let directory: Arc<dyn AgentDirectory> = match &config.agent_seed_file {
        Some(path) => Arc::new(
            InMemoryDirectory::from_json_file(path)
                .await
                .context("failed to load agent seed file")?,
        ),
        None => {
            info!("No AGENT_SEED_FILE set, starting with an empty directory");
            Arc::new(InMemoryDirectory::new())
        }
    };

    let shutdown = CancellationToken::new();
    let mut state = AppState::from_config(&config, directory)?.with_shutdown(shutdown.clone());
    info!("Agent info caches initialized");

    match HttpImageGenerator::from_config(&config)? {
        Some(generator) => {
            state = state.with_thumbnails(&config, Arc::new(generator))?;
            info!("Thumbnail generation enabled via {}", config.image_api_url);
        }
        None => warn!("No IMAGE_API_KEY set, POST /thumbnails will return 503"),
    }

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then cancels `shutdown`.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    shutdown.cancel();
}
