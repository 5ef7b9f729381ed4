use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dispatchr::cli::{self, Cli};
use dispatchr::config::Config;
use dispatchr::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config)?;

    // --log-level wins over RUST_LOG, which wins over the config file
    let filter = match &cli.log_level {
        Some(level) => tracing_subscriber::EnvFilter::new(level),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    if cli.command.is_some() {
        return cli::run_command(&cli, &config).await;
    }

    tracing::info!("Starting dispatchr v{}", env!("CARGO_PKG_VERSION"));

    std::fs::create_dir_all(&config.server.data_dir).with_context(|| {
        format!(
            "Failed to create data directory: {}",
            config.server.data_dir.display()
        )
    })?;

    let db = dispatchr::db::init(&config.server.data_dir).await?;

    let state = Arc::new(AppState::new(config.clone(), db));
    let api_router = dispatchr::api::create_router(state);

    // Dashboard bundle, if configured, is served for every non-API path
    let app = match &config.server.static_dir {
        Some(static_dir) => {
            let index_file = static_dir.join("index.html");
            let serve_static =
                ServeDir::new(static_dir).not_found_service(ServeFile::new(&index_file));
            tracing::info!("Serving dashboard from {}", static_dir.display());
            api_router.fallback_service(serve_static)
        }
        None => api_router,
    };

    let api_addr = format!("{}:{}", config.server.host, config.server.api_port);
    let listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("Failed to bind {}", api_addr))?;

    tracing::info!("API server listening on http://{}", api_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
