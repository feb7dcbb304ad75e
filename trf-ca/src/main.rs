//! trf-ca - Chart Aggregator microservice
//!
//! Serves merged TikTok/streaming charts with remix category suggestions
//! over HTTP. Default address 127.0.0.1:5740.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trf_ca::config::{CaConfig, CONFIG_ENV_VAR, MODULE_NAME};
use trf_ca::models::ChartQuery;
use trf_ca::services::ChartService;
use trf_ca::AppState;
use trf_common::config::resolve_config_path;

/// Command-line arguments for trf-ca
#[derive(Parser, Debug)]
#[command(name = "trf-ca")]
#[command(about = "Chart aggregation microservice for TRF")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "TRF_CA_PORT")]
    port: Option<u16>,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref(), CONFIG_ENV_VAR, MODULE_NAME);
    let config = CaConfig::load(config_path.as_deref())
        .context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    config
                        .logging
                        .filter_directives(&["trf_ca", "trf_common", "tower_http"])
                        .into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting trf-ca v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_path {
        Some(path) => info!("Config: {}", path.display()),
        None => info!("Config: built-in defaults"),
    }

    let service = ChartService::from_config(&config).context("Failed to initialize chart service")?;
    let defaults = ChartQuery::new(&config.default_region, config.default_limit);
    let state = AppState::new(service, defaults);

    let app = trf_ca::build_router(state);

    let host: std::net::IpAddr = config
        .host
        .parse()
        .with_context(|| format!("Invalid host '{}'", config.host))?;
    let addr = SocketAddr::new(host, args.port.unwrap_or(config.port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
