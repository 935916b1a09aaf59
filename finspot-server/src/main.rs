//! finspot-server - sighting tracker HTTP service
//!
//! Configuration priority: command line / environment, then `config.toml`,
//! then compiled defaults.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use finspot_common::config::{find_config_file, ConfigOverrides, ServerConfig, TomlConfig};
use finspot_common::db::init_database;
use finspot_server::{build_router, AppState};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for finspot-server
#[derive(Parser, Debug)]
#[command(name = "finspot-server")]
#[command(about = "Sighting tracker: scoring, achievements and leaderboards")]
#[command(version)]
struct Args {
    /// Folder holding finspot.db
    #[arg(short, long, env = "FINSPOT_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Explicit config file (default: ~/.config/finspot/config.toml, /etc/finspot/config.toml)
    #[arg(short, long, env = "FINSPOT_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(short, long, env = "FINSPOT_BIND_ADDRESS")]
    bind_address: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "FINSPOT_PORT")]
    port: Option<u16>,

    /// Default log filter when RUST_LOG is unset
    #[arg(short, long, env = "FINSPOT_LOG_LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Tracing is not up yet; keep the outcome and log it afterwards
    let config_path = args.config.clone().or_else(find_config_file);
    let toml_result = config_path.as_deref().map(|path| (path, TomlConfig::load(path)));
    let toml_config = match &toml_result {
        Some((_, Ok(config))) => config.clone(),
        _ => TomlConfig::default(),
    };

    let config = ServerConfig::resolve(
        ConfigOverrides {
            root_folder: args.root_folder,
            bind_address: args.bind_address,
            port: args.port,
            log_level: args.log_level,
        },
        &toml_config,
    );

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("finspot_server={0},finspot_common={0},tower_http=info", config.log_level)
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting finspot-server v{}", env!("CARGO_PKG_VERSION"));
    match &toml_result {
        Some((path, Ok(_))) => info!("Loaded config: {}", path.display()),
        Some((_, Err(e))) => warn!("{} (using defaults)", e),
        None => info!("No config file found, using defaults"),
    }
    info!("Root folder: {}", config.root_folder.display());

    config
        .ensure_root_folder()
        .context("Failed to initialize root folder")?;

    let db_path = config.database_path();
    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    info!("✓ Database ready: {}", db_path.display());

    let app = build_router(AppState::new(pool));

    let addr = config.listen_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("finspot-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
