//! usergate - role-gated HTTP service with user registration

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::{Config, LoggingConfig};
use usergate_api::{AppState, create_router};
use usergate_auth::{AccessControl, CredentialStore, HashingParams, PasswordHasher, RouteRules};
use usergate_db::{Database, UserRepository};

/// usergate - HTTP Basic gated service with role-based routes
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "USERGATE_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "USERGATE_PORT")]
    port: Option<u16>,

    /// Database URL
    #[arg(long, env = "USERGATE_DATABASE_URL")]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(&args.config)?;
    if let Some(url) = args.database_url {
        config.database.url = url;
    }

    init_logging(&config.logging);

    info!("Starting usergate v{}", env!("CARGO_PKG_VERSION"));

    let metrics_handle = if config.metrics.enabled {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics enabled at /metrics");
        Some(Arc::new(handle))
    } else {
        None
    };

    // Create the data directory for file-backed databases
    if let Some(parent) = config::sqlite_file_path(&config.database.url)
        .and_then(|path| path.parent())
        .filter(|parent| !parent.as_os_str().is_empty())
    {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create data directory {:?}", parent))?;
    }

    let db = Database::new(&config.database.url, config.database.max_connections).await?;
    info!("Registered users: {}", db.count().await?);

    let params = HashingParams::from(&config.auth.hashing);
    let specs = config.auth.users.clone();

    // Hashing every configured password is CPU-bound
    let store = tokio::task::spawn_blocking(move || {
        let hasher = PasswordHasher::new(params)?;
        CredentialStore::from_specs(&specs, hasher)
    })
    .await
    .map_err(|e| anyhow::anyhow!("Task join error: {}", e))??;
    info!("Loaded {} credential(s) for Basic authentication", store.len());

    let access = Arc::new(AccessControl::new(store, RouteRules::default()));
    let hasher = Arc::new(PasswordHasher::new(params)?);
    let users: Arc<dyn UserRepository> = Arc::new(db.clone());

    let state = AppState::new(users, hasher, access);

    let app = create_router(state, metrics_handle).layer(TraceLayer::new_for_http());

    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind_addr, port))?;

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server stopped");
    Ok(())
}

/// Initialize logging; `RUST_LOG` takes precedence over the configured level
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Wait for Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
