//! inventory-api - HTTP server for the instrument inventory
//!
//! Serves cities, categories and instruments over a JSON API, plus JSON
//! and CSV exports. Settings come from command-line arguments, environment
//! variables and an optional TOML file, in that order of priority.

use anyhow::{Context, Result};
use clap::Parser;
use inventory_common::api::auth::AdminCredentials;
use inventory_common::config::{resolve_database_path, FileConfig, DB_FILE_ENV};
use inventory_common::Store;
use inventory_api::{build_router, cors_layer, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_BIND: &str = "0.0.0.0";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

#[derive(Parser, Debug)]
#[command(name = "inventory-api")]
#[command(about = "Instrument inventory HTTP server")]
#[command(version)]
struct Args {
    /// SQLite database file (also read from DB_FILE)
    #[arg(long)]
    db_file: Option<PathBuf>,

    /// Port to listen on [default: 3001]
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Address to bind [default: 0.0.0.0]
    #[arg(long)]
    bind: Option<String>,

    /// Origin allowed by CORS [default: http://localhost:5173]
    #[arg(long, env = "CORS_ORIGIN")]
    cors_origin: Option<String>,

    /// Admin login for mutating requests
    #[arg(long, env = "ADMIN_LOGIN")]
    admin_login: Option<String>,

    /// Admin password for mutating requests
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "inventory_api=info,inventory_common=info,tower_http=info".into()
            }),
        )
        .init();

    // Build identification first, before any database delay
    info!(
        "Starting inventory-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let file_config =
        FileConfig::load(args.config.as_deref()).context("Failed to load config file")?;

    let db_path = resolve_database_path(args.db_file.as_deref(), DB_FILE_ENV, &file_config);
    info!("Database path: {}", db_path.display());

    let store = Store::open(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    let admin = match (args.admin_login.as_deref(), args.admin_password.as_deref()) {
        (Some(_), _) | (_, Some(_)) => {
            AdminCredentials::from_parts(args.admin_login.as_deref(), args.admin_password.as_deref())
        }
        _ => file_config.admin_credentials(),
    };
    match &admin {
        Some(admin) => info!("Authorization enabled for admin '{}'", admin.login()),
        None => info!("Authorization disabled (admin login or password not set)"),
    }

    let cors_origin = args
        .cors_origin
        .or(file_config.cors_origin)
        .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string());

    let app = build_router(AppState::new(store.clone(), admin))
        .layer(cors_layer(&cors_origin)?)
        .layer(TraceLayer::new_for_http());

    let port = args.port.or(file_config.port).unwrap_or(DEFAULT_PORT);
    let bind = args
        .bind
        .or(file_config.bind)
        .unwrap_or_else(|| DEFAULT_BIND.to_string());
    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind, port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("inventory-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);
    info!("CORS origin: {}", cors_origin);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    store.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
