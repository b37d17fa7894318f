//! `rosterd` — the roster group-membership server binary.
//!
//! Usage:
//!   rosterd -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/roster/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod config;
mod jwt;
mod routes;

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use config::ServerConfig;
use roster_groups::{AppState, GroupService, SqlUserDirectory};

/// Roster server.
#[derive(Parser, Debug)]
#[command(name = "rosterd", about = "Roster group-membership server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address (overrides default 0.0.0.0:8080).
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Load and verify server configuration.
    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;
    server_config.verify()?;

    // Initialize storage.
    let data_dir = std::path::PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let sql: Arc<dyn roster_sql::SQLStore> = Arc::new(
        roster_sql::SqliteStore::open(&server_config.sqlite_path())
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );

    // Wire the groups module: directory collaborator + service.
    let directory = Arc::new(SqlUserDirectory::new(Arc::clone(&sql)));
    let service = Arc::new(
        GroupService::new(Arc::clone(&sql), directory)
            .map_err(|e| anyhow::anyhow!("failed to initialize groups service: {}", e))?,
    );
    info!("Groups service initialized");

    let auth: Arc<dyn roster_core::Authenticator> =
        Arc::new(jwt::JwtAuthenticator::new(&server_config.jwt.secret));

    let state = AppState { service, auth };
    let app = routes::build_router(roster_groups::api::routes(state));

    // Start server.
    let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
    info!("roster server listening on {}", cli.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
