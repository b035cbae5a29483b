//! uspshare-api - resource-sharing backend server
//!
//! Resolves the root folder, loads configuration, opens (and if needed
//! creates) the SQLite database, then serves the REST API.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use tracing::info;
use uspshare_api::{build_router, AppState};
use uspshare_common::api::{load_or_init_secret, TokenKeys};
use uspshare_common::config::{resolve_root_folder, AppConfig};
use uspshare_common::db::{Role, Store};

#[derive(Parser, Debug)]
#[command(name = "uspshare-api")]
#[command(about = "REST backend for the university resource-sharing platform")]
#[command(version)]
struct Args {
    /// Root folder holding uspshare.toml, the database and uploads
    #[arg(short, long)]
    root_folder: Option<String>,

    /// Listen address, overrides the configured one
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Grant the admin role to this account's email and exit
    #[arg(long, value_name = "EMAIL")]
    promote_admin: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting uspshare-api v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let root_folder = resolve_root_folder(args.root_folder.as_deref());
    info!("Root folder: {}", root_folder.display());

    let mut config = AppConfig::load(&root_folder).context("Failed to load configuration")?;
    if let Some(bind) = args.bind {
        config.bind = bind;
    }

    let store = Store::open(&config.database_path)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_path.display()))?;
    info!("✓ Database ready: {}", config.database_path.display());

    if let Some(email) = args.promote_admin {
        store.set_user_role(&email, Role::Admin).await?;
        info!("Granted admin role to {}", email);
        return Ok(());
    }

    let secret = load_or_init_secret(&store, config.jwt_secret.as_deref()).await?;
    let keys = TokenKeys::new(secret.as_bytes(), config.token_ttl_hours);

    let state = AppState::new(store, keys, &config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("uspshare-api listening on http://{}", config.bind);
    info!("Health check: http://{}/health", config.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
