//! `orgsvcd`: the organization service binary.
//!
//! Usage:
//!   orgsvcd -c <context-name-or-path> [--listen <addr>] [--seed]
//!
//! The context name resolves to `/etc/orgsvc/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod auth_middleware;
mod bootstrap;
mod config;
mod request_log;
mod routes;

use std::sync::Arc;

use clap::Parser;
use orgsvc_core::{Authenticator, Module};
use orgsvc_kv::{KVStore, RedbStore};
use orgsvc_store::WriteMode;
use tracing::info;

use auth::service::AuthConfig;
use auth::AuthModule;
use config::ServerConfig;
use org::service::OrgService;
use org::OrgModule;

/// Organization service.
#[derive(Parser, Debug)]
#[command(name = "orgsvcd", about = "Organization service")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address (overrides default 0.0.0.0:8080).
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,

    /// Insert demo users and organizations into an empty store.
    #[arg(long = "seed")]
    seed: bool,
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

    // Load server configuration.
    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;

    // Verify configuration is valid.
    bootstrap::verify_config(&server_config)?;

    let core_config = server_config.service_config(&cli.listen);
    if let Some(data_dir) = &core_config.data_dir {
        std::fs::create_dir_all(data_dir)?;
    }

    // Initialize the embedded store (shared by all modules).
    let db_path = core_config.resolve_db_path();
    let kv: Arc<dyn KVStore> = Arc::new(
        RedbStore::open(&db_path)
            .map_err(|e| anyhow::anyhow!("failed to open KV store: {}", e))?,
    );
    info!("KV store opened at {}", db_path.display());

    let auth_module = AuthModule::new(
        Arc::clone(&kv),
        AuthConfig::new(core_config.jwt_secret.clone(), core_config.jwt_expire_secs),
    );
    info!("Auth module initialized");

    let mode = if core_config.optimistic {
        WriteMode::Optimistic
    } else {
        WriteMode::LastWriteWins
    };
    let org_module = OrgModule::new(OrgService::new(Arc::clone(&kv), mode));
    info!("Org module initialized ({:?} patch writes)", mode);

    if cli.seed {
        bootstrap::seed(auth_module.service(), org_module.service())?;
    }

    let authenticator: Arc<dyn Authenticator> = auth_module.service().clone();
    let modules: [&dyn Module; 2] = [&auth_module, &org_module];
    let app = routes::build_router(authenticator, &modules);

    // Start server.
    let listener = tokio::net::TcpListener::bind(&core_config.listen).await?;
    info!("orgsvcd listening on {}", core_config.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
