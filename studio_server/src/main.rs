//! Main entry point for the studio site service binary

use anyhow::Result;
use std::net::SocketAddr;
use studio_core::{
    create_app, get_database_pool_with_config, run_migrations, run_server, AppConfig, AppState,
    DatabaseManager,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    info!("Configuration loaded successfully");
    info!("Server will bind to: {}", config.bind_address());
    info!("Database URL: {}", config.database.url);
    info!("Media manifest: {}", config.portfolio.manifest_path.display());

    let addr: SocketAddr = config.bind_address().parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address: {}", e))?;

    let mut state = AppState::from_config(config.clone())
        .map_err(|e| anyhow::anyhow!("Failed to initialize application state: {}", e))?;

    match initialize_database(&config).await {
        Ok(db_manager) => {
            info!("Database initialized successfully");
            state = state.with_database(db_manager);
        }
        Err(e) => {
            warn!("Failed to initialize database, contact messages will be kept in memory: {}", e);
        }
    }

    info!("App: {} v{}", state.app_name, state.version);
    info!(
        "Contact storage: {}",
        if state.contact.is_persistent() { "SQLite Database" } else { "In-Memory Store" }
    );

    let scheduler = state.scheduler().spawn();

    let app = create_app(state.clone());
    let served = run_server(app, addr).await;

    state.shutdown();
    if let Err(e) = scheduler.await {
        warn!("Warming scheduler ended abnormally: {}", e);
    }

    served?;
    info!("Server shutdown complete");
    Ok(())
}

async fn initialize_database(config: &AppConfig) -> Result<DatabaseManager> {
    let pool = get_database_pool_with_config(&config.database).await
        .map_err(|e| anyhow::anyhow!("Failed to create database pool: {}", e))?;

    run_migrations(pool.clone()).await
        .map_err(|e| anyhow::anyhow!("Failed to run database migrations: {}", e))?;

    let db_manager = DatabaseManager::new(pool);
    db_manager.health_check().await
        .map_err(|e| anyhow::anyhow!("Database health check failed: {}", e))?;

    Ok(db_manager)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            let default_level = if cfg!(debug_assertions) {
                "debug"
            } else {
                "info"
            };

            format!(
                "{}={},studio_core={},tower_http=debug",
                env!("CARGO_CRATE_NAME").replace('-', "_"),
                default_level,
                default_level
            ).into()
        });

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    let is_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    if is_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.pretty())
            .init();
    }
}
