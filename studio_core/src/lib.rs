//! Core library for the studio site service: contact form, portfolio gallery
//! and image cache warming, plus the HTTP routes that expose them.

pub mod cache;
pub mod config;
pub mod contact;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod portfolio;
pub mod validation;
pub mod warming;

pub use cache::{CacheStats, EntryOptions, TtlCache};
pub use config::AppConfig;
pub use contact::{
    ContactMessage, ContactRepository, ContactService, ContactSubmission, InMemoryContactRepository,
    SqliteContactRepository,
};
pub use database::{get_database_pool, get_database_pool_with_config, run_migrations, DatabaseManager};
pub use error::{AppError, Result};
pub use handlers::routes::create_routes;
pub use models::{PageRequest, PagedResult};
pub use portfolio::{ManifestMediaSource, MediaSource, PortfolioService, StaticMediaSource};
pub use validation::ValidationResult;
pub use warming::{CancelHandle, HttpToucher, ImageToucher, ImageWarmer, WarmingScheduler, WarmingService};

use axum::Router;
use chrono::{DateTime, Utc};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tower_http::timeout::TimeoutLayer;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub app_name: String,
    pub version: String,
    pub started_at: DateTime<Utc>,
    pub config: Arc<AppConfig>,
    pub db_manager: Option<DatabaseManager>,
    pub contact: ContactService,
    pub portfolio: PortfolioService,
    pub warming: WarmingService,
}

impl AppState {
    /// State with an in-memory contact store. Use `with_database` to persist.
    pub fn new(config: AppConfig, media_source: Arc<dyn MediaSource>, toucher: Arc<dyn ImageToucher>) -> Self {
        let cache = TtlCache::new(&config.cache);
        let portfolio = PortfolioService::new(media_source, cache, &config.cache, &config.portfolio);
        let warmer = ImageWarmer::new(toucher, &config.warming);
        let warming = WarmingService::new(portfolio.clone(), warmer, CancelHandle::new());

        Self {
            app_name: "Studio Site Service".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: Utc::now(),
            contact: ContactService::in_memory(&config.contact),
            config: Arc::new(config),
            db_manager: None,
            portfolio,
            warming,
        }
    }

    /// Manifest-backed media and real HTTP warming, as configured.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let source = Arc::new(ManifestMediaSource::new(config.portfolio.manifest_path.clone()));
        let toucher = Arc::new(HttpToucher::new(&config.warming)?);
        Ok(Self::new(config, source, toucher))
    }

    pub fn with_database(mut self, db_manager: DatabaseManager) -> Self {
        let repository = Arc::new(SqliteContactRepository::new(db_manager.pool().clone()));
        self.contact = ContactService::new(repository, &self.config.contact);
        self.db_manager = Some(db_manager);
        self
    }

    pub fn scheduler(&self) -> WarmingScheduler {
        WarmingScheduler::new(self.warming.clone(), &self.config.warming)
    }

    /// Stops the scheduler and any warming run in progress.
    pub fn shutdown(&self) {
        self.warming.cancel_handle().cancel();
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = Arc::clone(&state.config);

    Router::new()
        .merge(create_routes())
        .layer(TimeoutLayer::new(Duration::from_secs(config.server.request_timeout_seconds)))
        .layer(middleware::cors_layer(&config.cors))
        .layer(middleware::logging_layer())
        .with_state(state)
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<()> {
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
