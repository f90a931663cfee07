use sqlx::{SqlitePool, sqlite::SqlitePoolOptions, Row};
use std::time::Duration;
use tracing::{info, error};
use crate::config::DatabaseConfig;
use crate::error::{AppError, Result};

#[derive(Clone)]
pub struct DatabaseManager {
    pool: SqlitePool,
}

impl DatabaseManager {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let row = sqlx::query("SELECT 1 as test")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database health check failed: {}", e);
                AppError::from(e)
            })?;

        let test_value: i32 = row.try_get("test")
            .map_err(AppError::from)?;

        if test_value == 1 {
            Ok(())
        } else {
            Err(AppError::Database("Unexpected health check result".to_string()))
        }
    }

    pub async fn get_stats(&self) -> Result<DatabaseStats> {
        let row = sqlx::query(r#"
            SELECT
                (SELECT COUNT(*) FROM contact_messages) as message_count,
                (SELECT page_count * page_size FROM pragma_page_count(), pragma_page_size()) as db_size
        "#)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(DatabaseStats {
            message_count: row.try_get("message_count").unwrap_or(0),
            database_size_bytes: row.try_get("db_size").unwrap_or(0),
            connection_pool_size: self.pool.size() as i64,
            idle_connections: self.pool.num_idle() as i64,
        })
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct DatabaseStats {
    pub message_count: i64,
    pub database_size_bytes: i64,
    pub connection_pool_size: i64,
    pub idle_connections: i64,
}

pub async fn get_database_pool(database_url: &str) -> Result<SqlitePool> {
    let config = DatabaseConfig {
        url: database_url.to_string(),
        ..DatabaseConfig::default()
    };
    get_database_pool_with_config(&config).await
}

pub async fn get_database_pool_with_config(config: &DatabaseConfig) -> Result<SqlitePool> {
    info!("Connecting to database: {}", config.url);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections.min(config.max_connections))
        .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(1800))
        .test_before_acquire(true)
        .connect(&config.url)
        .await
        .map_err(|e| {
            error!("Failed to create database pool: {}", e);
            AppError::from(e)
        })?;

    for pragma in [
        "PRAGMA journal_mode = WAL",
        "PRAGMA synchronous = NORMAL",
        "PRAGMA busy_timeout = 30000",
    ] {
        sqlx::query(pragma)
            .execute(&pool)
            .await
            .map_err(AppError::from)?;
    }

    info!("Database connection pool created successfully");
    Ok(pool)
}
