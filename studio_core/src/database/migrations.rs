//! Schema versions, applied in order and recorded in `_migrations`.

use sqlx::SqlitePool;
use tracing::{error, info};

use crate::error::Result;

struct Migration {
    version: i64,
    name: &'static str,
    statements: &'static [&'static str],
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "create_contact_messages_table",
    statements: &[
        r#"
        CREATE TABLE contact_messages (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            message TEXT NOT NULL,
            submitted_at DATETIME NOT NULL
        )
        "#,
        "CREATE INDEX idx_contact_messages_submitted_at ON contact_messages(submitted_at DESC)",
    ],
}];

/// Brings the schema up to the latest version. Safe to call on every start.
pub async fn run_migrations(pool: SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(&pool)
    .await?;

    let current: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM _migrations")
        .fetch_one(&pool)
        .await?;

    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > current).collect();
    if pending.is_empty() {
        info!("Database schema is current (version {})", current);
        return Ok(());
    }

    for migration in pending {
        info!("Applying migration {}: {}", migration.version, migration.name);

        let mut tx = pool.begin().await?;
        for statement in migration.statements {
            if let Err(e) = sqlx::query(statement).execute(&mut *tx).await {
                error!("Migration {} failed: {}", migration.version, e);
                return Err(e.into());
            }
        }

        sqlx::query("INSERT INTO _migrations (version, name) VALUES (?, ?)")
            .bind(migration.version)
            .bind(migration.name)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connection::get_database_pool;
    use tempfile::NamedTempFile;

    async fn count(pool: &SqlitePool, sql: &str) -> i64 {
        sqlx::query_scalar(sql).fetch_one(pool).await.unwrap()
    }

    #[tokio::test]
    async fn test_migrations_create_contact_table() {
        let temp_file = NamedTempFile::new().unwrap();
        let database_url = format!("sqlite:{}", temp_file.path().display());
        let pool = get_database_pool(&database_url).await.unwrap();

        run_migrations(pool.clone()).await.unwrap();

        let tables = count(
            &pool,
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'contact_messages'",
        )
        .await;
        assert_eq!(tables, 1);
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let temp_file = NamedTempFile::new().unwrap();
        let database_url = format!("sqlite:{}", temp_file.path().display());
        let pool = get_database_pool(&database_url).await.unwrap();

        run_migrations(pool.clone()).await.unwrap();
        run_migrations(pool.clone()).await.unwrap();

        assert_eq!(count(&pool, "SELECT COUNT(*) FROM _migrations").await, MIGRATIONS.len() as i64);
    }
}
