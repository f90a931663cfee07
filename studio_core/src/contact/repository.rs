use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::sync::Arc;
use uuid::Uuid;

use super::models::ContactMessage;
use crate::error::{AppError, Result};
use crate::models::{PageRequest, PagedResult};

#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn insert(&self, message: &ContactMessage) -> Result<()>;

    /// Newest first; ties broken by id so paging is stable.
    async fn page(&self, request: PageRequest) -> Result<PagedResult<ContactMessage>>;

    async fn delete(&self, id: Uuid) -> Result<bool>;

    async fn count(&self) -> Result<u64>;

    fn is_persistent(&self) -> bool;
}

#[derive(Clone)]
pub struct SqliteContactRepository {
    pool: SqlitePool,
}

impl SqliteContactRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_row(row: &SqliteRow) -> Result<ContactMessage> {
        let id: String = row.try_get("id").map_err(AppError::from)?;
        let id = Uuid::parse_str(&id)
            .map_err(|e| AppError::Database(format!("Invalid message id {}: {}", id, e)))?;

        Ok(ContactMessage {
            id,
            name: row.try_get("name").unwrap_or_default(),
            email: row.try_get("email").unwrap_or_default(),
            message: row.try_get("message").unwrap_or_default(),
            submitted_at: row.try_get::<DateTime<Utc>, _>("submitted_at").map_err(AppError::from)?,
        })
    }
}

#[async_trait]
impl ContactRepository for SqliteContactRepository {
    async fn insert(&self, message: &ContactMessage) -> Result<()> {
        sqlx::query(r#"
            INSERT INTO contact_messages (id, name, email, message, submitted_at)
            VALUES (?, ?, ?, ?, ?)
        "#)
        .bind(message.id.to_string())
        .bind(&message.name)
        .bind(&message.email)
        .bind(&message.message)
        .bind(message.submitted_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Contact message insert failed: id={}, error={}", message.id, e);
            AppError::from(e)
        })?;

        Ok(())
    }

    async fn page(&self, request: PageRequest) -> Result<PagedResult<ContactMessage>> {
        let total = self.count().await?;

        let rows = sqlx::query(r#"
            SELECT id, name, email, message, submitted_at
            FROM contact_messages
            ORDER BY submitted_at DESC, id DESC
            LIMIT ? OFFSET ?
        "#)
        .bind(request.limit() as i64)
        .bind(request.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(
                "Contact page query failed: page={}, page_size={}, error={}",
                request.page,
                request.page_size,
                e
            );
            AppError::from(e)
        })?;

        let items = rows
            .iter()
            .map(Self::map_row)
            .collect::<Result<Vec<_>>>()?;

        Ok(PagedResult::new(items, total, request))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM contact_messages WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<u64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM contact_messages")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from)?;

        let count: i64 = row.try_get("count").unwrap_or(0);
        Ok(count.max(0) as u64)
    }

    fn is_persistent(&self) -> bool {
        true
    }
}

/// Process-local store used when no database is available.
#[derive(Clone, Default)]
pub struct InMemoryContactRepository {
    messages: Arc<RwLock<Vec<ContactMessage>>>,
}

impl InMemoryContactRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactRepository for InMemoryContactRepository {
    async fn insert(&self, message: &ContactMessage) -> Result<()> {
        let mut messages = self.messages.write();
        if messages.iter().any(|m| m.id == message.id) {
            return Err(AppError::BadRequest("Message already exists".to_string()));
        }
        messages.push(message.clone());
        Ok(())
    }

    async fn page(&self, request: PageRequest) -> Result<PagedResult<ContactMessage>> {
        let mut messages = self.messages.read().clone();
        messages.sort_by(|a, b| {
            b.submitted_at
                .cmp(&a.submitted_at)
                .then_with(|| b.id.to_string().cmp(&a.id.to_string()))
        });

        Ok(request.slice(&messages))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut messages = self.messages.write();
        let before = messages.len();
        messages.retain(|m| m.id != id);
        Ok(messages.len() < before)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.messages.read().len() as u64)
    }

    fn is_persistent(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{get_database_pool, run_migrations};
    use chrono::Duration;
    use tempfile::NamedTempFile;

    fn message_at(name: &str, submitted_at: DateTime<Utc>) -> ContactMessage {
        ContactMessage {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            message: format!("Hello from {}", name),
            submitted_at,
        }
    }

    async fn sqlite_repository() -> (SqliteContactRepository, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let database_url = format!("sqlite:{}", temp_file.path().display());
        let pool = get_database_pool(&database_url).await.unwrap();
        run_migrations(pool.clone()).await.unwrap();
        (SqliteContactRepository::new(pool), temp_file)
    }

    async fn exercise_repository(repository: &dyn ContactRepository) {
        let base = Utc::now() - Duration::hours(1);
        let names = ["Ada", "Grace", "Hedy", "Joan", "Katherine"];
        for (i, name) in names.iter().enumerate() {
            repository
                .insert(&message_at(name, base + Duration::minutes(i as i64)))
                .await
                .unwrap();
        }

        assert_eq!(repository.count().await.unwrap(), 5);

        let first = repository.page(PageRequest { page: 1, page_size: 2 }).await.unwrap();
        let names_on_page: Vec<&str> = first.items.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names_on_page, vec!["Katherine", "Joan"]);
        assert_eq!(first.total_items, 5);
        assert_eq!(first.total_pages, 3);
        assert!(first.has_next_page);

        let last = repository.page(PageRequest { page: 3, page_size: 2 }).await.unwrap();
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.items[0].name, "Ada");

        let beyond = repository.page(PageRequest { page: 9, page_size: 2 }).await.unwrap();
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total_items, 5);

        let doomed = last.items[0].id;
        assert!(repository.delete(doomed).await.unwrap());
        assert!(!repository.delete(doomed).await.unwrap());
        assert_eq!(repository.count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_sqlite_repository() {
        let (repository, _guard) = sqlite_repository().await;
        assert!(repository.is_persistent());
        exercise_repository(&repository).await;
    }

    #[tokio::test]
    async fn test_in_memory_repository() {
        let repository = InMemoryContactRepository::new();
        assert!(!repository.is_persistent());
        exercise_repository(&repository).await;
    }

    #[tokio::test]
    async fn test_sqlite_round_trips_fields() {
        let (repository, _guard) = sqlite_repository().await;
        let message = message_at("Ada", Utc::now());
        repository.insert(&message).await.unwrap();

        let page = repository.page(PageRequest { page: 1, page_size: 10 }).await.unwrap();
        let stored = &page.items[0];
        assert_eq!(stored.id, message.id);
        assert_eq!(stored.email, message.email);
        assert_eq!(stored.submitted_at.timestamp_millis(), message.submitted_at.timestamp_millis());
    }
}
