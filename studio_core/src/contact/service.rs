use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use super::models::{ContactMessage, ContactSubmission};
use super::repository::{ContactRepository, InMemoryContactRepository};
use super::validation::SubmissionValidator;
use crate::config::ContactConfig;
use crate::error::Result;
use crate::models::{PageRequest, PagedResult};
use crate::validation::ValidationResult;

#[derive(Debug, Clone)]
pub enum SubmissionOutcome {
    Accepted(ContactMessage),
    Rejected(ValidationResult),
}

#[derive(Clone)]
pub struct ContactService {
    repository: Arc<dyn ContactRepository>,
    validator: SubmissionValidator,
    default_page_size: u32,
    max_page_size: u32,
}

impl ContactService {
    pub fn new(repository: Arc<dyn ContactRepository>, config: &ContactConfig) -> Self {
        Self {
            repository,
            validator: SubmissionValidator::new(config),
            default_page_size: config.default_page_size,
            max_page_size: config.max_page_size,
        }
    }

    pub fn in_memory(config: &ContactConfig) -> Self {
        Self::new(Arc::new(InMemoryContactRepository::new()), config)
    }

    pub fn is_persistent(&self) -> bool {
        self.repository.is_persistent()
    }

    pub async fn submit(&self, submission: &ContactSubmission) -> Result<SubmissionOutcome> {
        self.submit_at(submission, Utc::now()).await
    }

    /// Validation failures come back as `Rejected`; storage failures are errors.
    pub async fn submit_at(
        &self,
        submission: &ContactSubmission,
        now: DateTime<Utc>,
    ) -> Result<SubmissionOutcome> {
        let result = self.validator.validate(submission, now);
        if !result.is_valid {
            return Ok(SubmissionOutcome::Rejected(result));
        }

        let message = ContactMessage::from_submission(submission, now);
        self.repository.insert(&message).await.map_err(|e| {
            error!("Failed to store contact message {}: {}", message.id, e);
            e
        })?;

        info!("Contact message stored: id={}", message.id);
        Ok(SubmissionOutcome::Accepted(message))
    }

    pub fn page_request(&self, page: Option<i64>, page_size: Option<i64>) -> PageRequest {
        PageRequest::clamped(page, page_size, self.default_page_size, self.max_page_size)
    }

    /// Read path: a failing store yields an empty page rather than an error.
    pub async fn list(&self, page: Option<i64>, page_size: Option<i64>) -> PagedResult<ContactMessage> {
        let request = self.page_request(page, page_size);

        match self.repository.page(request).await {
            Ok(result) => result,
            Err(e) => {
                error!(
                    "Contact listing degraded to empty result: page={}, page_size={}, error={}",
                    request.page, request.page_size, e
                );
                PagedResult::empty(request)
            }
        }
    }

    pub async fn remove(&self, id: Uuid) -> Result<bool> {
        let removed = self.repository.delete(id).await?;
        if removed {
            info!("Contact message deleted: id={}", id);
        }
        Ok(removed)
    }

    pub async fn count(&self) -> Result<u64> {
        self.repository.count().await
    }
}
