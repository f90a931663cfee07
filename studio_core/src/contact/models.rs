use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A stored contact-form message. Never mutated after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
}

impl ContactMessage {
    pub fn from_submission(submission: &ContactSubmission, submitted_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: submission.name.trim().to_string(),
            email: submission.email.trim().to_string(),
            message: submission.message.trim().to_string(),
            submitted_at,
        }
    }
}

/// The public form post. `website` is the honeypot and `form_rendered_at`
/// the epoch-millisecond timestamp written into the form when it was served.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Please enter your name (up to 200 characters)"))]
    pub name: String,

    #[serde(default)]
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 5000, message = "Please enter a message (up to 5000 characters)"))]
    pub message: String,

    #[serde(default)]
    pub website: Option<String>,

    #[serde(default)]
    pub form_rendered_at: Option<String>,
}

impl ContactSubmission {
    /// Copy with surrounding whitespace removed from the user-facing fields.
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            message: self.message.trim().to_string(),
            website: self.website.clone(),
            form_rendered_at: self.form_rendered_at.clone(),
        }
    }

    pub fn rendered_at_millis(&self) -> Option<i64> {
        self.form_rendered_at
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .and_then(|raw| raw.parse::<i64>().ok())
    }

    pub fn honeypot_filled(&self) -> bool {
        self.website
            .as_deref()
            .map(|value| !value.trim().is_empty())
            .unwrap_or(false)
    }
}
