//! Contact-form checks: field rules plus the honeypot and time trap.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use super::models::ContactSubmission;
use crate::config::{ContactConfig, MAX_FORM_AGE_LIMIT_SECONDS};
use crate::validation::{self, Validatable, ValidationResult};

/// Shown for every anti-automation rejection so bots learn nothing.
pub const GENERIC_REJECTION: &str = "There was a problem with your submission.";

#[derive(Debug, Clone)]
pub struct SubmissionValidator {
    min_fill: Duration,
    max_age: Duration,
}

impl Default for SubmissionValidator {
    fn default() -> Self {
        Self::new(&ContactConfig::default())
    }
}

impl SubmissionValidator {
    pub fn new(config: &ContactConfig) -> Self {
        Self {
            min_fill: Duration::seconds(config.min_fill_seconds.min(MAX_FORM_AGE_LIMIT_SECONDS) as i64),
            max_age: Duration::seconds(config.max_form_age_seconds.min(MAX_FORM_AGE_LIMIT_SECONDS) as i64),
        }
    }

    pub fn validate(&self, submission: &ContactSubmission, now: DateTime<Utc>) -> ValidationResult {
        let mut result = ValidationResult::success();

        if submission.honeypot_filled() {
            debug!("Contact submission rejected: honeypot filled");
            result.add_form_error(GENERIC_REJECTION);
            return result;
        }

        if !self.timing_plausible(submission, now) {
            result.add_form_error(GENERIC_REJECTION);
            return result;
        }

        let trimmed = submission.trimmed();
        result.merge(trimmed.validate_comprehensive());

        if let Err(error) = validation::validate_email(&trimmed.email) {
            result.add_error("email", &error.message.unwrap_or_default());
        }

        result
    }

    /// Render-to-submit delta must fall inside `[min_fill, max_age]`.
    fn timing_plausible(&self, submission: &ContactSubmission, now: DateTime<Utc>) -> bool {
        let Some(rendered_ms) = submission.rendered_at_millis() else {
            debug!("Contact submission rejected: missing render timestamp");
            return false;
        };

        let delta_ms = now.timestamp_millis().saturating_sub(rendered_ms);
        if delta_ms < self.min_fill.num_milliseconds() {
            debug!("Contact submission rejected: filled in {} ms", delta_ms);
            return false;
        }
        if delta_ms > self.max_age.num_milliseconds() {
            debug!("Contact submission rejected: form is {} s old", delta_ms / 1000);
            return false;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::FORM_ERROR_KEY;

    fn submission_rendered(now: DateTime<Utc>, delta_ms: i64) -> ContactSubmission {
        ContactSubmission {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            message: "I'd like to book a portrait session.".to_string(),
            website: None,
            form_rendered_at: Some((now.timestamp_millis() - delta_ms).to_string()),
        }
    }

    #[test]
    fn test_valid_submission() {
        let now = Utc::now();
        let result = SubmissionValidator::default().validate(&submission_rendered(now, 30_000), now);
        assert!(result.is_valid, "{:?}", result.errors);
    }

    #[test]
    fn test_time_trap_lower_boundary() {
        let validator = SubmissionValidator::default();
        let now = Utc::now();

        assert!(!validator.validate(&submission_rendered(now, 2_900), now).is_valid);
        assert!(validator.validate(&submission_rendered(now, 3_000), now).is_valid);
        assert!(validator.validate(&submission_rendered(now, 3_100), now).is_valid);
    }

    #[test]
    fn test_time_trap_upper_boundary() {
        let validator = SubmissionValidator::default();
        let now = Utc::now();

        assert!(validator.validate(&submission_rendered(now, 59 * 60_000), now).is_valid);
        assert!(validator.validate(&submission_rendered(now, 60 * 60_000), now).is_valid);
        assert!(!validator.validate(&submission_rendered(now, 61 * 60_000), now).is_valid);
    }

    #[test]
    fn test_future_timestamp_is_rejected() {
        let now = Utc::now();
        let result = SubmissionValidator::default().validate(&submission_rendered(now, -10_000), now);
        assert!(!result.is_valid);
    }

    #[test]
    fn test_missing_or_garbage_timestamp_is_rejected() {
        let validator = SubmissionValidator::default();
        let now = Utc::now();

        let mut submission = submission_rendered(now, 10_000);
        submission.form_rendered_at = None;
        assert!(validator.validate(&submission, now).has_error(FORM_ERROR_KEY));

        submission.form_rendered_at = Some("yesterday".to_string());
        assert!(validator.validate(&submission, now).has_error(FORM_ERROR_KEY));
    }

    #[test]
    fn test_honeypot_always_rejects() {
        let validator = SubmissionValidator::default();
        let now = Utc::now();

        let mut submission = submission_rendered(now, 10_000);
        submission.website = Some("http://spam.example".to_string());

        let result = validator.validate(&submission, now);
        assert!(!result.is_valid);
        assert_eq!(result.errors_for(FORM_ERROR_KEY), &[GENERIC_REJECTION.to_string()]);

        submission.name.clear();
        submission.email = "broken".to_string();
        assert!(!validator.validate(&submission, now).is_valid);
    }

    #[test]
    fn test_whitespace_only_honeypot_is_ignored() {
        let now = Utc::now();
        let mut submission = submission_rendered(now, 10_000);
        submission.website = Some("   ".to_string());

        assert!(SubmissionValidator::default().validate(&submission, now).is_valid);
    }

    #[test]
    fn test_field_errors() {
        let validator = SubmissionValidator::default();
        let now = Utc::now();

        let mut submission = submission_rendered(now, 10_000);
        submission.name = "   ".to_string();
        submission.email = "not-an-email".to_string();
        submission.message = String::new();

        let result = validator.validate(&submission, now);
        assert!(!result.is_valid);
        assert!(result.has_error("name"));
        assert!(result.has_error("email"));
        assert!(result.has_error("message"));
        assert!(!result.has_error(FORM_ERROR_KEY));
    }

    #[test]
    fn test_custom_thresholds() {
        let config = ContactConfig {
            min_fill_seconds: 10,
            max_form_age_seconds: 60,
            ..ContactConfig::default()
        };
        let validator = SubmissionValidator::new(&config);
        let now = Utc::now();

        assert!(!validator.validate(&submission_rendered(now, 5_000), now).is_valid);
        assert!(validator.validate(&submission_rendered(now, 30_000), now).is_valid);
        assert!(!validator.validate(&submission_rendered(now, 90_000), now).is_valid);
    }

    #[test]
    fn test_oversized_thresholds_are_capped() {
        let config = ContactConfig {
            max_form_age_seconds: u64::MAX,
            ..ContactConfig::default()
        };
        let validator = SubmissionValidator::new(&config);
        let now = Utc::now();

        assert!(validator.validate(&submission_rendered(now, 10_000), now).is_valid);
        assert!(validator.validate(&submission_rendered(now, 2 * 24 * 3_600_000), now).is_valid);
        assert!(!validator.validate(&submission_rendered(now, 8 * 24 * 3_600_000), now).is_valid);
    }
}
