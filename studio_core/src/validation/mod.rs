//! Field-level validation results shared by form handlers

pub mod rules;

pub use rules::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::{Validate, ValidationErrors};

/// Key for errors that belong to the form as a whole rather than one field.
pub const FORM_ERROR_KEY: &str = "_form";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ValidationResult {
    pub fn success() -> Self {
        Self {
            is_valid: true,
            errors: BTreeMap::new(),
        }
    }

    pub fn from_validation_errors(errors: ValidationErrors) -> Self {
        let mut result = Self::success();

        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = match &error.message {
                    Some(message) => message.to_string(),
                    None => format!("Validation failed for field '{}'", field),
                };
                result.add_error(field, &message);
            }
        }

        result
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.is_valid = false;
        let messages = self.errors.entry(field.to_string()).or_default();
        if !messages.iter().any(|m| m == message) {
            messages.push(message.to_string());
        }
    }

    pub fn add_form_error(&mut self, message: &str) {
        self.add_error(FORM_ERROR_KEY, message);
    }

    pub fn errors_for(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_error(&self, field: &str) -> bool {
        !self.errors_for(field).is_empty()
    }

    pub fn merge(&mut self, other: ValidationResult) {
        if !other.is_valid {
            self.is_valid = false;
        }

        for (field, errors) in other.errors {
            for error in errors {
                self.add_error(&field, &error);
            }
        }
    }
}

pub trait Validatable {
    fn validate_comprehensive(&self) -> ValidationResult;
}

impl<T> Validatable for T
where T: Validate, {
    fn validate_comprehensive(&self) -> ValidationResult {
        match self.validate() {
            Ok(_) => ValidationResult::success(),
            Err(errors) => ValidationResult::from_validation_errors(errors),
        }
    }
}
