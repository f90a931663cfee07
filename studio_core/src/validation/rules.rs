//! Validation rules and custom validators

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$"
    ).unwrap();
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.len() > 254 || !EMAIL_REGEX.is_match(email) {
        let mut error = ValidationError::new("invalid_email");
        error.message = Some("Please enter a valid email address".into());
        return Err(error);
    }

    Ok(())
}
