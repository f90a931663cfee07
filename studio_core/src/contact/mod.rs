//! Contact form submission, validation, storage and back-office listing

pub mod form;
pub mod models;
pub mod repository;
pub mod service;
pub mod validation;

pub use form::{render_contact_form, ContactFormView};
pub use models::{ContactMessage, ContactSubmission};
pub use repository::{ContactRepository, InMemoryContactRepository, SqliteContactRepository};
pub use service::{ContactService, SubmissionOutcome};
pub use validation::{SubmissionValidator, GENERIC_REJECTION};
