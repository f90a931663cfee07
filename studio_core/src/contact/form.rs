//! HTML for the public contact form.
//!
//! The form carries two hidden fields checked on submit: `website` must stay
//! empty and `formRenderedAt` holds the epoch-millisecond time it was served.

use chrono::{DateTime, Utc};
use maud::{html, Markup};

use super::models::ContactSubmission;
use crate::validation::{ValidationResult, FORM_ERROR_KEY};

pub const SUBMIT_PATH: &str = "/contact/submit";

#[derive(Debug, Clone, Default)]
pub struct ContactFormView<'a> {
    pub values: Option<&'a ContactSubmission>,
    pub errors: Option<&'a ValidationResult>,
    pub sent: bool,
}

impl<'a> ContactFormView<'a> {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn sent() -> Self {
        Self { sent: true, ..Self::default() }
    }

    pub fn with_errors(values: &'a ContactSubmission, errors: &'a ValidationResult) -> Self {
        Self {
            values: Some(values),
            errors: Some(errors),
            sent: false,
        }
    }

    fn errors_for(&self, field: &str) -> &[String] {
        self.errors.map(|e| e.errors_for(field)).unwrap_or(&[])
    }
}

pub fn render_contact_form(view: &ContactFormView<'_>, rendered_at: DateTime<Utc>) -> Markup {
    let name = view.values.map(|v| v.name.as_str()).unwrap_or("");
    let email = view.values.map(|v| v.email.as_str()).unwrap_or("");
    let message = view.values.map(|v| v.message.as_str()).unwrap_or("");

    html! {
        form.contact-form method="post" action=(SUBMIT_PATH) novalidate {
            @if view.sent {
                div.form-success role="status" {
                    p { "Thank you! Your message has been sent." }
                }
            }
            @for error in view.errors_for(FORM_ERROR_KEY) {
                div.form-error role="alert" { (error) }
            }

            (field_row("name", "Name", view.errors_for("name"), html! {
                input #name type="text" name="name" value=(name) maxlength="200" required;
            }))
            (field_row("email", "Email", view.errors_for("email"), html! {
                input #email type="email" name="email" value=(email) maxlength="254" required;
            }))
            (field_row("message", "Message", view.errors_for("message"), html! {
                textarea #message name="message" rows="6" maxlength="5000" required { (message) }
            }))

            div.form-field.hp aria-hidden="true" style="position:absolute;left:-10000px;" {
                label for="website" { "Website" }
                input #website type="text" name="website" value="" tabindex="-1" autocomplete="off";
            }
            input type="hidden" name="formRenderedAt" value=(rendered_at.timestamp_millis());

            button type="submit" { "Send message" }
        }
    }
}

fn field_row(id: &str, label: &str, errors: &[String], control: Markup) -> Markup {
    html! {
        div.form-field.has-error[!errors.is_empty()] {
            label for=(id) { (label) }
            (control)
            @for error in errors {
                span.field-error { (error) }
            }
        }
    }
}
