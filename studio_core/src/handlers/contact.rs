//! Contact form and back-office message endpoints

use axum::{
    extract::{Form, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::lenient_int;
use crate::{
    contact::{render_contact_form, ContactFormView, ContactSubmission, SubmissionOutcome},
    error::{AppError, Result},
    AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesQuery {
    page: Option<String>,
    page_size: Option<String>,
}

pub async fn list_messages(
    State(state): State<AppState>,
    Query(params): Query<MessagesQuery>,
) -> impl IntoResponse {
    let page = lenient_int(params.page.as_deref());
    let page_size = lenient_int(params.page_size.as_deref());

    Json(state.contact.list(page, page_size).await)
}

pub async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = Uuid::parse_str(id.trim())
        .map_err(|_| AppError::BadRequest("Invalid message id".to_string()))?;

    if state.contact.remove(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Message {} not found", id)))
    }
}

#[derive(Debug, Deserialize)]
pub struct FormQuery {
    sent: Option<String>,
}

pub async fn show_form(Query(params): Query<FormQuery>) -> impl IntoResponse {
    let view = if params.sent.is_some() {
        ContactFormView::sent()
    } else {
        ContactFormView::blank()
    };

    Html(render_contact_form(&view, Utc::now()).into_string())
}

pub async fn submit_form(
    State(state): State<AppState>,
    Form(submission): Form<ContactSubmission>,
) -> Result<Response> {
    match state.contact.submit(&submission).await? {
        SubmissionOutcome::Accepted(message) => {
            info!("Contact form accepted: id={}", message.id);
            Ok(Redirect::to(&state.config.contact.success_redirect).into_response())
        }
        SubmissionOutcome::Rejected(errors) => {
            let view = ContactFormView::with_errors(&submission, &errors);
            let html = render_contact_form(&view, Utc::now()).into_string();
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response())
        }
    }
}
