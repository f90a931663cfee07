//! Public gallery endpoints

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::debug;

use super::{lenient_int, wants_json};
use crate::{
    error::Result,
    portfolio::{compute_etag, if_none_match_matches, render_gallery_page, render_main_page, CategoryFilter},
    AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagesQuery {
    page: Option<String>,
    page_size: Option<String>,
    category: Option<String>,
    format: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FormatQuery {
    format: Option<String>,
}

fn cache_control(max_age: u64) -> HeaderValue {
    HeaderValue::from_str(&format!("public, max-age={}", max_age))
        .unwrap_or_else(|_| HeaderValue::from_static("public"))
}

/// The same URL serves HTML or JSON depending on `Accept`.
const VARY_ON: &str = "Accept, Accept-Encoding";

pub async fn images(
    State(state): State<AppState>,
    Query(params): Query<ImagesQuery>,
    headers: HeaderMap,
) -> Response {
    let request = state.portfolio.page_request(
        lenient_int(params.page.as_deref()),
        lenient_int(params.page_size.as_deref()),
    );
    let filter = CategoryFilter::parse(params.category.as_deref());
    let etag = compute_etag(request, filter, Utc::now());
    let quoted = HeaderValue::from_str(&format!("\"{}\"", etag))
        .unwrap_or_else(|_| HeaderValue::from_static("\"\""));

    let not_modified = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok())
        .map(|value| if_none_match_matches(value, &etag))
        .unwrap_or(false);

    let cache_headers = [
        (header::ETAG, quoted),
        (header::CACHE_CONTROL, cache_control(state.config.portfolio.http_cache_seconds)),
        (header::VARY, HeaderValue::from_static(VARY_ON)),
    ];

    if not_modified {
        debug!("Returning 304 Not Modified for portfolio images request");
        return (StatusCode::NOT_MODIFIED, cache_headers).into_response();
    }

    let page = state.portfolio.images_page(filter, request).await;
    debug!(
        "Returning {} portfolio images for page {}, category {}",
        page.items.len(),
        request.page,
        filter
    );

    let body = if wants_json(params.format.as_deref(), &headers) {
        Json(page).into_response()
    } else {
        Html(render_gallery_page(&page, filter).into_string()).into_response()
    };

    (cache_headers, body).into_response()
}

pub async fn main_page(
    State(state): State<AppState>,
    Query(params): Query<FormatQuery>,
    headers: HeaderMap,
) -> Response {
    let page = state.portfolio.main_page().await;

    if wants_json(params.format.as_deref(), &headers) {
        Json(page).into_response()
    } else {
        Html(render_main_page(&page).into_string()).into_response()
    }
}

pub async fn stats(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let stats = state.portfolio.stats().await?;

    Ok((
        [(header::CACHE_CONTROL, cache_control(state.config.portfolio.http_cache_seconds))],
        Json(stats),
    ))
}
