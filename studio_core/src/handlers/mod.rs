//! HTTP handlers

pub mod cache;
pub mod contact;
pub mod health;
pub mod portfolio;
pub mod routes;
pub mod warming;

use axum::http::{header, HeaderMap};

/// Query numbers are parsed leniently: anything unparsable counts as absent
/// and falls back to the default.
pub(crate) fn lenient_int(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|value| value.trim().parse().ok())
}

/// `?format=json` or an `Accept` header naming JSON.
pub(crate) fn wants_json(format: Option<&str>, headers: &HeaderMap) -> bool {
    if let Some(format) = format {
        return format.trim().eq_ignore_ascii_case("json");
    }

    headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .map(|accept| accept.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false)
}
