//! Admin cache control for the portfolio

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::{
    error::{AppError, Result},
    portfolio::{CacheStatus, Category, CategoryFilter},
    AppState,
};

/// `all` or a known category slug; anything else is a client error.
pub(crate) fn parse_category_path(raw: &str) -> Result<CategoryFilter> {
    if raw.trim().eq_ignore_ascii_case("all") {
        return Ok(CategoryFilter::All);
    }

    Category::parse(raw)
        .map(CategoryFilter::Only)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown category: {}", raw)))
}

pub async fn clear_cache(State(state): State<AppState>) -> Json<Value> {
    info!("Admin request: clear portfolio cache");
    let removed = state.portfolio.cache().clear_all();

    Json(json!({
        "message": "Portfolio cache cleared successfully",
        "entriesRemoved": removed,
    }))
}

pub async fn clear_main_cache(State(state): State<AppState>) -> Json<Value> {
    info!("Admin request: clear portfolio main page cache");
    let removed = state.portfolio.cache().clear_main_page();

    Json(json!({
        "message": "Portfolio main page cache cleared successfully",
        "entriesRemoved": removed as usize,
    }))
}

pub async fn clear_category_cache(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Value>> {
    let filter = parse_category_path(&category)?;
    info!("Admin request: clear portfolio cache for {}", filter);
    let removed = state.portfolio.cache().clear_category(filter);

    Ok(Json(json!({
        "message": format!("Portfolio cache cleared for category '{}'", filter),
        "category": filter.as_str(),
        "entriesRemoved": removed,
    })))
}

pub async fn cache_status(State(state): State<AppState>) -> Json<CacheStatus> {
    Json(state.portfolio.cache().status())
}
