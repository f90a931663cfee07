//! Admin-triggered warming and media reload

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{json, Value};
use tracing::info;

use super::cache::parse_category_path;
use crate::{
    error::Result,
    portfolio::CategoryFilter,
    warming::WarmReport,
    AppState,
};

fn report_body(filter: CategoryFilter, report: &WarmReport) -> Value {
    json!({
        "message": report.summary(),
        "category": filter.as_str(),
        "totalImages": report.total,
        "warmedCount": report.warmed,
        "failedCount": report.failed,
        "skippedCount": report.skipped,
        "cropSizes": report.crop_sizes,
        "elapsedMs": report.elapsed_ms,
    })
}

pub async fn warm_all(State(state): State<AppState>) -> Result<Json<Value>> {
    info!("Admin request: warm all portfolio images");
    let report = state.warming.warm_all().await?;
    Ok(Json(report_body(CategoryFilter::All, &report)))
}

pub async fn warm_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Value>> {
    let filter = parse_category_path(&category)?;
    info!("Admin request: warm portfolio images for {}", filter);
    let report = state.warming.warm(filter).await?;
    Ok(Json(report_body(filter, &report)))
}

/// Re-reads the media store, drops the portfolio cache and optionally
/// starts a background warm.
pub async fn reload(State(state): State<AppState>) -> Result<Json<Value>> {
    info!("Admin request: reload portfolio media");
    let items = state.portfolio.reload().await?;

    let warming_started = state.config.warming.warm_on_reload;
    if warming_started {
        let _ = state.warming.spawn_warm_all();
    }

    Ok(Json(json!({
        "message": "Portfolio media reloaded",
        "totalImages": items,
        "warmingStarted": warming_started,
    })))
}
