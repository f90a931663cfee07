//! Liveness endpoint

use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::warn;

use crate::AppState;

pub async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    let mut database_stats = Value::Null;

    let database_status = match &state.db_manager {
        Some(db_manager) => match db_manager.health_check().await {
            Ok(()) => {
                if let Ok(stats) = db_manager.get_stats().await {
                    database_stats = json!(stats);
                }
                "healthy"
            }
            Err(e) => {
                warn!("Database health check failed: {}", e);
                "unhealthy"
            }
        },
        None => "not_configured",
    };

    let status = if database_status == "unhealthy" { "degraded" } else { "healthy" };

    Json(json!({
        "status": status,
        "app": state.app_name,
        "version": state.version,
        "timestamp": Utc::now(),
        "uptimeSeconds": (Utc::now() - state.started_at).num_seconds().max(0),
        "databaseStatus": database_status,
        "databaseStats": database_stats,
        "contactStorage": if state.contact.is_persistent() { "sqlite" } else { "memory" },
        "mediaSource": state.portfolio.source_description(),
        "cacheEntries": state.portfolio.cache().store().len(),
    }))
}
