//! Route table

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::{cache, contact, health, portfolio, warming};
use crate::AppState;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::handle_health))
        .route("/contact", get(contact::list_messages))
        .route("/contact/form", get(contact::show_form))
        .route("/contact/submit", post(contact::submit_form))
        .route("/contact/:id", delete(contact::delete_message))
        .route("/portfolio", get(portfolio::main_page))
        .route("/portfolio/images", get(portfolio::images))
        .route("/portfolio/stats", get(portfolio::stats))
        .nest("/admin/portfolio", admin_routes())
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/cache/clear", post(cache::clear_cache))
        .route("/cache/clear-main", post(cache::clear_main_cache))
        .route("/cache/clear/:category", post(cache::clear_category_cache))
        .route("/cache-status", get(cache::cache_status))
        .route("/warm", post(warming::warm_all))
        .route("/warm/:category", post(warming::warm_category))
        .route("/reload", post(warming::reload))
}
