//! Route definitions for the dashboard

use crate::{
    handlers::{api, pages},
    state::AppState,
};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

/// Build the complete dashboard router
pub fn build_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Page routes
        .route("/", get(pages::login_page))
        .route("/login", post(pages::login))
        .route("/logout", post(pages::logout))
        .route("/admin", get(pages::dashboard))
        .route("/admin/export", get(pages::export))
        // JSON routes
        .route("/api/dashboard", get(api::api_dashboard))
        // Health check
        .route("/health", get(api::health_check))
}
