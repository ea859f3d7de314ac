//! JSON endpoints

use super::authenticated;
use super::pages::TabQuery;
use crate::state::AppState;
use crate::view::{Dashboard, Tab};
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use std::sync::Arc;

/// Dashboard view model with the pending notifications
pub async fn api_dashboard(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<TabQuery>,
) -> Response {
    let Some((client_id, session)) = authenticated(&state, &headers) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "Unauthorized",
                "message": "Sign in to view the dashboard"
            })),
        )
            .into_response();
    };

    let mut dashboard = Dashboard::new();
    dashboard
        .mount(
            &state.fetcher,
            Some(&session.id_token),
            &state.toasts.for_client(&client_id),
        )
        .await;

    Json(json!({
        "identity": session.identity,
        "view": dashboard.view(Tab::parse(query.tab.as_deref())),
        "notifications": state.toasts.drain(&client_id),
    }))
    .into_response()
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
