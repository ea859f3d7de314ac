//! Web server setup and configuration

use crate::{routes::build_routes, state::AppState};
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

/// Build the complete web application with all routes and state
///
/// Store round trips are bounded by the HTTP client timeout of the backend.
pub fn build_app(state: AppState) -> Router {
    build_routes()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new()),
        )
        .with_state(Arc::new(state))
}
