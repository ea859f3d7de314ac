//! Page handlers: sign-in, logout, dashboard, export

use super::{Client, authenticated, render, with_cookie};
use crate::export::{EXPORT_FILE_NAME, analytics_csv};
use crate::notify::LogOnly;
use crate::session::{DASHBOARD_ROUTE, ENTRY_ROUTE};
use crate::state::AppState;
use crate::templates::{DashboardPage, LoginPage};
use crate::view::{Dashboard, Tab};
use axum::{
    extract::{Form, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;

/// `?tab=` query
#[derive(Debug, Default, Deserialize)]
pub struct TabQuery {
    /// Requested tab key
    pub tab: Option<String>,
}

/// Sign-in form
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Administrator email
    pub email: String,
    /// Administrator password
    pub password: String,
}

/// Sign-in page; signed-in administrators go straight to the dashboard
pub async fn login_page(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if authenticated(&state, &headers).is_some() {
        return Redirect::to(DASHBOARD_ROUTE).into_response();
    }

    let client = Client::from_headers(&headers);
    let page = LoginPage {
        toasts: state.toasts.drain(&client.id),
    };

    let response = render(&page);
    if client.issued {
        with_cookie(response, &client.id)
    } else {
        response
    }
}

/// Sign in and start a session
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    let client = Client::from_headers(&headers);
    let toasts = state.toasts.for_client(&client.id);

    match state
        .sessions
        .login(&form.email, &form.password, client.notifier(&toasts))
        .await
    {
        Ok(session_id) => with_cookie(Redirect::to(DASHBOARD_ROUTE).into_response(), &session_id),
        Err(_) => {
            let response = Redirect::to(ENTRY_ROUTE).into_response();
            if client.issued {
                with_cookie(response, &client.id)
            } else {
                response
            }
        }
    }
}

/// End the session and return to the entry route
pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let client = Client::from_headers(&headers);
    let session_id = (!client.issued).then_some(client.id.as_str());

    let toasts = state.toasts.for_client(&client.id);

    let route = state
        .sessions
        .logout(session_id, client.notifier(&toasts))
        .await;

    // The cookie stays so the confirmation renders on the entry page
    let response = Redirect::to(route).into_response();
    if client.issued {
        with_cookie(response, &client.id)
    } else {
        response
    }
}

/// Administrator dashboard
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<TabQuery>,
) -> Response {
    let Some((client_id, session)) = authenticated(&state, &headers) else {
        return Redirect::to(ENTRY_ROUTE).into_response();
    };

    let mut dashboard = Dashboard::new();
    dashboard
        .mount(
            &state.fetcher,
            Some(&session.id_token),
            &state.toasts.for_client(&client_id),
        )
        .await;

    let page = DashboardPage::new(
        session.identity.email,
        state.toasts.drain(&client_id),
        dashboard.view(Tab::parse(query.tab.as_deref())),
    );
    render(&page)
}

/// Analytics breakdown as a CSV attachment
///
/// A failed load answers `502` rather than exporting zero counts.
pub async fn export(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let Some((_, session)) = authenticated(&state, &headers) else {
        return Redirect::to(ENTRY_ROUTE).into_response();
    };

    // A download never renders toasts, so nothing is queued
    let mut dashboard = Dashboard::new();
    if !dashboard
        .mount(&state.fetcher, Some(&session.id_token), &LogOnly)
        .await
    {
        return (
            StatusCode::BAD_GATEWAY,
            "Failed to fetch data from the database.",
        )
            .into_response();
    }

    match analytics_csv(dashboard.stats()) {
        Ok(csv) => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
                ),
            ],
            csv,
        )
            .into_response(),
        Err(e) => {
            error!("Analytics export failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Export failed").into_response()
        }
    }
}
