//! HTTP request handlers

pub mod api;
pub mod pages;

use crate::notify::{ClientToasts, LogOnly, Notifier};
use crate::session::{new_client_id, session_cookie, session_cookie_header};
use crate::state::AppState;
use askama::Template;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use safespeak_backend::AuthSession;
use tracing::{error, warn};

/// Browser identity for one request
///
/// `issued` is set when the request carried no cookie and one must be sent back.
pub(crate) struct Client {
    pub(crate) id: String,
    pub(crate) issued: bool,
}

impl Client {
    /// Where this client's notifications go
    ///
    /// Only a client that already holds a cookie gets its notifications queued;
    /// anything else is logged, so cookieless requests cannot grow the queue.
    pub(crate) fn notifier<'a>(&self, toasts: &'a ClientToasts<'a>) -> &'a dyn Notifier {
        if self.issued { &LogOnly } else { toasts }
    }

    pub(crate) fn from_headers(headers: &HeaderMap) -> Self {
        session_cookie(headers).map_or_else(
            || Self {
                id: new_client_id(),
                issued: true,
            },
            |id| Self { id, issued: false },
        )
    }
}

/// The signed-in session behind the request cookie, if any
pub(crate) fn authenticated(state: &AppState, headers: &HeaderMap) -> Option<(String, AuthSession)> {
    let id = session_cookie(headers)?;
    let session = state.sessions.session(&id)?;
    Some((id, session))
}

/// Attach a `Set-Cookie` binding the browser to `client_id`
pub(crate) fn with_cookie(mut response: Response, client_id: &str) -> Response {
    match HeaderValue::from_str(&session_cookie_header(client_id)) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(e) => warn!("Invalid session cookie value: {e}"),
    }
    response
}

/// Render a page, mapping template failures to 500
pub(crate) fn render<T: Template>(page: &T) -> Response {
    match page.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Template rendering failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}
