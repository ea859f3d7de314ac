//! Administrator sessions: sign-in, current identity, logout

use crate::notify::{Notification, Notifier};
use axum::http::{HeaderMap, header};
use chrono::Utc;
use dashmap::DashMap;
use safespeak_backend::{AuthProvider, AuthSession, BackendResult, Identity};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Route the application starts from; logout always lands here
pub const ENTRY_ROUTE: &str = "/";

/// Route of the dashboard itself
pub const DASHBOARD_ROUTE: &str = "/admin";

/// Cookie carrying the client/session id
pub const SESSION_COOKIE: &str = "safespeak_session";

/// Generate a fresh opaque client id
#[must_use]
pub fn new_client_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Read the session cookie from request headers
#[must_use]
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value binding the browser to `client_id`
#[must_use]
pub fn session_cookie_header(client_id: &str) -> String {
    format!("{SESSION_COOKIE}={client_id}; Path=/; HttpOnly; SameSite=Lax")
}

/// Tracks signed-in administrators and delegates to the auth provider
pub struct SessionController {
    auth: Arc<dyn AuthProvider>,
    sessions: DashMap<String, AuthSession>,
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("auth", &self.auth.name())
            .field("sessions", &self.sessions.len())
            .finish()
    }
}

impl SessionController {
    /// Create a controller around an auth provider
    pub fn new(auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            auth,
            sessions: DashMap::new(),
        }
    }

    /// Sign in and register a new session
    ///
    /// On failure an error notification is emitted and the provider error returned.
    ///
    /// # Errors
    ///
    /// Returns the provider error when sign-in fails.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        notifier: &dyn Notifier,
    ) -> BackendResult<String> {
        match self.auth.sign_in(email, password).await {
            Ok(session) => {
                self.sweep_expired();
                let session_id = new_client_id();
                info!(uid = %session.identity.uid, provider = self.auth.name(), "Session started");
                self.sessions.insert(session_id.clone(), session);
                Ok(session_id)
            }
            Err(e) => {
                warn!(provider = self.auth.name(), "Sign-in failed: {e}");
                let description = if e.is_auth_failure() {
                    "Invalid email or password."
                } else {
                    "The sign-in service is unavailable. Please try again."
                };
                notifier.notify(Notification::error("Login Failed", description));
                Err(e)
            }
        }
    }

    /// The live session for `session_id`; expired sessions are dropped
    #[must_use]
    pub fn session(&self, session_id: &str) -> Option<AuthSession> {
        let session = self.sessions.get(session_id)?.value().clone();
        if session.is_expired_at(Utc::now()) {
            self.sessions.remove(session_id);
            info!(uid = %session.identity.uid, "Session expired");
            return None;
        }
        Some(session)
    }

    /// Drop every expired session, returning how many were removed
    pub fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired_at(now));
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            info!(removed, "Expired sessions swept");
        }
        removed
    }

    /// Who is signed in under `session_id`
    #[must_use]
    pub fn current_identity(&self, session_id: &str) -> Option<Identity> {
        self.session(session_id).map(|session| session.identity)
    }

    /// Number of registered sessions
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// End the session, confirm to the user and return where to navigate
    ///
    /// The provider sign-out is not retried and its failure is only logged.
    pub async fn logout(&self, session_id: Option<&str>, notifier: &dyn Notifier) -> &'static str {
        if let Some((_, session)) = session_id.and_then(|id| self.sessions.remove(id)) {
            if let Err(e) = self.auth.sign_out(&session).await {
                warn!(uid = %session.identity.uid, "Provider sign-out failed: {e}");
            }
            info!(uid = %session.identity.uid, "Session ended");
        }

        notifier.notify(Notification::info(
            "Logged Out",
            "You have been successfully logged out.",
        ));
        ENTRY_ROUTE
    }
}
