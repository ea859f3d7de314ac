//! Authentication provider abstraction

use crate::error::BackendResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The signed-in administrator, as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider user id
    pub uid: String,
    /// Account e-mail
    pub email: String,
    /// Display name, when the account has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Tokens and identity produced by a successful sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    /// Who signed in
    pub identity: Identity,
    /// Bearer token forwarded to the document store
    pub id_token: String,
    /// Token used to refresh `id_token`, when issued
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// When `id_token` stops being accepted
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    /// Whether the id token has expired at `now`
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Sign-in and sign-out against an external identity provider
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Exchange e-mail and password for a session
    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<AuthSession>;

    /// Invalidate a session
    async fn sign_out(&self, session: &AuthSession) -> BackendResult<()>;

    /// Provider name for logs
    fn name(&self) -> &str;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_session_expiry() {
        let now = Utc::now();
        let session = AuthSession {
            identity: Identity {
                uid: "u1".to_string(),
                email: "admin@safespeak.test".to_string(),
                display_name: None,
            },
            id_token: "token".to_string(),
            refresh_token: None,
            expires_at: now + Duration::seconds(60),
        };

        assert!(!session.is_expired_at(now));
        assert!(session.is_expired_at(now + Duration::seconds(60)));
    }
}
