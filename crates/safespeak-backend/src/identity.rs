//! Firebase Identity Toolkit REST client

use crate::auth::{AuthProvider, AuthSession, Identity};
use crate::error::{BackendError, BackendResult};
use crate::firestore::error_message;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::{Client, StatusCode};
use safespeak_core::config::FirebaseConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration as StdDuration;
use tracing::{debug, info};

const SERVICE: &str = "identitytoolkit";

/// Token lifetime assumed when the provider omits `expiresIn`
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    display_name: Option<String>,
    id_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<String>,
}

/// Password sign-in through the Identity Toolkit API
#[derive(Debug, Clone)]
pub struct IdentityToolkitClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl IdentityToolkitClient {
    /// Build a client from the Firebase section of the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &FirebaseConfig) -> BackendResult<Self> {
        let client = Client::builder()
            .timeout(StdDuration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self::with_client(client, &config.identity_url, &config.api_key))
    }

    /// Build a client around an existing HTTP client
    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl AuthProvider for IdentityToolkitClient {
    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<AuthSession> {
        let url = format!("{}/accounts:signInWithPassword", self.base_url);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&SignInRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body);
            return Err(if status == StatusCode::BAD_REQUEST {
                BackendError::AuthenticationRejected(message)
            } else {
                BackendError::Status {
                    service: SERVICE,
                    status: status.as_u16(),
                    message,
                }
            });
        }

        let body: SignInResponse = response.json().await?;
        let lifetime = body
            .expires_in
            .as_deref()
            .and_then(|secs| secs.parse::<i64>().ok())
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);

        info!(uid = %body.local_id, "Administrator signed in");

        Ok(AuthSession {
            identity: Identity {
                uid: body.local_id,
                email: if body.email.is_empty() {
                    email.to_string()
                } else {
                    body.email
                },
                display_name: body.display_name.filter(|name| !name.is_empty()),
            },
            id_token: body.id_token,
            refresh_token: body.refresh_token,
            expires_at: Utc::now() + Duration::seconds(lifetime),
        })
    }

    async fn sign_out(&self, session: &AuthSession) -> BackendResult<()> {
        // Identity Toolkit tokens are bearer tokens with no revocation endpoint
        // for web API keys; discarding them is the sign-out.
        debug!(uid = %session.identity.uid, "Discarding Identity Toolkit tokens");
        Ok(())
    }

    fn name(&self) -> &str {
        SERVICE
    }
}
