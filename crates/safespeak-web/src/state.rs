//! Application state management

use crate::fetcher::DataFetcher;
use crate::notify::ToastQueue;
use crate::session::SessionController;
use safespeak_backend::{
    AuthProvider, BackendResult, DocumentStore, FirestoreClient, IdentityToolkitClient,
    MemoryAuthProvider, MemoryStore,
};
use safespeak_core::Config;
use safespeak_core::config::BackendKind;
use std::sync::Arc;
use tracing::{info, warn};

/// Application state shared by every handler
#[derive(Debug)]
pub struct AppState {
    /// Application configuration
    pub config: Config,
    /// Reads the dashboard collections
    pub fetcher: DataFetcher,
    /// Signed-in administrators
    pub sessions: SessionController,
    /// Toasts waiting for each client's next page
    pub toasts: ToastQueue,
}

impl AppState {
    /// Create state around explicitly constructed store and auth clients
    pub fn new(
        config: Config,
        store: Arc<dyn DocumentStore>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        let fetcher = DataFetcher::new(store, &config.dashboard);

        Self {
            config,
            fetcher,
            sessions: SessionController::new(auth),
            toasts: ToastQueue::new(),
        }
    }

    /// Construct the configured backend and wrap it in state
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails its checks, the HTTP
    /// clients cannot be built or the seed file cannot be loaded.
    pub fn from_config(config: Config) -> BackendResult<Self> {
        config.check()?;

        let (store, auth): (Arc<dyn DocumentStore>, Arc<dyn AuthProvider>) =
            match config.backend.kind {
                BackendKind::Firebase => {
                    info!(project = %config.firebase.project_id, "Using Firebase backend");
                    (
                        Arc::new(FirestoreClient::from_config(
                            &config.firebase,
                            config.dashboard.page_size,
                        )?),
                        Arc::new(IdentityToolkitClient::from_config(&config.firebase)?),
                    )
                }
                BackendKind::Memory => {
                    let store = match &config.backend.seed_file {
                        Some(path) => MemoryStore::from_seed_file(path)?,
                        None => {
                            warn!("Memory backend without a seed file; collections are empty");
                            MemoryStore::new()
                        }
                    };

                    let mut auth = MemoryAuthProvider::new();
                    match (&config.backend.admin_email, &config.backend.admin_password) {
                        (Some(email), Some(password)) => {
                            auth = auth.with_account(email.as_str(), password.as_str());
                        }
                        _ => warn!("Memory backend without admin credentials; sign-in will fail"),
                    }

                    info!("Using in-memory backend");
                    (Arc::new(store), Arc::new(auth))
                }
            };

        Ok(Self::new(config, store, auth))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use safespeak_backend::BackendError;
    use safespeak_core::config::BackendConfig;

    #[test]
    fn test_default_firebase_config_is_rejected() {
        let err = AppState::from_config(Config::default()).unwrap_err();

        assert!(matches!(err, BackendError::Configuration(_)));
        assert!(err.to_string().contains("firebase.project_id"));
    }

    #[test]
    fn test_memory_backend_without_seed() {
        let config = Config {
            backend: BackendConfig {
                kind: BackendKind::Memory,
                admin_email: Some("admin@safespeak.test".to_string()),
                admin_password: Some("s3cret".to_string()),
                ..BackendConfig::default()
            },
            ..Config::default()
        };

        let state = AppState::from_config(config).unwrap();
        assert!(state.sessions.is_empty());
    }
}
