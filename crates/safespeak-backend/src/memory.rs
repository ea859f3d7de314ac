//! In-process store and auth provider

use crate::auth::{AuthProvider, AuthSession, Identity};
use crate::error::{BackendError, BackendResult};
use crate::store::DocumentStore;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use parking_lot::RwLock;
use safespeak_core::Document;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

/// Documents held in memory, keyed by collection
///
/// Collections can be switched into a failing state to exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    failures: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a document to a collection
    pub fn insert(&self, collection: &str, document: Document) {
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .push(document);
    }

    /// Append a document built from a JSON object, generating an id when absent
    ///
    /// # Errors
    ///
    /// Returns an error if `record` is not a JSON object.
    pub fn insert_json(&self, collection: &str, record: Value) -> BackendResult<String> {
        let Value::Object(mut fields) = record else {
            return Err(BackendError::Seed(format!(
                "records in {collection:?} must be JSON objects"
            )));
        };

        let id = match fields.remove("id") {
            Some(Value::String(id)) if !id.is_empty() => id,
            _ => Uuid::new_v4().simple().to_string(),
        };

        self.insert(collection, Document::new(id.clone(), fields));
        Ok(id)
    }

    /// Load a seed of the form `{"<collection>": [{...}, ...], ...}`
    ///
    /// # Errors
    ///
    /// Returns an error if the seed is not an object of arrays of objects.
    pub fn from_seed(seed: Value) -> BackendResult<Self> {
        let Value::Object(collections) = seed else {
            return Err(BackendError::Seed(
                "seed must be an object keyed by collection".to_string(),
            ));
        };

        let store = Self::new();
        for (collection, records) in collections {
            let Value::Array(records) = records else {
                return Err(BackendError::Seed(format!(
                    "collection {collection:?} must be an array"
                )));
            };
            for record in records {
                store.insert_json(&collection, record)?;
            }
        }

        Ok(store)
    }

    /// Load a JSON seed file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid seed.
    pub fn from_seed_file(path: &Path) -> BackendResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let store = Self::from_seed(serde_json::from_str(&contents)?)?;
        info!(
            path = %path.display(),
            collections = store.collections.read().len(),
            "Loaded memory store seed"
        );
        Ok(store)
    }

    /// Make every read of `collection` fail with `message`
    pub fn fail_collection(&self, collection: &str, message: impl Into<String>) {
        self.failures
            .write()
            .insert(collection.to_string(), message.into());
    }

    /// Clear a failure set with [`fail_collection`](Self::fail_collection)
    pub fn recover_collection(&self, collection: &str) {
        self.failures.write().remove(collection);
    }

    /// Number of documents in a collection
    #[must_use]
    pub fn len(&self, collection: &str) -> usize {
        self.collections.read().get(collection).map_or(0, Vec::len)
    }

    /// Whether a collection holds no documents
    #[must_use]
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_documents(
        &self,
        collection: &str,
        _credential: Option<&str>,
    ) -> BackendResult<Vec<Document>> {
        if let Some(message) = self.failures.read().get(collection) {
            return Err(BackendError::Unavailable(message.clone()));
        }

        let documents = self
            .collections
            .read()
            .get(collection)
            .cloned()
            .unwrap_or_default();
        debug!(collection, documents = documents.len(), "Read memory collection");
        Ok(documents)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Lifetime of sessions issued by [`MemoryAuthProvider`] unless overridden
const DEFAULT_SESSION_LIFETIME_SECS: i64 = 3600;

/// Accepts a fixed set of accounts and tracks the tokens it has issued
#[derive(Debug, Default)]
pub struct MemoryAuthProvider {
    accounts: HashMap<String, (String, String)>,
    active_tokens: RwLock<HashSet<String>>,
    session_lifetime: Option<Duration>,
}

impl MemoryAuthProvider {
    /// Create a provider with no accounts
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account
    #[must_use]
    pub fn with_account(mut self, email: impl Into<String>, password: impl Into<String>) -> Self {
        let uid = Uuid::new_v4().simple().to_string();
        self.accounts
            .insert(email.into().to_lowercase(), (password.into(), uid));
        self
    }

    /// Issue sessions that expire after `lifetime`
    #[must_use]
    pub fn with_session_lifetime(mut self, lifetime: Duration) -> Self {
        self.session_lifetime = Some(lifetime);
        self
    }

    /// Whether a token was issued and not yet signed out
    #[must_use]
    pub fn is_active(&self, id_token: &str) -> bool {
        self.active_tokens.read().contains(id_token)
    }

    /// Number of live sessions
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        self.active_tokens.read().len()
    }
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<AuthSession> {
        let key = email.trim().to_lowercase();
        let uid = match self.accounts.get(&key) {
            Some((expected, uid)) if expected == password => uid.clone(),
            _ => {
                return Err(BackendError::AuthenticationRejected(
                    "INVALID_LOGIN_CREDENTIALS".to_string(),
                ));
            }
        };

        let id_token = Uuid::new_v4().to_string();
        self.active_tokens.write().insert(id_token.clone());

        Ok(AuthSession {
            identity: Identity {
                uid,
                email: key,
                display_name: None,
            },
            id_token,
            refresh_token: None,
            expires_at: Utc::now()
                + self
                    .session_lifetime
                    .unwrap_or_else(|| Duration::seconds(DEFAULT_SESSION_LIFETIME_SECS)),
        })
    }

    async fn sign_out(&self, session: &AuthSession) -> BackendResult<()> {
        self.active_tokens.write().remove(&session.id_token);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Build a JSON object from pairs; used by seeds written in code
#[must_use]
pub fn record<const N: usize>(pairs: [(&str, Value); N]) -> Value {
    Value::Object(
        pairs
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect::<Map<String, Value>>(),
    )
}
