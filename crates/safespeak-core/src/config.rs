//! Configuration management for the `SafeSpeak` dashboard

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;
use validator::Validate;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    #[validate(nested)]
    pub server: ServerConfig,

    /// Which backend implementation to wire up
    #[serde(default)]
    pub backend: BackendConfig,

    /// Firebase project settings (used by the `firebase` backend)
    #[serde(default)]
    #[validate(nested)]
    pub firebase: FirebaseConfig,

    /// Dashboard data settings
    #[serde(default)]
    #[validate(nested)]
    pub dashboard: DashboardConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    #[validate(length(min = 1))]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    #[validate(range(min = 1))]
    pub port: u16,
}

/// Backend implementations the server can be wired with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Firestore document store and Identity Toolkit authentication
    #[default]
    Firebase,
    /// In-process store and a single configured administrator
    Memory,
}

/// Backend selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend implementation
    #[serde(default)]
    pub kind: BackendKind,

    /// JSON seed file for the memory store (`{"reports": [...], "feedback": [...]}`)
    #[serde(default)]
    pub seed_file: Option<PathBuf>,

    /// Administrator e-mail accepted by the memory auth provider
    #[serde(default)]
    pub admin_email: Option<String>,

    /// Administrator password accepted by the memory auth provider
    #[serde(default)]
    pub admin_password: Option<String>,
}

/// Firebase project configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FirebaseConfig {
    /// Firebase project identifier
    #[serde(default)]
    pub project_id: String,

    /// Web API key used for Identity Toolkit requests
    #[serde(default)]
    pub api_key: String,

    /// Firestore database identifier
    #[serde(default = "default_database_id")]
    #[validate(length(min = 1))]
    pub database_id: String,

    /// Firestore REST base URL
    #[serde(default = "default_firestore_url")]
    #[validate(url)]
    pub firestore_url: String,

    /// Identity Toolkit REST base URL
    #[serde(default = "default_identity_url")]
    #[validate(url)]
    pub identity_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    #[validate(range(min = 1, max = 600))]
    pub request_timeout_secs: u64,
}

/// Dashboard data configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DashboardConfig {
    /// Collection holding incident reports
    #[serde(default = "default_reports_collection")]
    #[validate(length(min = 1))]
    pub reports_collection: String,

    /// Collection holding user feedback
    #[serde(default = "default_feedback_collection")]
    #[validate(length(min = 1))]
    pub feedback_collection: String,

    /// Documents requested per page when reading a collection
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 1000))]
    pub page_size: u32,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Structured JSON lines
    #[default]
    Json,
    /// Human readable text
    Text,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format
    #[serde(default)]
    pub format: LogFormat,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8080
}

fn default_database_id() -> String {
    "(default)".to_string()
}

fn default_firestore_url() -> String {
    "https://firestore.googleapis.com/v1".to_string()
}

fn default_identity_url() -> String {
    "https://identitytoolkit.googleapis.com/v1".to_string()
}

const fn default_request_timeout() -> u64 {
    30
}

fn default_reports_collection() -> String {
    "reports".to_string()
}

fn default_feedback_collection() -> String {
    "feedback".to_string()
}

const fn default_page_size() -> u32 {
    300
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for FirebaseConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            api_key: String::new(),
            database_id: default_database_id(),
            firestore_url: default_firestore_url(),
            identity_url: default_identity_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            reports_collection: default_reports_collection(),
            feedback_collection: default_feedback_collection(),
            page_size: default_page_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from an optional `config` file and `SAFESPEAK__*` environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded, parsed or validated.
    pub fn load() -> crate::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("SAFESPEAK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.check()?;
        debug!(
            backend = ?config.backend.kind,
            reports = %config.dashboard.reports_collection,
            feedback = %config.dashboard.feedback_collection,
            page_size = config.dashboard.page_size,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Validate field ranges and the requirements of the selected backend
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first offending field.
    pub fn check(&self) -> crate::Result<()> {
        self.validate()?;

        if self.backend.kind == BackendKind::Firebase {
            if self.firebase.project_id.trim().is_empty() {
                return Err(crate::Error::Validation {
                    field: "firebase.project_id".to_string(),
                    message: "required for the firebase backend".to_string(),
                });
            }
            if self.firebase.api_key.trim().is_empty() {
                return Err(crate::Error::Validation {
                    field: "firebase.api_key".to_string(),
                    message: "required for the firebase backend".to_string(),
                });
            }
        }

        Ok(())
    }
}
