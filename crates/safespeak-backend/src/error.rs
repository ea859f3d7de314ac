//! Error types for store and identity provider access

use thiserror::Error;

/// Result type alias for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors raised by document stores and auth providers
#[derive(Error, Debug)]
pub enum BackendError {
    /// Transport-level failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote service answered with a non-success status
    #[error("{service} returned {status}: {message}")]
    Status {
        /// Remote service name
        service: &'static str,
        /// HTTP status code
        status: u16,
        /// Error message extracted from the response body
        message: String,
    },

    /// A document could not be decoded
    #[error("Malformed document {document}: {reason}")]
    MalformedDocument {
        /// Document name or id
        document: String,
        /// What was wrong with it
        reason: String,
    },

    /// The identity provider refused the credentials
    #[error("Authentication rejected: {0}")]
    AuthenticationRejected(String),

    /// The store is not reachable
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Seed data could not be loaded
    #[error("Invalid seed data: {0}")]
    Seed(String),

    /// The backend section of the configuration is unusable
    #[error("Invalid backend configuration: {0}")]
    Configuration(#[from] safespeak_core::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BackendError {
    /// Whether the failure is the caller's credentials rather than the service
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::AuthenticationRejected(_))
            || matches!(self, Self::Status { status: 401 | 403, .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_error_display() {
        let error = BackendError::Status {
            service: "firestore",
            status: 503,
            message: "backend unavailable".to_string(),
        };

        assert_eq!(error.to_string(), "firestore returned 503: backend unavailable");
        assert!(!error.is_auth_failure());
    }

    #[test]
    fn test_auth_failures() {
        assert!(BackendError::AuthenticationRejected("INVALID_PASSWORD".into()).is_auth_failure());
        assert!(
            BackendError::Status {
                service: "firestore",
                status: 403,
                message: "PERMISSION_DENIED".into(),
            }
            .is_auth_failure()
        );
        assert!(!BackendError::Unavailable("down".into()).is_auth_failure());
    }
}
