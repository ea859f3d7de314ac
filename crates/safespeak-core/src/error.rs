//! Error types for the `SafeSpeak` dashboard core

use thiserror::Error;

/// Main error type for the dashboard core
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded or parsed
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message
        message: String,
    },

    /// Configuration or input failed validation
    #[error("Validation error: {field} - {message}")]
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// Logging subscriber could not be installed
    #[error("Logging initialization failed: {0}")]
    Logging(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration {
            message: err.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field = errors
            .errors()
            .keys()
            .next()
            .map_or_else(|| "config".to_string(), ToString::to_string);

        Self::Validation {
            field,
            message: errors.to_string(),
        }
    }
}
