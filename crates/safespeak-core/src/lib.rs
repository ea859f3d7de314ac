//! Core types, aggregation and configuration for the `SafeSpeak` admin dashboard

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod config;
pub mod error;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use config::{Config, LogFormat, LoggingConfig};
pub use error::{Error, Result};
pub use stats::{Breakdown, CategoryShare, DashboardStats, Percent, ReportCounts};
pub use types::{Attributes, Document, Feedback, Report};

/// Initialize the logging system
///
/// `RUST_LOG` takes precedence over the configured level.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
        LogFormat::Text => registry.with(fmt::layer()).try_init(),
    };

    result.map_err(|e| Error::Logging(e.to_string()))?;
    tracing::debug!(level = %config.level, format = ?config.format, "Logging initialized");
    Ok(())
}
