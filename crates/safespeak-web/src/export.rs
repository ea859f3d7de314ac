//! Analytics export as CSV

use safespeak_core::{Breakdown, DashboardStats};
use thiserror::Error;

/// File name offered to the browser
pub const EXPORT_FILE_NAME: &str = "safespeak-analytics.csv";

/// Errors producing the export
#[derive(Debug, Error)]
pub enum ExportError {
    /// Writing a record failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Flushing the writer failed
    #[error("CSV flush error: {0}")]
    Flush(String),

    /// The output was not UTF-8
    #[error("CSV encoding error: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Render `category,count,percent` rows, the total first
///
/// With no data only the total row is written, with an empty percent.
///
/// # Errors
///
/// Returns an error if the CSV writer fails.
pub fn analytics_csv(stats: &DashboardStats) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["category", "count", "percent"])?;

    let total = stats.counts.total.to_string();
    let total_percent = if stats.breakdown.is_empty() { "" } else { "100.0" };
    writer.write_record(["Total Reports", total.as_str(), total_percent])?;

    if let Breakdown::Shares(shares) = &stats.breakdown {
        for share in shares {
            writer.write_record([
                share.label.to_string(),
                share.count.to_string(),
                share.percent.to_string(),
            ])?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Flush(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}
