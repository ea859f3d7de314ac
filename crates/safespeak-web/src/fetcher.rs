//! Reads the two dashboard collections

use safespeak_backend::{BackendError, BackendResult, DocumentStore};
use safespeak_core::config::DashboardConfig;
use safespeak_core::{Feedback, Report};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

/// Both collections, read in full
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Every report
    pub reports: Vec<Report>,
    /// Every feedback entry
    pub feedback: Vec<Feedback>,
}

/// Why a snapshot could not be produced
#[derive(Debug, Error)]
pub enum FetchError {
    /// The reports read failed
    #[error("failed to read reports: {0}")]
    Reports(#[source] BackendError),

    /// The feedback read failed
    #[error("failed to read feedback: {0}")]
    Feedback(#[source] BackendError),

    /// Both reads failed
    #[error("failed to read reports ({reports}) and feedback ({feedback})")]
    Both {
        /// Reports failure
        reports: BackendError,
        /// Feedback failure
        feedback: BackendError,
    },
}

/// Result of both reads, each kept independently
#[derive(Debug)]
pub struct FetchOutcome {
    /// Reports read
    pub reports: BackendResult<Vec<Report>>,
    /// Feedback read
    pub feedback: BackendResult<Vec<Feedback>>,
}

impl FetchOutcome {
    /// Whether both reads succeeded
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.reports.is_ok() && self.feedback.is_ok()
    }

    /// All-or-nothing: a snapshot only when both reads succeeded
    ///
    /// # Errors
    ///
    /// Returns the failure(s) when either read failed; the successful half is dropped.
    pub fn into_snapshot(self) -> Result<Snapshot, FetchError> {
        match (self.reports, self.feedback) {
            (Ok(reports), Ok(feedback)) => Ok(Snapshot { reports, feedback }),
            (Err(reports), Ok(_)) => Err(FetchError::Reports(reports)),
            (Ok(_), Err(feedback)) => Err(FetchError::Feedback(feedback)),
            (Err(reports), Err(feedback)) => Err(FetchError::Both { reports, feedback }),
        }
    }
}

/// Reads the report and feedback collections from an injected store
#[derive(Clone)]
pub struct DataFetcher {
    store: Arc<dyn DocumentStore>,
    reports_collection: String,
    feedback_collection: String,
}

impl std::fmt::Debug for DataFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataFetcher")
            .field("store", &self.store.name())
            .field("reports_collection", &self.reports_collection)
            .field("feedback_collection", &self.feedback_collection)
            .finish()
    }
}

impl DataFetcher {
    /// Create a fetcher for the configured collections
    pub fn new(store: Arc<dyn DocumentStore>, config: &DashboardConfig) -> Self {
        Self {
            store,
            reports_collection: config.reports_collection.clone(),
            feedback_collection: config.feedback_collection.clone(),
        }
    }

    /// Read all reports
    ///
    /// # Errors
    ///
    /// Returns the store's error unchanged.
    pub async fn reports(&self, credential: Option<&str>) -> BackendResult<Vec<Report>> {
        let documents = self
            .store
            .list_documents(&self.reports_collection, credential)
            .await?;
        Ok(documents.into_iter().map(Report::from_document).collect())
    }

    /// Read all feedback
    ///
    /// # Errors
    ///
    /// Returns the store's error unchanged.
    pub async fn feedback(&self, credential: Option<&str>) -> BackendResult<Vec<Feedback>> {
        let documents = self
            .store
            .list_documents(&self.feedback_collection, credential)
            .await?;
        Ok(documents.into_iter().map(Feedback::from_document).collect())
    }

    /// Issue both reads concurrently and wait for both to finish
    pub async fn fetch_all(&self, credential: Option<&str>) -> FetchOutcome {
        let (reports, feedback) =
            tokio::join!(self.reports(credential), self.feedback(credential));

        if let Err(e) = &reports {
            error!(collection = %self.reports_collection, store = self.store.name(), "Fetch error: {e}");
        }
        if let Err(e) = &feedback {
            error!(collection = %self.feedback_collection, store = self.store.name(), "Fetch error: {e}");
        }
        debug!(
            reports = reports.as_ref().map_or(0, Vec::len),
            feedback = feedback.as_ref().map_or(0, Vec::len),
            "Dashboard fetch finished"
        );

        FetchOutcome { reports, feedback }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use safespeak_backend::MemoryStore;
    use serde_json::json;

    fn store() -> Arc<MemoryStore> {
        let store = MemoryStore::from_seed(json!({
            "reports": [
                {"id": "r1", "status": "resolved"},
                {"id": "r2", "status": "pending", "priority": "high"}
            ],
            "feedback": [
                {"id": "f1", "message": "Thanks", "timestamp": "2024-03-15"}
            ]
        }))
        .unwrap();
        Arc::new(store)
    }

    fn fetcher(store: Arc<MemoryStore>) -> DataFetcher {
        DataFetcher::new(store, &DashboardConfig::default())
    }

    #[tokio::test]
    async fn test_fetch_all_reads_both_collections() {
        let outcome = fetcher(store()).fetch_all(None).await;
        assert!(outcome.is_complete());

        let snapshot = outcome.into_snapshot().unwrap();
        let ids: Vec<_> = snapshot.reports.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2"]);
        assert_eq!(snapshot.feedback.len(), 1);
        assert_eq!(snapshot.feedback[0].message, "Thanks");
    }

    #[tokio::test]
    async fn test_outcome_keeps_each_result() {
        let store = store();
        store.fail_collection("feedback", "timeout");

        let outcome = fetcher(store).fetch_all(None).await;

        assert!(!outcome.is_complete());
        assert_eq!(outcome.reports.as_ref().unwrap().len(), 2);
        assert!(outcome.feedback.is_err());
    }

    #[tokio::test]
    async fn test_single_failure_discards_the_snapshot() {
        let store = store();
        store.fail_collection("reports", "permission denied");

        let err = fetcher(store).fetch_all(None).await.into_snapshot().unwrap_err();
        assert!(matches!(err, FetchError::Reports(_)));
        assert!(err.to_string().contains("permission denied"));
    }

    #[tokio::test]
    async fn test_both_failures_are_reported() {
        let store = store();
        store.fail_collection("reports", "down");
        store.fail_collection("feedback", "down");

        let err = fetcher(store).fetch_all(None).await.into_snapshot().unwrap_err();
        assert!(matches!(err, FetchError::Both { .. }));
    }

    #[tokio::test]
    async fn test_configured_collection_names() {
        let store = MemoryStore::new();
        store
            .insert_json("incidents", json!({"id": "i1", "status": "pending"}))
            .unwrap();

        let config = DashboardConfig {
            reports_collection: "incidents".to_string(),
            ..DashboardConfig::default()
        };
        let fetcher = DataFetcher::new(Arc::new(store), &config);

        let reports = fetcher.reports(None).await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].status(), "pending");
    }
}
