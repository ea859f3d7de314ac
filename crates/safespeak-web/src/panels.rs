//! Tab sub-views: case list, critical cases, feedback list
//!
//! Each sub-view receives the full record set and decides what to show.

use safespeak_core::{Feedback, Report};
use serde::Serialize;

const PLACEHOLDER: &str = "—";

/// Report fields tried, in order, for a one-line summary
const SUMMARY_FIELDS: [&str; 4] = ["title", "crimeType", "category", "description"];

/// Report fields tried, in order, for the submission time
const SUBMITTED_FIELDS: [&str; 3] = ["timestamp", "createdAt", "date"];

/// One report row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseRow {
    /// Report id
    pub id: String,
    /// One-line summary
    pub summary: String,
    /// Status tag
    pub status: String,
    /// Priority text
    pub priority: String,
    /// Where it happened
    pub location: String,
    /// When it was submitted
    pub submitted: String,
}

impl CaseRow {
    fn from_report(report: &Report) -> Self {
        let first_of = |fields: &[&str]| {
            fields
                .iter()
                .find_map(|field| report.attribute_str(field))
                .filter(|value| !value.is_empty())
                .unwrap_or(PLACEHOLDER)
                .to_string()
        };

        Self {
            id: report.id.clone(),
            summary: first_of(&SUMMARY_FIELDS),
            status: report.status().to_string(),
            priority: report.priority().to_string(),
            location: first_of(&["location"]),
            submitted: first_of(&SUBMITTED_FIELDS),
        }
    }
}

/// Every report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseList {
    /// Rows in store order
    pub rows: Vec<CaseRow>,
}

impl CaseList {
    /// Build from all reports
    #[must_use]
    pub fn new(reports: &[Report]) -> Self {
        Self {
            rows: reports.iter().map(CaseRow::from_report).collect(),
        }
    }
}

/// Reports whose priority is urgent or high
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CriticalCases {
    /// Critical rows in store order
    pub rows: Vec<CaseRow>,
}

impl CriticalCases {
    /// Build from all reports, keeping the critical ones
    #[must_use]
    pub fn new(reports: &[Report]) -> Self {
        Self {
            rows: reports
                .iter()
                .filter(|report| report.is_critical())
                .map(CaseRow::from_report)
                .collect(),
        }
    }
}

/// One feedback row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackRow {
    /// Feedback id
    pub id: String,
    /// Message text
    pub message: String,
    /// Submission time
    pub timestamp: String,
    /// Submitting user, or `Anonymous`
    pub user: String,
    /// Rating, formatted, or a placeholder
    pub rating: String,
}

/// Every feedback entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackList {
    /// Rows in store order
    pub rows: Vec<FeedbackRow>,
}

impl FeedbackList {
    /// Build from all feedback
    #[must_use]
    pub fn new(feedback: &[Feedback]) -> Self {
        Self {
            rows: feedback
                .iter()
                .map(|entry| FeedbackRow {
                    id: entry.id.clone(),
                    message: entry.message.clone(),
                    timestamp: entry.timestamp.clone(),
                    user: entry
                        .user_id
                        .clone()
                        .unwrap_or_else(|| "Anonymous".to_string()),
                    rating: entry
                        .rating
                        .map_or_else(|| PLACEHOLDER.to_string(), |rating| format!("{rating}")),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use safespeak_core::Document;
    use serde_json::{Value, json};

    fn report(id: &str, fields: Value) -> Report {
        let Value::Object(fields) = fields else {
            panic!("fields must be an object");
        };
        Report::from_document(Document::new(id, fields))
    }

    #[test]
    fn test_case_row_summary_fallbacks() {
        let reports = vec![
            report("r1", json!({"title": "Stolen bicycle", "status": "pending", "location": "Campus"})),
            report("r2", json!({"crimeType": "Vandalism", "createdAt": "2024-03-01"})),
            report("r3", json!({"title": ""})),
        ];

        let list = CaseList::new(&reports);

        assert_eq!(list.rows[0].summary, "Stolen bicycle");
        assert_eq!(list.rows[0].location, "Campus");
        assert_eq!(list.rows[1].summary, "Vandalism");
        assert_eq!(list.rows[1].submitted, "2024-03-01");
        assert_eq!(list.rows[1].status, "unknown");
        assert_eq!(list.rows[2].summary, PLACEHOLDER);
    }

    #[test]
    fn test_critical_cases_filter_internally() {
        let reports = vec![
            report("r1", json!({"priority": "Urgent"})),
            report("r2", json!({"priority": "low"})),
            report("r3", json!({"priority": "HIGH", "status": "resolved"})),
        ];

        let ids: Vec<_> = CriticalCases::new(&reports)
            .rows
            .into_iter()
            .map(|row| row.id)
            .collect();
        assert_eq!(ids, vec!["r1", "r3"]);
    }

    #[test]
    fn test_feedback_rows() {
        let feedback = vec![
            Feedback::from_document(Document::new(
                "f1",
                serde_json::from_value(json!({"message": "Helpful", "userId": "u1", "rating": 4.5}))
                    .unwrap(),
            )),
            Feedback::from_document(Document::new(
                "f2",
                serde_json::from_value(json!({"message": "Anonymous note"})).unwrap(),
            )),
        ];

        let list = FeedbackList::new(&feedback);

        assert_eq!(list.rows[0].user, "u1");
        assert_eq!(list.rows[0].rating, "4.5");
        assert_eq!(list.rows[1].user, "Anonymous");
        assert_eq!(list.rows[1].rating, PLACEHOLDER);
    }
}
