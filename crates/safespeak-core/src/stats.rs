//! Aggregate statistics over incident reports
//!
//! Category counts are independent of each other: a report that is both
//! resolved and high priority is counted in both categories, and reports with
//! any other status only contribute to the total.

use crate::types::{
    Report, STATUS_PENDING, STATUS_RESOLVED, STATUS_UNDER_INVESTIGATION,
};
use serde::{Serialize, Serializer};
use std::fmt;

/// Raw counts over a report snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportCounts {
    /// All reports
    pub total: usize,
    /// Reports with status `resolved`
    pub resolved: usize,
    /// Reports with status `pending`
    pub pending: usize,
    /// Reports with status `under-investigation`
    pub under_investigation: usize,
    /// Reports with priority `urgent` or `high`
    pub critical: usize,
}

impl ReportCounts {
    /// Count every category in a single pass
    #[must_use]
    pub fn from_reports(reports: &[Report]) -> Self {
        reports.iter().fold(Self::default(), |mut counts, report| {
            counts.total += 1;
            if report.has_status(STATUS_RESOLVED) {
                counts.resolved += 1;
            }
            if report.has_status(STATUS_PENDING) {
                counts.pending += 1;
            }
            if report.has_status(STATUS_UNDER_INVESTIGATION) {
                counts.under_investigation += 1;
            }
            if report.is_critical() {
                counts.critical += 1;
            }
            counts
        })
    }
}

/// A percentage with one decimal place, stored as tenths of a percent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Percent {
    tenths: u64,
}

impl Percent {
    /// `part / total * 100`, rounded to one decimal with halves rounding up
    ///
    /// Returns `None` when `total` is zero.
    #[must_use]
    pub fn of(part: usize, total: usize) -> Option<Self> {
        if total == 0 {
            return None;
        }
        let part = part as u64;
        let total = total as u64;
        // tenths = round(part * 1000 / total)
        let tenths = (part * 2000 + total) / (total * 2);
        Some(Self { tenths })
    }

    /// Value in tenths of a percent (`333` for 33.3%)
    #[must_use]
    pub const fn tenths(self) -> u64 {
        self.tenths
    }

    /// Value as a float, for progress bar widths
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(self) -> f64 {
        self.tenths as f64 / 10.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.tenths / 10, self.tenths % 10)
    }
}

impl Serialize for Percent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One row of the progress breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryShare {
    /// Display label
    pub label: &'static str,
    /// Reports in the category
    pub count: usize,
    /// Share of the total
    pub percent: Percent,
}

/// Progress breakdown, or the explicit absence of data
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "categories", rename_all = "snake_case")]
pub enum Breakdown {
    /// No reports exist, so no percentages were computed
    NoData,
    /// Per-category shares in display order
    Shares(Vec<CategoryShare>),
}

impl Breakdown {
    /// Build the breakdown from counts, guarding the zero total
    #[must_use]
    pub fn from_counts(counts: &ReportCounts) -> Self {
        let rows = [
            ("Solved", counts.resolved),
            ("Under Investigation", counts.under_investigation),
            ("Pending Review", counts.pending),
            ("Critical Cases", counts.critical),
        ];

        let shares: Option<Vec<CategoryShare>> = rows
            .into_iter()
            .map(|(label, count)| {
                Percent::of(count, counts.total).map(|percent| CategoryShare {
                    label,
                    count,
                    percent,
                })
            })
            .collect();

        shares.map_or(Self::NoData, Self::Shares)
    }

    /// Whether the breakdown carries no data
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::NoData)
    }

    /// Share for a category label
    #[must_use]
    pub fn share(&self, label: &str) -> Option<&CategoryShare> {
        match self {
            Self::NoData => None,
            Self::Shares(shares) => shares.iter().find(|share| share.label == label),
        }
    }
}

/// Everything the dashboard derives from a report snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    /// Raw category counts
    pub counts: ReportCounts,
    /// Percentages, when there is anything to divide by
    pub breakdown: Breakdown,
}

impl DashboardStats {
    /// Aggregate a report snapshot
    #[must_use]
    pub fn compute(reports: &[Report]) -> Self {
        let counts = ReportCounts::from_reports(reports);
        let breakdown = Breakdown::from_counts(&counts);
        Self { counts, breakdown }
    }

    /// Stats for an empty or failed load
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            counts: ReportCounts {
                total: 0,
                resolved: 0,
                pending: 0,
                under_investigation: 0,
                critical: 0,
            },
            breakdown: Breakdown::NoData,
        }
    }
}

impl Default for DashboardStats {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use crate::types::Document;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::{Map, Value, json};

    fn report(status: Option<&str>, priority: Option<&str>) -> Report {
        let mut fields = Map::new();
        if let Some(status) = status {
            fields.insert("status".to_string(), Value::from(status));
        }
        if let Some(priority) = priority {
            fields.insert("priority".to_string(), Value::from(priority));
        }
        Report::from_document(Document::new("r", fields))
    }

    #[test]
    fn test_empty_reports_have_no_data() {
        let stats = DashboardStats::compute(&[]);

        assert_eq!(stats.counts, ReportCounts::default());
        assert!(stats.breakdown.is_empty());
        assert_eq!(stats, DashboardStats::empty());
    }

    #[test]
    fn test_percent_of_zero_total_is_none() {
        assert_eq!(Percent::of(0, 0), None);
        assert_eq!(Percent::of(3, 0), None);
    }

    #[test]
    fn test_one_of_four_is_twenty_five() {
        let reports = vec![
            report(Some("resolved"), None),
            report(Some("pending"), None),
            report(Some("pending"), None),
            report(Some("closed"), None),
        ];

        let stats = DashboardStats::compute(&reports);
        let solved = stats.breakdown.share("Solved").unwrap();

        assert_eq!(solved.count, 1);
        assert_eq!(solved.percent.to_string(), "25.0");
    }

    #[test]
    fn test_three_report_scenario() {
        let reports = vec![
            report(Some("resolved"), None),
            report(Some("pending"), None),
            report(Some("pending"), Some("high")),
        ];

        let stats = DashboardStats::compute(&reports);

        assert_eq!(
            stats.counts,
            ReportCounts {
                total: 3,
                resolved: 1,
                pending: 2,
                under_investigation: 0,
                critical: 1,
            }
        );

        let percent = |label: &str| stats.breakdown.share(label).unwrap().percent.to_string();
        assert_eq!(percent("Solved"), "33.3");
        assert_eq!(percent("Pending Review"), "66.7");
        assert_eq!(percent("Critical Cases"), "33.3");
        assert_eq!(percent("Under Investigation"), "0.0");
    }

    #[test]
    fn test_counts_are_not_a_partition() {
        let reports = vec![
            report(Some("resolved"), Some("urgent")),
            report(Some("archived"), None),
            report(None, Some("HIGH")),
            report(Some("under-investigation"), None),
        ];

        let counts = ReportCounts::from_reports(&reports);

        assert_eq!(counts.total, 4);
        assert_eq!(counts.resolved, 1);
        assert_eq!(counts.under_investigation, 1);
        assert_eq!(counts.pending, 0);
        assert_eq!(counts.critical, 2);
        assert_ne!(
            counts.resolved + counts.pending + counts.under_investigation,
            counts.total
        );
    }

    #[test]
    fn test_uppercase_urgent_is_critical() {
        let counts = ReportCounts::from_reports(&[report(Some("pending"), Some("URGENT"))]);
        assert_eq!(counts.critical, 1);
    }

    #[test]
    fn test_breakdown_display_order() {
        let stats = DashboardStats::compute(&[report(Some("resolved"), None)]);

        match stats.breakdown {
            Breakdown::Shares(shares) => {
                let labels: Vec<_> = shares.iter().map(|share| share.label).collect();
                assert_eq!(
                    labels,
                    vec!["Solved", "Under Investigation", "Pending Review", "Critical Cases"]
                );
            }
            Breakdown::NoData => panic!("expected shares"),
        }
    }

    #[test]
    fn test_percent_rounds_half_up() {
        assert_eq!(Percent::of(1, 16).unwrap().to_string(), "6.3");
        assert_eq!(Percent::of(1, 8).unwrap().to_string(), "12.5");
        assert_eq!(Percent::of(2, 3).unwrap().to_string(), "66.7");
        assert_eq!(Percent::of(5, 5).unwrap().to_string(), "100.0");
        assert!((Percent::of(1, 3).unwrap().as_f64() - 33.3).abs() < f64::EPSILON * 100.0);
    }

    #[test]
    fn test_stats_serialization() {
        let stats = DashboardStats::compute(&[report(Some("resolved"), Some("high"))]);
        let value = serde_json::to_value(&stats).unwrap();

        assert_eq!(value["counts"]["total"], json!(1));
        assert_eq!(value["breakdown"]["state"], json!("shares"));
        assert_eq!(value["breakdown"]["categories"][0]["percent"], json!("100.0"));

        let empty = serde_json::to_value(DashboardStats::empty()).unwrap();
        assert_eq!(empty["breakdown"], json!({"state": "no_data"}));
    }

    fn arb_report() -> impl Strategy<Value = Report> {
        let status = prop::option::of(prop::sample::select(vec![
            "resolved",
            "pending",
            "under-investigation",
            "closed",
            "Resolved",
        ]));
        let priority = prop::option::of(prop::sample::select(vec![
            "urgent", "URGENT", "High", "high", "low", "medium",
        ]));
        (status, priority).prop_map(|(status, priority)| report(status, priority))
    }

    proptest! {
        #[test]
        fn prop_counts_match_independent_filters(reports in prop::collection::vec(arb_report(), 0..64)) {
            let counts = ReportCounts::from_reports(&reports);

            prop_assert_eq!(counts.total, reports.len());
            prop_assert_eq!(counts.resolved, reports.iter().filter(|r| r.status() == "resolved").count());
            prop_assert_eq!(counts.pending, reports.iter().filter(|r| r.status() == "pending").count());
            prop_assert_eq!(
                counts.under_investigation,
                reports.iter().filter(|r| r.status() == "under-investigation").count()
            );
            prop_assert_eq!(
                counts.critical,
                reports.iter().filter(|r| matches!(r.priority().to_lowercase().as_str(), "urgent" | "high")).count()
            );
        }

        #[test]
        fn prop_percentages_are_bounded(reports in prop::collection::vec(arb_report(), 0..64)) {
            let stats = DashboardStats::compute(&reports);

            match stats.breakdown {
                Breakdown::NoData => prop_assert!(reports.is_empty()),
                Breakdown::Shares(shares) => {
                    prop_assert!(!reports.is_empty());
                    for share in shares {
                        prop_assert!(share.percent.tenths() <= 1000);
                        prop_assert!(share.count <= stats.counts.total);
                    }
                }
            }
        }
    }
}
