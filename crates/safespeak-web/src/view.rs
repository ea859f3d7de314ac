//! Dashboard view model: stat tiles, progress breakdown, tabs
//!
//! [`Dashboard`] starts in the loading state, is mounted once against a
//! [`DataFetcher`], and from then on renders [`DashboardView::Ready`]
//! regardless of whether the fetch succeeded.

use crate::fetcher::{DataFetcher, Snapshot};
use crate::notify::{Notification, Notifier};
use crate::panels::{CaseList, CriticalCases, FeedbackList};
use safespeak_core::{Breakdown, DashboardStats};
use serde::Serialize;
use tracing::{error, info};

/// Dashboard tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    /// Every report
    #[default]
    Cases,
    /// Urgent and high priority reports
    Critical,
    /// User feedback
    Feedback,
}

impl Tab {
    /// Tabs in display order
    pub const ALL: [Self; 3] = [Self::Cases, Self::Critical, Self::Feedback];

    /// Tab for a query value; anything unrecognised selects the default tab
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        value
            .and_then(|value| Self::ALL.into_iter().find(|tab| tab.key() == value))
            .unwrap_or_default()
    }

    /// Query value
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Cases => "cases",
            Self::Critical => "critical",
            Self::Feedback => "feedback",
        }
    }

    /// Heading
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cases => "Case Management",
            Self::Critical => "Critical Cases",
            Self::Feedback => "User Feedback",
        }
    }
}

/// One headline number
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatTile {
    /// Caption
    pub label: &'static str,
    /// Count shown
    pub value: usize,
    /// Colour hint for the template
    pub tone: &'static str,
}

/// Entry in the tab switcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabLink {
    /// Tab shown
    pub tab: Tab,
    /// Heading
    pub label: &'static str,
    /// Whether this is the selected tab
    pub active: bool,
}

/// The active tab's sub-view
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TabPanel {
    /// Case management
    Cases(CaseList),
    /// Critical cases
    Critical(CriticalCases),
    /// User feedback
    Feedback(FeedbackList),
}

/// Everything shown once loading is over
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadyView {
    /// Total, solved, pending, critical
    pub tiles: Vec<StatTile>,
    /// Case progress overview
    pub breakdown: Breakdown,
    /// Tab switcher
    pub tabs: Vec<TabLink>,
    /// Selected tab
    pub active_tab: Tab,
    /// Selected tab's content
    pub panel: TabPanel,
}

/// What the dashboard shows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum DashboardView {
    /// Fetch still in flight
    Loading,
    /// Fetch finished, successfully or not
    Ready(ReadyView),
}

/// Dashboard page state
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    loading: bool,
    snapshot: Snapshot,
    stats: DashboardStats,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    /// A dashboard that has not loaded yet
    #[must_use]
    pub const fn new() -> Self {
        Self {
            loading: true,
            snapshot: Snapshot {
                reports: Vec::new(),
                feedback: Vec::new(),
            },
            stats: DashboardStats::empty(),
        }
    }

    /// Fetch both collections and derive the statistics
    ///
    /// Either both collections are applied or neither is. A failure is logged
    /// and surfaced as one error notification. Loading clears in every case.
    /// Returns whether the collections were applied.
    pub async fn mount(
        &mut self,
        fetcher: &DataFetcher,
        credential: Option<&str>,
        notifier: &dyn Notifier,
    ) -> bool {
        let loaded = match fetcher.fetch_all(credential).await.into_snapshot() {
            Ok(snapshot) => {
                self.stats = DashboardStats::compute(&snapshot.reports);
                self.snapshot = snapshot;
                info!(
                    reports = self.stats.counts.total,
                    feedback = self.snapshot.feedback.len(),
                    "Dashboard loaded"
                );
                true
            }
            Err(e) => {
                error!("Error fetching data: {e}");
                notifier.notify(Notification::error(
                    "Error",
                    "Failed to fetch data from the database.",
                ));
                false
            }
        };
        self.loading = false;
        loaded
    }

    /// Whether the fetch is still outstanding
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Derived statistics; zero until a successful mount
    #[must_use]
    pub const fn stats(&self) -> &DashboardStats {
        &self.stats
    }

    /// Records applied by the last successful mount
    #[must_use]
    pub const fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Compose the view with `active` selected; only that tab's panel is built
    #[must_use]
    pub fn view(&self, active: Tab) -> DashboardView {
        if self.loading {
            return DashboardView::Loading;
        }

        let counts = &self.stats.counts;
        let tiles = vec![
            StatTile {
                label: "Total Reports",
                value: counts.total,
                tone: "primary",
            },
            StatTile {
                label: "Solved Cases",
                value: counts.resolved,
                tone: "success",
            },
            StatTile {
                label: "Pending Review",
                value: counts.pending,
                tone: "warning",
            },
            StatTile {
                label: "Critical Cases",
                value: counts.critical,
                tone: "danger",
            },
        ];

        let tabs = Tab::ALL
            .into_iter()
            .map(|tab| TabLink {
                tab,
                label: tab.label(),
                active: tab == active,
            })
            .collect();

        let panel = match active {
            Tab::Cases => TabPanel::Cases(CaseList::new(&self.snapshot.reports)),
            Tab::Critical => TabPanel::Critical(CriticalCases::new(&self.snapshot.reports)),
            Tab::Feedback => TabPanel::Feedback(FeedbackList::new(&self.snapshot.feedback)),
        };

        DashboardView::Ready(ReadyView {
            tiles,
            breakdown: self.stats.breakdown.clone(),
            tabs,
            active_tab: active,
            panel,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use crate::notify::{RecordingNotifier, Variant};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use safespeak_backend::MemoryStore;
    use safespeak_core::config::DashboardConfig;
    use serde_json::json;
    use std::sync::Arc;

    fn seeded() -> Arc<MemoryStore> {
        Arc::new(
            MemoryStore::from_seed(json!({
                "reports": [
                    {"id": "r1", "status": "resolved"},
                    {"id": "r2", "status": "pending"},
                    {"id": "r3", "status": "pending", "priority": "high"}
                ],
                "feedback": [{"id": "f1", "message": "Quick response"}]
            }))
            .unwrap(),
        )
    }

    fn ready(view: DashboardView) -> ReadyView {
        match view {
            DashboardView::Ready(ready) => ready,
            DashboardView::Loading => panic!("dashboard still loading"),
        }
    }

    #[rstest]
    #[case(None, Tab::Cases)]
    #[case(Some("cases"), Tab::Cases)]
    #[case(Some("critical"), Tab::Critical)]
    #[case(Some("feedback"), Tab::Feedback)]
    #[case(Some("Feedback"), Tab::Cases)]
    #[case(Some("settings"), Tab::Cases)]
    fn test_tab_parse(#[case] value: Option<&str>, #[case] expected: Tab) {
        assert_eq!(Tab::parse(value), expected);
    }

    #[test]
    fn test_loading_until_mounted() {
        let dashboard = Dashboard::new();
        assert!(dashboard.is_loading());
        assert_eq!(dashboard.view(Tab::Cases), DashboardView::Loading);
    }

    #[tokio::test]
    async fn test_mount_applies_snapshot() {
        let fetcher = DataFetcher::new(seeded(), &DashboardConfig::default());
        let notifier = RecordingNotifier::new();
        let mut dashboard = Dashboard::new();

        assert!(dashboard.mount(&fetcher, None, &notifier).await);

        assert!(!dashboard.is_loading());
        assert!(notifier.received().is_empty());

        let view = ready(dashboard.view(Tab::Cases));
        let tiles: Vec<_> = view.tiles.iter().map(|t| (t.label, t.value)).collect();
        assert_eq!(
            tiles,
            vec![
                ("Total Reports", 3),
                ("Solved Cases", 1),
                ("Pending Review", 2),
                ("Critical Cases", 1),
            ]
        );
        assert_eq!(
            view.breakdown.share("Pending Review").unwrap().percent.to_string(),
            "66.7"
        );
    }

    #[tokio::test]
    async fn test_mount_failure_clears_loading_and_notifies_once() {
        let store = seeded();
        store.fail_collection("feedback", "deadline exceeded");
        let fetcher = DataFetcher::new(store, &DashboardConfig::default());
        let notifier = RecordingNotifier::new();
        let mut dashboard = Dashboard::new();

        assert!(!dashboard.mount(&fetcher, None, &notifier).await);

        assert!(!dashboard.is_loading());
        let received = notifier.received();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].title, "Error");
        assert_eq!(received[0].description, "Failed to fetch data from the database.");
        assert_eq!(received[0].variant, Variant::Destructive);

        // Reports succeeded but are not applied
        assert!(dashboard.snapshot().reports.is_empty());
        let view = ready(dashboard.view(Tab::Cases));
        assert!(view.tiles.iter().all(|tile| tile.value == 0));
        assert_eq!(view.breakdown, Breakdown::NoData);
    }

    #[tokio::test]
    async fn test_only_active_panel_is_built() {
        let fetcher = DataFetcher::new(seeded(), &DashboardConfig::default());
        let mut dashboard = Dashboard::new();
        dashboard
            .mount(&fetcher, None, &RecordingNotifier::new())
            .await;

        let view = ready(dashboard.view(Tab::Critical));
        let TabPanel::Critical(critical) = &view.panel else {
            panic!("expected the critical panel");
        };
        assert_eq!(critical.rows.len(), 1);
        assert_eq!(critical.rows[0].id, "r3");

        let active: Vec<_> = view.tabs.iter().filter(|t| t.active).map(|t| t.tab).collect();
        assert_eq!(active, vec![Tab::Critical]);
    }

    #[tokio::test]
    async fn test_view_serializes_for_the_api() {
        let fetcher = DataFetcher::new(seeded(), &DashboardConfig::default());
        let mut dashboard = Dashboard::new();
        dashboard
            .mount(&fetcher, None, &RecordingNotifier::new())
            .await;

        let value = serde_json::to_value(dashboard.view(Tab::Feedback)).unwrap();
        assert_eq!(value["state"], "ready");
        assert_eq!(value["active_tab"], "feedback");
        assert_eq!(value["panel"]["kind"], "feedback");
        assert_eq!(value["panel"]["rows"][0]["message"], "Quick response");
        assert_eq!(value["tiles"][0]["value"], 3);
    }
}
