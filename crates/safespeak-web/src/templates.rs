//! HTML pages rendered with askama

use crate::notify::Notification;
use crate::panels::{CaseRow, FeedbackRow};
use crate::view::{DashboardView, StatTile, TabLink, TabPanel};
use askama::Template;
use safespeak_core::Breakdown;

/// Sign-in page
#[derive(Debug, Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    /// Pending toasts
    pub toasts: Vec<Notification>,
}

/// Breakdown row with its percentage pre-formatted
#[derive(Debug, Clone)]
pub struct ShareRow {
    /// Category
    pub label: &'static str,
    /// Reports in the category
    pub count: usize,
    /// One-decimal percentage
    pub percent: String,
}

/// Administrator dashboard
#[derive(Debug, Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage {
    /// Pending toasts
    pub toasts: Vec<Notification>,
    /// Signed-in administrator
    pub email: String,
    /// Fetch still outstanding
    pub loading: bool,
    /// Headline numbers
    pub tiles: Vec<StatTile>,
    /// Whether any report exists
    pub has_data: bool,
    /// Case progress overview
    pub shares: Vec<ShareRow>,
    /// Tab switcher
    pub tabs: Vec<TabLink>,
    /// Heading of the selected tab
    pub active_label: &'static str,
    /// Key of the selected tab
    pub active_tab: &'static str,
    /// Report rows for the case and critical tabs
    pub cases: Vec<CaseRow>,
    /// Feedback rows for the feedback tab
    pub feedback: Vec<FeedbackRow>,
}

impl DashboardPage {
    /// Flatten a composed view for the template
    #[must_use]
    pub fn new(email: String, toasts: Vec<Notification>, view: DashboardView) -> Self {
        let mut page = Self {
            toasts,
            email,
            loading: true,
            tiles: Vec::new(),
            has_data: false,
            shares: Vec::new(),
            tabs: Vec::new(),
            active_label: "",
            active_tab: "",
            cases: Vec::new(),
            feedback: Vec::new(),
        };

        let DashboardView::Ready(ready) = view else {
            return page;
        };

        page.loading = false;
        page.tiles = ready.tiles;
        page.tabs = ready.tabs;
        page.active_label = ready.active_tab.label();
        page.active_tab = ready.active_tab.key();
        if let Breakdown::Shares(shares) = ready.breakdown {
            page.has_data = true;
            page.shares = shares
                .into_iter()
                .map(|share| ShareRow {
                    label: share.label,
                    count: share.count,
                    percent: share.percent.to_string(),
                })
                .collect();
        }
        match ready.panel {
            TabPanel::Cases(list) => page.cases = list.rows,
            TabPanel::Critical(list) => page.cases = list.rows,
            TabPanel::Feedback(list) => page.feedback = list.rows,
        }

        page
    }
}
