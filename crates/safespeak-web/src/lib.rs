//! `SafeSpeak` admin dashboard
//!
//! Server-rendered dashboard over the anonymous crime report and feedback
//! collections: headline counts, case progress breakdown, tabbed case and
//! feedback lists, analytics export and administrator sign-in.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod export;
pub mod fetcher;
pub mod handlers;
pub mod notify;
pub mod panels;
pub mod routes;
pub mod server;
pub mod session;
pub mod state;
pub mod templates;
pub mod view;

// Re-export the main entry points
pub use fetcher::{DataFetcher, FetchError, FetchOutcome, Snapshot};
pub use notify::{LogOnly, Notification, Notifier, ToastQueue};
pub use server::build_app;
pub use session::SessionController;
pub use state::AppState;
pub use view::{Dashboard, DashboardView, Tab};
