//! User-visible notifications (toasts)
//!
//! Notifications are fire-and-forget: producers push them and never learn
//! whether they were shown. The web surface queues them per client and renders
//! them on the client's next page.

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Visual treatment of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Informational
    #[default]
    Default,
    /// Something failed
    Destructive,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("default"),
            Self::Destructive => f.write_str("destructive"),
        }
    }
}

/// A toast shown to the administrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Short heading
    pub title: String,
    /// Body text
    pub description: String,
    /// Visual treatment
    pub variant: Variant,
}

impl Notification {
    /// Informational notification
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: Variant::Default,
        }
    }

    /// Error notification
    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: Variant::Destructive,
        }
    }
}

/// Anything that can surface a notification
pub trait Notifier: Send + Sync {
    /// Surface `notification`; delivery is not acknowledged
    fn notify(&self, notification: Notification);
}

/// Clients that may hold queued notifications at once
pub const MAX_QUEUED_CLIENTS: usize = 10_000;

/// Notifications kept per client; older ones are dropped first
pub const MAX_QUEUED_PER_CLIENT: usize = 8;

/// How long an undelivered notification is kept
pub const TOAST_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug)]
struct Pending {
    notifications: Vec<Notification>,
    updated: Instant,
}

/// Pending notifications per client
///
/// The queue is bounded: entries expire after a time limit, each client keeps
/// a fixed number of notifications, and new clients are refused once the
/// client limit is reached and nothing has expired.
#[derive(Debug)]
pub struct ToastQueue {
    pending: DashMap<String, Pending>,
    max_clients: usize,
    max_per_client: usize,
    ttl: Duration,
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::with_limits(MAX_QUEUED_CLIENTS, MAX_QUEUED_PER_CLIENT, TOAST_TTL)
    }
}

impl ToastQueue {
    /// Create an empty queue with the default limits
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty queue with explicit limits
    #[must_use]
    pub fn with_limits(max_clients: usize, max_per_client: usize, ttl: Duration) -> Self {
        Self {
            pending: DashMap::new(),
            max_clients,
            max_per_client: max_per_client.max(1),
            ttl,
        }
    }

    /// Queue a notification for `client`
    pub fn push(&self, client: &str, notification: Notification) {
        if !self.pending.contains_key(client) && self.pending.len() >= self.max_clients {
            self.sweep();
            if self.pending.len() >= self.max_clients {
                warn!(
                    clients = self.pending.len(),
                    title = %notification.title,
                    "Toast queue full, dropping notification"
                );
                return;
            }
        }

        let mut pending = self
            .pending
            .entry(client.to_string())
            .or_insert_with(|| Pending {
                notifications: Vec::new(),
                updated: Instant::now(),
            });
        if pending.notifications.len() >= self.max_per_client {
            pending.notifications.remove(0);
        }
        pending.notifications.push(notification);
        pending.updated = Instant::now();
    }

    /// Take every live notification queued for `client`
    #[must_use]
    pub fn drain(&self, client: &str) -> Vec<Notification> {
        self.pending
            .remove(client)
            .filter(|(_, pending)| pending.updated.elapsed() < self.ttl)
            .map(|(_, pending)| pending.notifications)
            .unwrap_or_default()
    }

    /// Drop expired entries, returning how many clients were removed
    pub fn sweep(&self) -> usize {
        let before = self.pending.len();
        self.pending
            .retain(|_, pending| pending.updated.elapsed() < self.ttl);
        let removed = before.saturating_sub(self.pending.len());
        if removed > 0 {
            debug!(removed, "Expired queued notifications");
        }
        removed
    }

    /// Number of clients with queued notifications
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is queued
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// A notifier that queues for one client
    #[must_use]
    pub const fn for_client<'a>(&'a self, client: &'a str) -> ClientToasts<'a> {
        ClientToasts {
            queue: self,
            client,
        }
    }
}

/// [`Notifier`] bound to one client's queue
#[derive(Debug, Clone, Copy)]
pub struct ClientToasts<'a> {
    queue: &'a ToastQueue,
    client: &'a str,
}

impl Notifier for ClientToasts<'_> {
    fn notify(&self, notification: Notification) {
        info!(
            title = %notification.title,
            variant = %notification.variant,
            "Notification queued"
        );
        self.queue.push(self.client, notification);
    }
}

/// Logs notifications that no page will display
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOnly;

impl Notifier for LogOnly {
    fn notify(&self, notification: Notification) {
        info!(
            title = %notification.title,
            variant = %notification.variant,
            "Notification not delivered: {}",
            notification.description
        );
    }
}

/// Keeps every notification it receives; for tests and diagnostics
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    received: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Create an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything received so far
    #[must_use]
    pub fn received(&self) -> Vec<Notification> {
        self.received.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.received.lock().push(notification);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_queue_is_per_client_and_drains_once() {
        let queue = ToastQueue::new();
        queue
            .for_client("a")
            .notify(Notification::error("Error", "Failed to fetch data from the database."));
        queue.push("b", Notification::info("Logged Out", "You have been successfully logged out."));

        let drained = queue.drain("a");
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].variant, Variant::Destructive);
        assert!(queue.drain("a").is_empty());
        assert_eq!(queue.drain("b")[0].title, "Logged Out");
    }

    #[test]
    fn test_queue_is_bounded() {
        let queue = ToastQueue::with_limits(3, 2, TOAST_TTL);

        for n in 0..50 {
            queue.push(&format!("client-{n}"), Notification::error("Login Failed", "x"));
        }
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.drain("client-0").len(), 1);
        assert!(queue.drain("client-49").is_empty());

        for n in 0..5 {
            queue.push("client-1", Notification::info(format!("t{n}"), "d"));
        }
        let titles: Vec<_> = queue.drain("client-1").into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["t3", "t4"]);
    }

    #[test]
    fn test_expired_entries_are_swept_and_not_delivered() {
        let queue = ToastQueue::with_limits(2, 4, Duration::ZERO);

        queue.push("a", Notification::info("Logged Out", "bye"));
        queue.push("b", Notification::info("Logged Out", "bye"));
        assert!(queue.drain("a").is_empty());

        // A full queue makes room by sweeping expired clients
        queue.push("c", Notification::info("Logged Out", "bye"));
        queue.push("d", Notification::info("Logged Out", "bye"));
        assert_eq!(queue.len(), 1);

        assert_eq!(queue.sweep(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_variant_rendering() {
        assert_eq!(Variant::Destructive.to_string(), "destructive");
        assert_eq!(
            serde_json::to_value(Notification::info("t", "d")).unwrap()["variant"],
            "default"
        );
    }
}
