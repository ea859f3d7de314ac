//! Record types read from the document store

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Untyped fields carried alongside the typed core of a record
pub type Attributes = serde_json::Map<String, Value>;

/// Sentinel returned by accessors when a field is missing or not a string
pub const UNKNOWN: &str = "unknown";

/// Report status tag for closed cases
pub const STATUS_RESOLVED: &str = "resolved";

/// Report status tag for cases awaiting review
pub const STATUS_PENDING: &str = "pending";

/// Report status tag for cases being worked on
pub const STATUS_UNDER_INVESTIGATION: &str = "under-investigation";

/// Lower-cased priorities that make a report critical
pub const CRITICAL_PRIORITIES: [&str; 2] = ["urgent", "high"];

/// A raw document: the store-assigned id plus the document's own fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Store-assigned identifier
    pub id: String,

    /// Document fields
    #[serde(default)]
    pub fields: Attributes,
}

impl Document {
    /// Create a document from an id and a field map
    pub fn new(id: impl Into<String>, fields: Attributes) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// Removes `key` from `fields` when it holds a string, leaving other shapes untouched
fn take_string(fields: &mut Attributes, key: &str) -> Option<String> {
    match fields.get(key) {
        Some(Value::String(_)) => match fields.remove(key) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        },
        _ => None,
    }
}

/// A submitted incident report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Store-assigned identifier
    pub id: String,

    /// Case status (`resolved`, `pending`, `under-investigation`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Free-text priority
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,

    /// Fields owned by other components
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl Report {
    /// Build a report from a store document
    ///
    /// Non-string `status`/`priority` values are kept in `attributes` and the
    /// typed field is left empty.
    #[must_use]
    pub fn from_document(document: Document) -> Self {
        let Document { id, mut fields } = document;
        // The store id is authoritative; a stored `id` field would serialize twice
        fields.remove("id");
        let status = take_string(&mut fields, "status");
        let priority = take_string(&mut fields, "priority");

        Self {
            id,
            status,
            priority,
            attributes: fields,
        }
    }

    /// Status tag, or [`UNKNOWN`]
    #[must_use]
    pub fn status(&self) -> &str {
        self.status.as_deref().unwrap_or(UNKNOWN)
    }

    /// Priority text, or [`UNKNOWN`]
    #[must_use]
    pub fn priority(&self) -> &str {
        self.priority.as_deref().unwrap_or(UNKNOWN)
    }

    /// Whether the status equals `tag` exactly
    #[must_use]
    pub fn has_status(&self, tag: &str) -> bool {
        self.status.as_deref() == Some(tag)
    }

    /// Whether the priority is `urgent` or `high`, ignoring case
    #[must_use]
    pub fn is_critical(&self) -> bool {
        self.priority.as_deref().is_some_and(|priority| {
            CRITICAL_PRIORITIES
                .iter()
                .any(|critical| priority.eq_ignore_ascii_case(critical))
        })
    }

    /// Look up an untyped attribute as a string
    #[must_use]
    pub fn attribute_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }
}

/// A user-submitted comment or rating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    /// Store-assigned identifier
    pub id: String,

    /// Feedback text
    #[serde(default)]
    pub message: String,

    /// Submission time as stored
    #[serde(default)]
    pub timestamp: String,

    /// Submitting user, when known
    #[serde(default, rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Numeric rating, when given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,

    /// Remaining fields
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl Feedback {
    /// Build a feedback entry from a store document
    #[must_use]
    pub fn from_document(document: Document) -> Self {
        let Document { id, mut fields } = document;
        fields.remove("id");
        let message = take_string(&mut fields, "message").unwrap_or_default();
        let timestamp = take_string(&mut fields, "timestamp").unwrap_or_default();
        let user_id = take_string(&mut fields, "userId");
        let rating = match fields.get("rating").and_then(Value::as_f64) {
            Some(rating) => {
                fields.remove("rating");
                Some(rating)
            }
            None => None,
        };

        Self {
            id,
            message,
            timestamp,
            user_id,
            rating,
            attributes: fields,
        }
    }
}
