//! Cloud Firestore REST client

use crate::error::{BackendError, BackendResult};
use crate::store::DocumentStore;
use async_trait::async_trait;
use reqwest::Client;
use safespeak_core::config::FirebaseConfig;
use safespeak_core::{Attributes, Document};
use serde::Deserialize;
use serde_json::{Map, Number, Value};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};

const SERVICE: &str = "firestore";

/// One page of `documents.list`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<RawDocument>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// A document as transmitted, with typed field values
#[derive(Debug, Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

/// Error envelope returned by Google APIs
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Extract a readable message from an error response body
pub(crate) fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => match envelope.error.status {
            Some(status) if !envelope.error.message.is_empty() => {
                format!("{status}: {}", envelope.error.message)
            }
            Some(status) => status,
            None => envelope.error.message,
        },
        Err(_) => body.chars().take(200).collect(),
    }
}

/// Client for reading collections through the Firestore REST API
#[derive(Debug, Clone)]
pub struct FirestoreClient {
    client: Client,
    base_url: String,
    project_id: String,
    database_id: String,
    page_size: u32,
}

impl FirestoreClient {
    /// Build a client from the Firebase section of the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &FirebaseConfig, page_size: u32) -> BackendResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self::with_client(
            client,
            &config.firestore_url,
            &config.project_id,
            &config.database_id,
        )
        .with_page_size(page_size))
    }

    /// Build a client around an existing HTTP client
    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        database_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
            database_id: database_id.into(),
            page_size: 300,
        }
    }

    /// Set the number of documents requested per page
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// URL of a collection
    #[must_use]
    pub fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/projects/{}/databases/{}/documents/{}",
            self.base_url, self.project_id, self.database_id, collection
        )
    }

    async fn fetch_page(
        &self,
        url: &str,
        page_token: Option<&str>,
        credential: Option<&str>,
    ) -> BackendResult<ListDocumentsResponse> {
        let page_size = self.page_size.to_string();
        let mut query: Vec<(&str, &str)> = vec![("pageSize", page_size.as_str())];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let mut request = self.client.get(url).query(&query);
        if let Some(token) = credential {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                service: SERVICE,
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn list_documents(
        &self,
        collection: &str,
        credential: Option<&str>,
    ) -> BackendResult<Vec<Document>> {
        let url = self.collection_url(collection);
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;
        let mut seen_tokens = HashSet::new();
        let mut pages = 0_usize;

        loop {
            let page = self
                .fetch_page(&url, page_token.as_deref(), credential)
                .await?;
            pages += 1;

            for raw in page.documents {
                documents.push(decode_document(raw)?);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => {
                    if !seen_tokens.insert(token.clone()) {
                        warn!(collection, pages, "Firestore repeated a page token, stopping");
                        break;
                    }
                    page_token = Some(token);
                }
                _ => break,
            }
        }

        debug!(
            collection,
            pages,
            documents = documents.len(),
            "Read Firestore collection"
        );
        Ok(documents)
    }

    fn name(&self) -> &str {
        SERVICE
    }
}

/// Convert a transmitted document into a [`Document`]
fn decode_document(raw: RawDocument) -> BackendResult<Document> {
    let id = raw
        .name
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| BackendError::MalformedDocument {
            document: raw.name.clone(),
            reason: "document name has no id segment".to_string(),
        })?
        .to_string();

    let fields = decode_fields(raw.fields, &raw.name)?;
    Ok(Document::new(id, fields))
}

fn decode_fields(fields: Map<String, Value>, document: &str) -> BackendResult<Attributes> {
    fields
        .into_iter()
        .map(|(key, value)| decode_value(value, document).map(|value| (key, value)))
        .collect()
}

/// Convert one Firestore typed value (`{"stringValue": "..."}` etc.) into plain JSON
pub fn decode_value(value: Value, document: &str) -> BackendResult<Value> {
    let malformed = |reason: String| BackendError::MalformedDocument {
        document: document.to_string(),
        reason,
    };

    let mut typed = match value {
        Value::Object(typed) => typed,
        other => return Err(malformed(format!("expected a typed value, got {other}"))),
    };
    let Some(kind) = typed.keys().next().cloned() else {
        return Err(malformed("empty typed value".to_string()));
    };
    let inner = typed.remove(&kind).unwrap_or(Value::Null);

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" | "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => {
            Ok(inner)
        }
        "integerValue" => match inner {
            Value::String(text) => text
                .parse::<i64>()
                .map(Value::from)
                .map_err(|e| malformed(format!("integerValue {text:?}: {e}"))),
            Value::Number(number) => Ok(Value::Number(number)),
            other => Err(malformed(format!("integerValue {other}"))),
        },
        "doubleValue" => match inner {
            Value::Number(number) => Ok(Value::Number(number)),
            // NaN and the infinities travel as strings and have no JSON form
            Value::String(text) => Ok(text
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map_or(Value::Null, Value::Number)),
            other => Err(malformed(format!("doubleValue {other}"))),
        },
        "geoPointValue" => Ok(inner),
        "arrayValue" => {
            let values = match inner {
                Value::Object(mut array) => array.remove("values").unwrap_or(Value::Null),
                _ => Value::Null,
            };
            match values {
                Value::Array(items) => items
                    .into_iter()
                    .map(|item| decode_value(item, document))
                    .collect::<BackendResult<Vec<_>>>()
                    .map(Value::Array),
                _ => Ok(Value::Array(Vec::new())),
            }
        }
        "mapValue" => {
            let fields = match inner {
                Value::Object(mut map) => map.remove("fields").unwrap_or(Value::Null),
                _ => Value::Null,
            };
            match fields {
                Value::Object(fields) => decode_fields(fields, document).map(Value::Object),
                _ => Ok(Value::Object(Map::new())),
            }
        }
        other => Err(malformed(format!("unsupported value type {other}"))),
    }
}
