//! Document store abstraction

use crate::error::BackendResult;
use async_trait::async_trait;
use safespeak_core::Document;

/// Read access to named collections of a document store
///
/// The dashboard only ever reads a collection wholesale: no filtering,
/// ordering or paging parameters reach the caller.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read every document of `collection`
    ///
    /// `credential` is the signed-in administrator's bearer token, when the
    /// store needs one. A collection that does not exist reads as empty.
    async fn list_documents(
        &self,
        collection: &str,
        credential: Option<&str>,
    ) -> BackendResult<Vec<Document>>;

    /// Store name for logs
    fn name(&self) -> &str;
}
