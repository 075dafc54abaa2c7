use soil_core::{Document, ExpectedVersion};

use super::query::{Filter, Query};

/// Errors surfaced by a [`DocumentStore`].
///
/// Variants are classified by what a caller can do about them, not by which
/// backend produced them.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend unreachable (connection refused, pool closed, TLS failure).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The backend did not answer in time (e.g. pool acquire timeout).
    #[error("store timed out: {0}")]
    Timeout(String),

    /// A uniqueness / integrity constraint rejected the write.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// Optimistic concurrency check failed.
    #[error("version conflict: {0}")]
    Conflict(String),

    /// Replace targeted a document that does not exist.
    #[error("document not found")]
    NotFound,

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("store error: {0}")]
    Unknown(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Storage for one collection of documents.
///
/// Implementations must:
/// - stamp version `1` on insert and bump the version by one on every replace
/// - reject a replace whose [`ExpectedVersion`] does not match (`Conflict`)
/// - return `NotFound` when replacing a missing document
/// - honour the query's filter, ordering and limit
#[async_trait::async_trait]
pub trait DocumentStore<D: Document>: Send + Sync {
    /// Insert a new document. Returns the stored copy (with its version set).
    async fn insert(&self, doc: D) -> Result<D, StoreError>;

    async fn get(&self, id: D::Id) -> Result<Option<D>, StoreError>;

    /// Documents matching `query`, in the query's order.
    async fn find(&self, query: &Query) -> Result<Vec<D>, StoreError>;

    /// First document matching `filter`, if any.
    async fn find_one(&self, filter: Filter) -> Result<Option<D>, StoreError> {
        let mut found = self.find(&Query::filtered(filter).limit(1)).await?;
        Ok(found.pop())
    }

    /// Replace the stored document with the same id.
    async fn replace(&self, doc: D, expected: ExpectedVersion) -> Result<D, StoreError>;

    /// Delete by id. `Ok(false)` when nothing was deleted.
    async fn delete(&self, id: D::Id) -> Result<bool, StoreError>;
}
