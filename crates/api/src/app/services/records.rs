//! Shared CRUD plumbing over one document collection.

use std::sync::Arc;

use soil_core::{Document, DocumentId, ExpectedVersion};
use soil_infra::{DocumentStore, Query, StoreError};

use crate::app::errors::ApiError;

/// A collection exposed as an HTTP resource.
pub trait Resource: Document<Id = DocumentId> {
    /// Message for a path id that does not parse.
    const INVALID_ID: &'static str;

    /// Route prefix; `Location` headers point at `{PATH}/{id}`.
    const PATH: &'static str;
}

/// Typed handle on a collection that speaks `ApiError`.
pub struct Records<D> {
    store: Arc<dyn DocumentStore<D>>,
}

impl<D> Clone for Records<D> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<D: Resource> Records<D> {
    pub fn new(store: Arc<dyn DocumentStore<D>>) -> Self {
        Self { store }
    }

    pub fn parse_id(raw: &str) -> Result<DocumentId, ApiError> {
        raw.parse()
            .map_err(|_| ApiError::bad_request(D::INVALID_ID))
    }

    pub fn not_found() -> ApiError {
        ApiError::NotFound(format!("{} not found", D::NOUN))
    }

    pub fn location(id: DocumentId) -> String {
        format!("{}/{}", D::PATH, id)
    }

    pub async fn find(&self, query: Query) -> Result<Vec<D>, ApiError> {
        self.store
            .find(&query)
            .await
            .map_err(|e| store_failure::<D>("find", e))
    }

    /// Parse `raw_id` and load the document, or fail with 400/404.
    pub async fn get(&self, raw_id: &str) -> Result<D, ApiError> {
        let id = Self::parse_id(raw_id)?;
        self.store
            .get(id)
            .await
            .map_err(|e| store_failure::<D>("get", e))?
            .ok_or_else(Self::not_found)
    }

    pub async fn insert(&self, doc: D) -> Result<D, ApiError> {
        self.store
            .insert(doc)
            .await
            .map_err(|e| store_failure::<D>("insert", e))
    }

    pub async fn replace(&self, doc: D, expected: ExpectedVersion) -> Result<D, ApiError> {
        match self.store.replace(doc, expected).await {
            Ok(doc) => Ok(doc),
            // Deleted between the lookup and the write.
            Err(StoreError::NotFound) => Err(Self::not_found()),
            Err(StoreError::Conflict(detail)) => {
                tracing::info!(collection = D::COLLECTION, %detail, "version conflict");
                Err(ApiError::Conflict(format!(
                    "{} was modified by another request",
                    D::NOUN
                )))
            }
            Err(e) => Err(store_failure::<D>("replace", e)),
        }
    }

    /// Returns the confirmation message sent to the client.
    pub async fn delete(&self, raw_id: &str) -> Result<String, ApiError> {
        let id = Self::parse_id(raw_id)?;
        let deleted = self
            .store
            .delete(id)
            .await
            .map_err(|e| store_failure::<D>("delete", e))?;
        if !deleted {
            return Err(Self::not_found());
        }
        Ok(format!("{} deleted successfully", D::NOUN))
    }
}

/// Log a store failure with its detail, then hand it on for mapping.
pub(crate) fn store_failure<D: Document>(operation: &'static str, err: StoreError) -> ApiError {
    tracing::error!(
        collection = D::COLLECTION,
        operation,
        error = %err,
        "store operation failed"
    );
    ApiError::Store(err)
}
