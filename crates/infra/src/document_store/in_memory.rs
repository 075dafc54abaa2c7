use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::RwLock;

use serde_json::Value;
use uuid::Uuid;

use soil_core::{Document, ExpectedVersion};

use super::query::{timestamp, Query};
use super::r#trait::{DocumentStore, StoreError};

#[derive(Debug, Clone)]
struct Entry<D> {
    doc: D,
    json: Value,
}

/// In-memory document collection.
///
/// Intended for tests/dev. Filters run against each document's JSON form, so
/// query semantics match the Postgres store. Keys are UUIDv7, so map order is
/// insertion order.
#[derive(Debug)]
pub struct InMemoryDocumentStore<D> {
    docs: RwLock<BTreeMap<Uuid, Entry<D>>>,
    unique_fields: Vec<&'static str>,
    _doc: PhantomData<fn() -> D>,
}

impl<D> Default for InMemoryDocumentStore<D> {
    fn default() -> Self {
        Self {
            docs: RwLock::new(BTreeMap::new()),
            unique_fields: Vec::new(),
            _doc: PhantomData,
        }
    }
}

impl<D: Document> InMemoryDocumentStore<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes that would give two documents the same value for `field`.
    pub fn with_unique_field(mut self, field: &'static str) -> Self {
        self.unique_fields.push(field);
        self
    }

    fn check_unique(
        &self,
        docs: &BTreeMap<Uuid, Entry<D>>,
        id: Uuid,
        json: &Value,
    ) -> Result<(), StoreError> {
        for field in &self.unique_fields {
            let Some(value) = json.get(*field).filter(|v| !v.is_null()) else {
                continue;
            };
            let taken = docs
                .iter()
                .any(|(other, entry)| *other != id && entry.json.get(*field) == Some(value));
            if taken {
                return Err(StoreError::Constraint(format!(
                    "duplicate {field} in {}",
                    D::COLLECTION
                )));
            }
        }
        Ok(())
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

#[async_trait::async_trait]
impl<D: Document> DocumentStore<D> for InMemoryDocumentStore<D> {
    async fn insert(&self, mut doc: D) -> Result<D, StoreError> {
        doc.set_version(1);
        let id: Uuid = doc.id().into();
        let json = serde_json::to_value(&doc)?;

        let mut docs = self.docs.write().map_err(|_| poisoned())?;
        if docs.contains_key(&id) {
            return Err(StoreError::Constraint(format!(
                "duplicate id {id} in {}",
                D::COLLECTION
            )));
        }
        self.check_unique(&docs, id, &json)?;
        docs.insert(
            id,
            Entry {
                doc: doc.clone(),
                json,
            },
        );
        Ok(doc)
    }

    async fn get(&self, id: D::Id) -> Result<Option<D>, StoreError> {
        let docs = self.docs.read().map_err(|_| poisoned())?;
        Ok(docs.get(&id.into()).map(|e| e.doc.clone()))
    }

    async fn find(&self, query: &Query) -> Result<Vec<D>, StoreError> {
        let docs = self.docs.read().map_err(|_| poisoned())?;

        // Newest key first so ties on the sort field keep the latest insert on top.
        let mut matched: Vec<&Entry<D>> = docs
            .values()
            .rev()
            .filter(|e| query.filter.matches(&e.json))
            .collect();

        if let Some(sort) = query.sort {
            matched.sort_by_key(|e| std::cmp::Reverse(timestamp(&e.json, sort.field)));
        }

        let limit = query.limit.unwrap_or(usize::MAX);
        Ok(matched.into_iter().take(limit).map(|e| e.doc.clone()).collect())
    }

    async fn replace(&self, mut doc: D, expected: ExpectedVersion) -> Result<D, StoreError> {
        let id: Uuid = doc.id().into();
        let mut docs = self.docs.write().map_err(|_| poisoned())?;

        let current = docs.get(&id).ok_or(StoreError::NotFound)?.doc.version();
        if !expected.matches(current) {
            return Err(StoreError::Conflict(format!(
                "expected {expected:?}, found {current}"
            )));
        }

        doc.set_version(current + 1);
        let json = serde_json::to_value(&doc)?;
        self.check_unique(&docs, id, &json)?;
        docs.insert(
            id,
            Entry {
                doc: doc.clone(),
                json,
            },
        );
        Ok(doc)
    }

    async fn delete(&self, id: D::Id) -> Result<bool, StoreError> {
        let mut docs = self.docs.write().map_err(|_| poisoned())?;
        Ok(docs.remove(&id.into()).is_some())
    }
}
