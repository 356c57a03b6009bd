//! In-memory implementation of the document store.
//!
//! Backs the service tests and local experimentation; holds each collection
//! as an insertion-ordered vector behind an async `RwLock`. Sorting is
//! stable, so documents with equal timestamps stay in insertion order.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use salto_core::DocumentId;

use super::{Collection, Document, DocumentStore, Sort, StoreError, StoredDocument};

/// Document store held entirely in process memory.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<&'static str, Vec<StoredDocument>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// True when every filter key is present in the document with an equal value.
fn matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, value)| doc.get(key) == Some(value))
}

/// Millisecond timestamp used for ordering; absent fields sort first.
fn sort_key(doc: &Document, field: &str) -> i64 {
    doc.get(field).and_then(serde_json::Value::as_i64).unwrap_or(0)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_one(
        &self,
        collection: Collection,
        fields: Document,
    ) -> Result<DocumentId, StoreError> {
        let id = DocumentId::generate();
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.name())
            .or_default()
            .push(StoredDocument { id, fields });
        Ok(id)
    }

    async fn find_one(
        &self,
        collection: Collection,
        id: DocumentId,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection.name())
            .and_then(|docs| docs.iter().find(|doc| doc.id == id))
            .cloned())
    }

    async fn find_many(
        &self,
        collection: Collection,
        filter: Document,
        sort: Option<Sort>,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let collections = self.collections.read().await;
        let mut found: Vec<StoredDocument> = collections
            .get(collection.name())
            .map(|docs| {
                docs.iter()
                    .filter(|doc| matches(&doc.fields, &filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(sort) = sort {
            found.sort_by_key(|doc| sort_key(&doc.fields, sort.field));
            if sort.descending {
                found.reverse();
            }
        }

        Ok(found)
    }

    async fn update_one(
        &self,
        collection: Collection,
        id: DocumentId,
        set: Document,
    ) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(doc) = collections
            .get_mut(collection.name())
            .and_then(|docs| docs.iter_mut().find(|doc| doc.id == id))
        else {
            return Ok(false);
        };

        for (key, value) in set {
            doc.fields.insert(key, value);
        }
        Ok(true)
    }

    async fn delete_one(
        &self,
        collection: Collection,
        id: DocumentId,
    ) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection.name()) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|doc| doc.id != id);
        Ok(docs.len() < before)
    }

    async fn delete_many(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<u64, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection.name()) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|doc| !matches(&doc.fields, &filter));
        Ok((before - docs.len()) as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
