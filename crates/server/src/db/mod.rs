//! Document store access.
//!
//! The store holds four collections keyed by tenant (`instance_name`) and a
//! UUID primary key. It is a stateless conduit: each operation is one round
//! trip, individually atomic, with no transactions spanning documents.
//!
//! The store is always an explicitly constructed [`DocumentStore`] trait
//! object injected into the services, so tests can substitute the in-memory
//! implementation for the `PostgreSQL` one.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use salto_core::DocumentId;

pub use memory::MemoryStore;
pub use postgres::{PgDocumentStore, create_pool};

/// A stored document body: every field except the primary key.
pub type Document = Map<String, Value>;

/// The collections the application persists to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    ChatSessions,
    Messages,
    BusinessData,
    Users,
}

impl Collection {
    /// Storage name of the collection. Part of the storage contract.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ChatSessions => "chat_sessions",
            Self::Messages => "messages",
            Self::BusinessData => "business_data",
            Self::Users => "users",
        }
    }

    /// All collections, for schema setup.
    pub const ALL: [Self; 4] = [
        Self::ChatSessions,
        Self::Messages,
        Self::BusinessData,
        Self::Users,
    ];
}

/// Sort order for [`DocumentStore::find_many`].
///
/// The field must hold integer millisecond timestamps; field names come from
/// the service layer, never from request input.
#[derive(Debug, Clone, Copy)]
pub struct Sort {
    pub field: &'static str,
    pub descending: bool,
}

impl Sort {
    #[must_use]
    pub const fn ascending(field: &'static str) -> Self {
        Self {
            field,
            descending: false,
        }
    }

    #[must_use]
    pub const fn descending(field: &'static str) -> Self {
        Self {
            field,
            descending: true,
        }
    }
}

/// A document together with its assigned primary key.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub fields: Document,
}

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Raw read/write access to the document collections.
///
/// Filters are equality documents: a row matches when every filter key is
/// present in its body with an equal value. Not-found lookups return `None`
/// or an empty vector, never an error.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a document and return its assigned identifier.
    async fn insert_one(
        &self,
        collection: Collection,
        fields: Document,
    ) -> Result<DocumentId, StoreError>;

    /// Fetch a single document by primary key.
    async fn find_one(
        &self,
        collection: Collection,
        id: DocumentId,
    ) -> Result<Option<StoredDocument>, StoreError>;

    /// Fetch all documents matching the filter, optionally sorted.
    async fn find_many(
        &self,
        collection: Collection,
        filter: Document,
        sort: Option<Sort>,
    ) -> Result<Vec<StoredDocument>, StoreError>;

    /// Merge the given fields into a document. Returns true iff a matching
    /// document was modified.
    async fn update_one(
        &self,
        collection: Collection,
        id: DocumentId,
        set: Document,
    ) -> Result<bool, StoreError>;

    /// Delete a document by primary key. Returns true iff it existed.
    async fn delete_one(
        &self,
        collection: Collection,
        id: DocumentId,
    ) -> Result<bool, StoreError>;

    /// Delete all documents matching the filter. Returns the deleted count.
    async fn delete_many(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<u64, StoreError>;

    /// Readiness probe against the backing store.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Build an equality filter document from key/value pairs.
pub fn filter(pairs: &[(&str, Value)]) -> Document {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}
