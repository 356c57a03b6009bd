//! `PostgreSQL` implementation of the document store.
//!
//! Each collection is a table of `(_id UUID, doc JSONB)`. Equality filters
//! compile to JSONB containment (`doc @> $1`) and sorts cast the stored
//! millisecond timestamps to `bigint`. Queries use the runtime sqlx API:
//! the document layout is dynamic, so there is no schema for compile-time
//! checked macros to verify against.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use salto_core::DocumentId;

use super::{Collection, Document, DocumentStore, Sort, StoreError, StoredDocument};

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// The pool is process-wide: opened once at startup and shared by every
/// request in flight.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Document store backed by `PostgreSQL` JSONB tables.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the collection tables and their containment indexes if they do
    /// not exist yet. Idempotent; run once at startup.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the DDL fails.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for collection in Collection::ALL {
            let table = collection.name();
            sqlx::query(&format!(
                "CREATE TABLE IF NOT EXISTS {table} (_id UUID PRIMARY KEY, doc JSONB NOT NULL)"
            ))
            .execute(&self.pool)
            .await?;
            sqlx::query(&format!(
                "CREATE INDEX IF NOT EXISTS {table}_doc_idx ON {table} USING GIN (doc jsonb_path_ops)"
            ))
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }
}

/// Decode a `(_id, doc)` row into a [`StoredDocument`].
fn decode_row(row: &sqlx::postgres::PgRow) -> Result<StoredDocument, StoreError> {
    let id: Uuid = row.try_get("_id")?;
    let doc: Value = row.try_get("doc")?;
    match doc {
        Value::Object(fields) => Ok(StoredDocument {
            id: DocumentId::from_uuid(id),
            fields,
        }),
        other => Err(StoreError::DataCorruption(format!(
            "document body is not an object: {other}"
        ))),
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert_one(
        &self,
        collection: Collection,
        fields: Document,
    ) -> Result<DocumentId, StoreError> {
        let id = DocumentId::generate();
        let sql = format!("INSERT INTO {} (_id, doc) VALUES ($1, $2)", collection.name());
        sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(Value::Object(fields))
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    async fn find_one(
        &self,
        collection: Collection,
        id: DocumentId,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let sql = format!("SELECT _id, doc FROM {} WHERE _id = $1", collection.name());
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(decode_row).transpose()
    }

    async fn find_many(
        &self,
        collection: Collection,
        filter: Document,
        sort: Option<Sort>,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let mut sql = format!("SELECT _id, doc FROM {}", collection.name());
        if !filter.is_empty() {
            sql.push_str(" WHERE doc @> $1");
        }
        if let Some(sort) = sort {
            let direction = if sort.descending { "DESC" } else { "ASC" };
            sql.push_str(&format!(
                " ORDER BY (doc->>'{}')::bigint {direction}",
                sort.field
            ));
        }

        let query = if filter.is_empty() {
            sqlx::query(&sql)
        } else {
            sqlx::query(&sql).bind(Value::Object(filter))
        };

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(decode_row).collect()
    }

    async fn update_one(
        &self,
        collection: Collection,
        id: DocumentId,
        set: Document,
    ) -> Result<bool, StoreError> {
        let sql = format!(
            "UPDATE {} SET doc = doc || $2 WHERE _id = $1",
            collection.name()
        );
        let result = sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(Value::Object(set))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_one(
        &self,
        collection: Collection,
        id: DocumentId,
    ) -> Result<bool, StoreError> {
        let sql = format!("DELETE FROM {} WHERE _id = $1", collection.name());
        let result = sqlx::query(&sql)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_many(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<u64, StoreError> {
        let mut sql = format!("DELETE FROM {}", collection.name());
        if !filter.is_empty() {
            sql.push_str(" WHERE doc @> $1");
        }

        let query = if filter.is_empty() {
            sqlx::query(&sql)
        } else {
            sqlx::query(&sql).bind(Value::Object(filter))
        };

        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
