//! Postgres-backed document store.
//!
//! All collections share one table; each row holds a whole document as
//! `JSONB` alongside its collection name, id and version:
//!
//! ```sql
//! CREATE TABLE documents (
//!     collection TEXT NOT NULL,
//!     id UUID NOT NULL,
//!     version BIGINT NOT NULL,
//!     doc JSONB NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
//!     PRIMARY KEY (collection, id)
//! );
//! ```
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Constraint` |
//! | Database (foreign key violation) | `23503` | `Constraint` |
//! | Database (check constraint violation) | `23514` | `Constraint` |
//! | Database (other) | Any other | `Unknown` |
//! | PoolTimedOut | N/A | `Timeout` |
//! | PoolClosed / Io / Tls | N/A | `Unavailable` |
//! | Other | N/A | `Unknown` |

use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;
use uuid::Uuid;

use soil_core::{Document, ExpectedVersion};

use crate::config::DatabaseConfig;

use super::query::{Filter, Query};
use super::r#trait::{DocumentStore, StoreError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    id UUID NOT NULL,
    version BIGINT NOT NULL,
    doc JSONB NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (collection, id)
)
"#;

/// Open a pool using the configured size and acquire timeout.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, StoreError> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(&config.url)
        .await
        .map_err(|e| map_sqlx_error("connect", e))
}

/// Create the `documents` table if it does not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::query(SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_schema", e))?;
    Ok(())
}

/// Postgres-backed collection of `D` documents.
///
/// `Send + Sync` and cheap to clone; all handles share the sqlx pool.
#[derive(Debug)]
pub struct PostgresDocumentStore<D> {
    pool: Arc<PgPool>,
    _doc: PhantomData<fn() -> D>,
}

impl<D> Clone for PostgresDocumentStore<D> {
    fn clone(&self) -> Self {
        Self {
            pool: Arc::clone(&self.pool),
            _doc: PhantomData,
        }
    }
}

impl<D: Document> PostgresDocumentStore<D> {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self {
            pool,
            _doc: PhantomData,
        }
    }

    /// Add a partial unique index on `doc->>field` for this collection.
    pub async fn ensure_unique_field(&self, field: &'static str) -> Result<(), StoreError> {
        let sql = format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS documents_{collection}_{field}_key \
             ON documents ((doc->>'{field}')) WHERE collection = '{collection}'",
            collection = D::COLLECTION,
            field = json_key(field),
        );
        sqlx::query(&sql)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_unique_field", e))?;
        Ok(())
    }
}

fn decode<D: Document>(row: &sqlx::postgres::PgRow) -> Result<D, StoreError> {
    let Json(value): Json<Value> = row
        .try_get("doc")
        .map_err(|e| StoreError::Serialization(format!("failed to read document row: {e}")))?;
    Ok(serde_json::from_value(value)?)
}

#[async_trait::async_trait]
impl<D: Document> DocumentStore<D> for PostgresDocumentStore<D> {
    #[instrument(skip(self, doc), fields(collection = D::COLLECTION), err)]
    async fn insert(&self, mut doc: D) -> Result<D, StoreError> {
        doc.set_version(1);
        let id: Uuid = doc.id().into();
        let json = serde_json::to_value(&doc)?;

        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, version, doc)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(D::COLLECTION)
        .bind(id)
        .bind(1_i64)
        .bind(Json(json))
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert", e))?;

        Ok(doc)
    }

    #[instrument(skip(self), fields(collection = D::COLLECTION), err)]
    async fn get(&self, id: D::Id) -> Result<Option<D>, StoreError> {
        let id: Uuid = id.into();
        let row = sqlx::query("SELECT doc FROM documents WHERE collection = $1 AND id = $2")
            .bind(D::COLLECTION)
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get", e))?;

        row.as_ref().map(decode::<D>).transpose()
    }

    #[instrument(skip(self), fields(collection = D::COLLECTION), err)]
    async fn find(&self, query: &Query) -> Result<Vec<D>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT doc FROM documents WHERE collection = ");
        qb.push_bind(D::COLLECTION);
        push_filter(&mut qb, &query.filter);

        if let Some(sort) = query.sort {
            qb.push(format!(
                " ORDER BY (doc->>'{}')::timestamptz DESC NULLS LAST, id DESC",
                json_key(sort.field)
            ));
        }
        if let Some(limit) = query.limit {
            qb.push(" LIMIT ");
            qb.push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let rows = qb
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find", e))?;

        rows.iter().map(decode::<D>).collect()
    }

    /// Row-locks the current version inside a transaction, so concurrent
    /// replaces of one document serialise.
    #[instrument(skip(self, doc), fields(collection = D::COLLECTION, expected = ?expected), err)]
    async fn replace(&self, mut doc: D, expected: ExpectedVersion) -> Result<D, StoreError> {
        let id: Uuid = doc.id().into();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("replace_begin", e))?;

        let current: i64 = sqlx::query(
            "SELECT version FROM documents WHERE collection = $1 AND id = $2 FOR UPDATE",
        )
        .bind(D::COLLECTION)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("replace_lock", e))?
        .ok_or(StoreError::NotFound)?
        .try_get("version")
        .map_err(|e| map_sqlx_error("replace_lock", e))?;

        let current = u64::try_from(current)
            .map_err(|_| StoreError::Unknown(format!("negative version {current} for {id}")))?;
        if !expected.matches(current) {
            return Err(StoreError::Conflict(format!(
                "expected {expected:?}, found {current}"
            )));
        }

        let next = current + 1;
        doc.set_version(next);
        let json = serde_json::to_value(&doc)?;

        sqlx::query(
            r#"
            UPDATE documents
            SET version = $3, doc = $4, updated_at = now()
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(D::COLLECTION)
        .bind(id)
        .bind(i64::try_from(next).map_err(|_| StoreError::Unknown("version overflow".into()))?)
        .bind(Json(json))
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("replace_update", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("replace_commit", e))?;

        Ok(doc)
    }

    #[instrument(skip(self), fields(collection = D::COLLECTION), err)]
    async fn delete(&self, id: D::Id) -> Result<bool, StoreError> {
        let id: Uuid = id.into();
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(D::COLLECTION)
            .bind(id)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;
        Ok(result.rows_affected() > 0)
    }
}

/// Field names are compile-time constants; anything else would be spliced
/// into SQL, so only plain identifiers are accepted.
fn json_key(field: &'static str) -> &'static str {
    assert!(
        !field.is_empty() && field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'),
        "invalid document field name: {field:?}"
    );
    field
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
    match filter {
        Filter::All => {}
        Filter::Eq { field, value } => {
            qb.push(format!(" AND doc->>'{}' = ", json_key(field)));
            qb.push_bind(value.clone());
        }
        Filter::Between { field, from, to } => {
            qb.push(format!(
                " AND (doc->>'{}')::timestamptz BETWEEN ",
                json_key(field)
            ));
            qb.push_bind(*from);
            qb.push(" AND ");
            qb.push_bind(*to);
        }
        Filter::ContainsIgnoreCase { fields, needle } => {
            let pattern = format!("%{}%", escape_like(needle));
            qb.push(" AND (");
            for (idx, field) in fields.iter().enumerate() {
                if idx > 0 {
                    qb.push(" OR ");
                }
                qb.push(format!("doc->>'{}' ILIKE ", json_key(field)));
                qb.push_bind(pattern.clone());
            }
            if fields.is_empty() {
                qb.push("FALSE");
            }
            qb.push(")");
        }
        Filter::And(filters) => {
            for f in filters {
                push_filter(qb, f);
            }
        }
    }
}

/// Escape `LIKE` metacharacters so the needle matches literally.
fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Map SQLx errors to `StoreError`.
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") | Some("23503") | Some("23514") => StoreError::Constraint(msg),
                _ => StoreError::Unknown(msg),
            }
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Timeout(format!("connection pool timed out in {operation}"))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::Io(e) => StoreError::Unavailable(format!("io error in {operation}: {e}")),
        sqlx::Error::Tls(e) => StoreError::Unavailable(format!("tls error in {operation}: {e}")),
        _ => StoreError::Unknown(format!("sqlx error in {operation}: {err}")),
    }
}
