/// PostgreSQL document store
///
/// All collections share one JSONB table. Each call is bounded by the
/// configured query timeout on top of the pool's acquire timeout.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE documents (
///     collection VARCHAR(64) NOT NULL,
///     id UUID NOT NULL,
///     body JSONB NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (collection, id)
/// );
///
/// CREATE UNIQUE INDEX documents_users_username_key
///     ON documents ((body ->> 'username'))
///     WHERE collection = 'users';
/// ```
///
/// # Example
///
/// ```no_run
/// use teamboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use teamboard_shared::models::project::Project;
/// use teamboard_shared::store::postgres::PgDocumentStore;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::new(std::env::var("DATABASE_URL")?)).await?;
///
/// let projects: PgDocumentStore<Project> = PgDocumentStore::new(pool, Duration::from_secs(10));
/// # Ok(())
/// # }
/// ```

use super::{Document, DocumentStore, Filter, StoreError, StoreResult};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use std::future::Future;
use std::marker::PhantomData;
use std::time::Duration;
use uuid::Uuid;

/// JSONB-backed store for one collection
pub struct PgDocumentStore<D> {
    pool: PgPool,
    query_timeout: Duration,
    _document: PhantomData<fn() -> D>,
}

impl<D> Clone for PgDocumentStore<D> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            query_timeout: self.query_timeout,
            _document: PhantomData,
        }
    }
}

impl<D: Document> PgDocumentStore<D> {
    /// Creates a store for `D::COLLECTION` on the given pool
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
            _document: PhantomData,
        }
    }

    async fn bounded<T, F>(&self, query: F) -> StoreResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>> + Send,
    {
        match tokio::time::timeout(self.query_timeout, query).await {
            Ok(result) => result.map_err(StoreError::from),
            Err(_) => {
                tracing::warn!(
                    collection = D::COLLECTION,
                    timeout_ms = self.query_timeout.as_millis() as u64,
                    "Document store query timed out"
                );
                Err(StoreError::Timeout(self.query_timeout))
            }
        }
    }

    fn decode_all(rows: Vec<(JsonValue,)>) -> StoreResult<Vec<D>> {
        rows.into_iter()
            .map(|(body,)| serde_json::from_value(body).map_err(StoreError::from))
            .collect()
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => match db_err.constraint() {
                Some(constraint) => {
                    StoreError::Conflict(format!("Constraint violation: {}", constraint))
                }
                None => StoreError::Query(format!("Database error: {}", db_err)),
            },
            sqlx::Error::PoolTimedOut => StoreError::Backend("Connection pool timed out".to_string()),
            sqlx::Error::PoolClosed => StoreError::Backend("Connection pool closed".to_string()),
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::WorkerCrashed => {
                StoreError::Backend(format!("Connection error: {}", err))
            }
            _ => StoreError::Query(format!("Database error: {}", err)),
        }
    }
}

#[async_trait]
impl<D: Document> DocumentStore<D> for PgDocumentStore<D> {
    async fn save(&self, document: &D) -> StoreResult<()> {
        let body = serde_json::to_value(document)?;
        self.bounded(
            sqlx::query(
                r#"
                INSERT INTO documents (collection, id, body)
                VALUES ($1, $2, $3)
                ON CONFLICT (collection, id)
                DO UPDATE SET body = EXCLUDED.body, updated_at = NOW()
                "#,
            )
            .bind(D::COLLECTION)
            .bind(document.id())
            .bind(body)
            .execute(&self.pool),
        )
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<D>> {
        let row: Option<(JsonValue,)> = self
            .bounded(
                sqlx::query_as("SELECT body FROM documents WHERE collection = $1 AND id = $2")
                    .bind(D::COLLECTION)
                    .bind(id)
                    .fetch_optional(&self.pool),
            )
            .await?;

        row.map(|(body,)| serde_json::from_value(body).map_err(StoreError::from))
            .transpose()
    }

    async fn find_all(&self) -> StoreResult<Vec<D>> {
        let rows: Vec<(JsonValue,)> = self
            .bounded(
                sqlx::query_as(
                    "SELECT body FROM documents WHERE collection = $1 ORDER BY created_at ASC",
                )
                .bind(D::COLLECTION)
                .fetch_all(&self.pool),
            )
            .await?;

        Self::decode_all(rows)
    }

    async fn find_by(&self, filter: &Filter) -> StoreResult<Vec<D>> {
        let rows: Vec<(JsonValue,)> = match filter {
            Filter::Eq { field, value } => {
                self.bounded(
                    sqlx::query_as(
                        r#"
                        SELECT body FROM documents
                        WHERE collection = $1 AND body ->> $2 = $3
                        ORDER BY created_at ASC
                        "#,
                    )
                    .bind(D::COLLECTION)
                    .bind(*field)
                    .bind(value.as_str())
                    .fetch_all(&self.pool),
                )
                .await?
            }
            Filter::Contains { field, value } => {
                self.bounded(
                    sqlx::query_as(
                        r#"
                        SELECT body FROM documents
                        WHERE collection = $1 AND (body -> $2) @> jsonb_build_array($3::text)
                        ORDER BY created_at ASC
                        "#,
                    )
                    .bind(D::COLLECTION)
                    .bind(*field)
                    .bind(value.as_str())
                    .fetch_all(&self.pool),
                )
                .await?
            }
        };

        Self::decode_all(rows)
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool> {
        let result = self
            .bounded(
                sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
                    .bind(D::COLLECTION)
                    .bind(id)
                    .execute(&self.pool),
            )
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by(&self, filter: &Filter) -> StoreResult<u64> {
        let result = match filter {
            Filter::Eq { field, value } => {
                self.bounded(
                    sqlx::query(
                        "DELETE FROM documents WHERE collection = $1 AND body ->> $2 = $3",
                    )
                    .bind(D::COLLECTION)
                    .bind(*field)
                    .bind(value.as_str())
                    .execute(&self.pool),
                )
                .await?
            }
            Filter::Contains { field, value } => {
                self.bounded(
                    sqlx::query(
                        r#"
                        DELETE FROM documents
                        WHERE collection = $1 AND (body -> $2) @> jsonb_build_array($3::text)
                        "#,
                    )
                    .bind(D::COLLECTION)
                    .bind(*field)
                    .bind(value.as_str())
                    .execute(&self.pool),
                )
                .await?
            }
        };

        tracing::debug!(
            collection = D::COLLECTION,
            field = filter.field(),
            removed = result.rows_affected(),
            "Bulk delete completed"
        );

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> StoreResult<()> {
        self.bounded(crate::db::pool::health_check(&self.pool)).await
    }
}
