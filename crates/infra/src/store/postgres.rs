//! Postgres-backed record store.
//!
//! Every record type shares one `records` table. Rows are keyed by
//! `(tenant_id, resource, id)` and hold the record's serde form as JSONB, so
//! adding a record type needs no migration.
//!
//! ## Error Mapping
//!
//! | SQLx error                          | StoreError  |
//! |-------------------------------------|-------------|
//! | Database, code `23505`              | `Duplicate` |
//! | Decode / ColumnDecode               | `Corrupt`   |
//! | anything else                       | `Backend`   |

use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::instrument;

use sitebook_core::id::Uuid;
use sitebook_core::{Record, TenantId};

use super::{RecordStore, StoreError, StoreResult};

const CREATE_RECORDS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS records (
    tenant_id  UUID        NOT NULL,
    resource   TEXT        NOT NULL,
    id         UUID        NOT NULL,
    body       JSONB       NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL,
    PRIMARY KEY (tenant_id, resource, id)
)
"#;

const CREATE_PROJECT_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS records_project_idx
    ON records (tenant_id, resource, (body->>'project_id'))
"#;

/// Create the `records` table and its indexes when missing.
///
/// Statements are issued one by one; the Postgres extended protocol accepts a
/// single statement per query.
pub async fn ensure_schema(pool: &PgPool) -> StoreResult<()> {
    for statement in [CREATE_RECORDS_TABLE, CREATE_PROJECT_INDEX] {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
    }
    Ok(())
}

/// Postgres store for one record type.
///
/// Uses the SQLx connection pool, which is `Send + Sync` and cheap to clone.
#[derive(Debug)]
pub struct PostgresRecordStore<V> {
    pool: PgPool,
    _record: PhantomData<fn() -> V>,
}

impl<V> PostgresRecordStore<V> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _record: PhantomData,
        }
    }
}

impl<V> Clone for PostgresRecordStore<V> {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

#[async_trait]
impl<V: Record> RecordStore<V> for PostgresRecordStore<V> {
    #[instrument(skip(self), fields(resource = V::RESOURCE, tenant_id = %tenant_id), err)]
    async fn get(&self, tenant_id: TenantId, id: Uuid) -> StoreResult<Option<V>> {
        let row = sqlx::query(
            r#"
            SELECT body
            FROM records
            WHERE tenant_id = $1 AND resource = $2 AND id = $3
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(V::RESOURCE)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get", e))?;

        row.map(|row| decode_body(&row)).transpose()
    }

    #[instrument(skip(self), fields(resource = V::RESOURCE, tenant_id = %tenant_id), err)]
    async fn list(&self, tenant_id: TenantId) -> StoreResult<Vec<V>> {
        let rows = sqlx::query(
            r#"
            SELECT body
            FROM records
            WHERE tenant_id = $1 AND resource = $2
            ORDER BY id ASC
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(V::RESOURCE)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list", e))?;

        rows.iter().map(decode_body::<V>).collect()
    }

    #[instrument(skip(self, record), fields(resource = V::RESOURCE, tenant_id = %tenant_id), err)]
    async fn insert(&self, tenant_id: TenantId, record: V) -> StoreResult<()> {
        let id = record.record_id();
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO records (tenant_id, resource, id, body, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(V::RESOURCE)
        .bind(id)
        .bind(Json(&record))
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match map_sqlx_error("insert", e) {
            StoreError::Duplicate(_) => StoreError::Duplicate(id),
            other => other,
        })?;
        Ok(())
    }

    #[instrument(skip(self, record), fields(resource = V::RESOURCE, tenant_id = %tenant_id), err)]
    async fn update(&self, tenant_id: TenantId, record: V) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE records
            SET body = $4, updated_at = $5
            WHERE tenant_id = $1 AND resource = $2 AND id = $3
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(V::RESOURCE)
        .bind(record.record_id())
        .bind(Json(&record))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    /// Locks the row with `FOR UPDATE` so concurrent writers queue behind the
    /// check; a rejected predicate rolls the transaction back on drop.
    #[instrument(skip(self, record, expected), fields(resource = V::RESOURCE, tenant_id = %tenant_id), err)]
    async fn update_if(
        &self,
        tenant_id: TenantId,
        record: V,
        expected: &(dyn for<'a> Fn(&'a V) -> bool + Send + Sync),
    ) -> StoreResult<bool> {
        let id = record.record_id();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("update_if", e))?;

        let row = sqlx::query(
            r#"
            SELECT body
            FROM records
            WHERE tenant_id = $1 AND resource = $2 AND id = $3
            FOR UPDATE
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(V::RESOURCE)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_if", e))?;

        let Some(row) = row else {
            return Err(StoreError::NotFound);
        };
        let current: V = decode_body(&row)?;
        if !expected(&current) {
            return Ok(false);
        }

        sqlx::query(
            r#"
            UPDATE records
            SET body = $4, updated_at = $5
            WHERE tenant_id = $1 AND resource = $2 AND id = $3
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(V::RESOURCE)
        .bind(id)
        .bind(Json(&record))
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_if", e))?;

        tx.commit().await.map_err(|e| map_sqlx_error("update_if", e))?;
        Ok(true)
    }

    #[instrument(skip(self), fields(resource = V::RESOURCE, tenant_id = %tenant_id), err)]
    async fn delete(&self, tenant_id: TenantId, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM records
            WHERE tenant_id = $1 AND resource = $2 AND id = $3
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(V::RESOURCE)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("delete", e))?;

        Ok(result.rows_affected() > 0)
    }
}

fn decode_body<V: Record>(row: &sqlx::postgres::PgRow) -> StoreResult<V> {
    row.try_get::<Json<V>, _>("body")
        .map(|Json(v)| v)
        .map_err(|e| StoreError::Corrupt(format!("{} body: {e}", V::RESOURCE)))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            if db_err.code().as_deref() == Some("23505") {
                // Placeholder id; insert substitutes the real one.
                StoreError::Duplicate(Uuid::nil())
            } else {
                StoreError::Backend(format!("database error in {operation}: {}", db_err.message()))
            }
        }
        sqlx::Error::Decode(e) => StoreError::Corrupt(format!("decode error in {operation}: {e}")),
        sqlx::Error::ColumnDecode { index, source } => {
            StoreError::Corrupt(format!("column {index} in {operation}: {source}"))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {operation}"))
        }
        other => StoreError::Backend(format!("sqlx error in {operation}: {other}")),
    }
}
