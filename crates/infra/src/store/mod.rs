//! Tenant-isolated record storage.
//!
//! One store per record type. Every operation is scoped by tenant, so a record
//! written under one tenant is invisible (not found) under any other.

mod in_memory;
mod postgres;

pub use in_memory::InMemoryRecordStore;
pub use postgres::{PostgresRecordStore, ensure_schema};

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use sitebook_core::id::Uuid;
use sitebook_core::{Record, TenantId};

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-level error.
///
/// Absence on `get` is `Ok(None)`, not an error; `NotFound` is reserved for
/// writes that target a missing record.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("record already exists: {0}")]
    Duplicate(Uuid),

    #[error("stored record could not be decoded: {0}")]
    Corrupt(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Async, tenant-scoped CRUD over one record type.
#[async_trait]
pub trait RecordStore<V: Record>: Send + Sync {
    async fn get(&self, tenant_id: TenantId, id: Uuid) -> StoreResult<Option<V>>;

    /// All records of the tenant in id order, which for UUIDv7 ids is
    /// creation order.
    async fn list(&self, tenant_id: TenantId) -> StoreResult<Vec<V>>;

    /// Fails with `Duplicate` when the id is taken.
    async fn insert(&self, tenant_id: TenantId, record: V) -> StoreResult<()>;

    /// Fails with `NotFound` when there is nothing to overwrite.
    async fn update(&self, tenant_id: TenantId, record: V) -> StoreResult<()>;

    /// Overwrite only while the stored record still satisfies `expected`.
    ///
    /// The check and the write are atomic with respect to other writers of the
    /// same record. Returns `Ok(false)` when the predicate no longer holds and
    /// `NotFound` when there is nothing to overwrite.
    async fn update_if(
        &self,
        tenant_id: TenantId,
        record: V,
        expected: &(dyn for<'a> Fn(&'a V) -> bool + Send + Sync),
    ) -> StoreResult<bool>;

    /// Returns whether a record was removed.
    async fn delete(&self, tenant_id: TenantId, id: Uuid) -> StoreResult<bool>;
}

/// Source of record stores sharing one storage backend.
pub trait StoreBackend {
    fn store<V: Record>(&self) -> Arc<dyn RecordStore<V>>;
}

/// Independent in-memory maps; nothing survives a restart.
#[derive(Debug, Clone, Copy, Default)]
pub struct InMemoryBackend;

impl StoreBackend for InMemoryBackend {
    fn store<V: Record>(&self) -> Arc<dyn RecordStore<V>> {
        Arc::new(InMemoryRecordStore::<V>::new())
    }
}

/// Postgres stores over a shared connection pool.
#[derive(Debug, Clone)]
pub struct PostgresBackend {
    pool: PgPool,
}

impl PostgresBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl StoreBackend for PostgresBackend {
    fn store<V: Record>(&self) -> Arc<dyn RecordStore<V>> {
        Arc::new(PostgresRecordStore::<V>::new(self.pool.clone()))
    }
}
