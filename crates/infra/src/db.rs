//! Database adapters (connection pool wiring).

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::DatabaseConfig;
use crate::store::{StoreError, StoreResult, ensure_schema};

/// Connect to Postgres and make sure the record schema exists.
pub async fn connect(config: &DatabaseConfig) -> StoreResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
        .map_err(|e| StoreError::Backend(format!("failed to connect to Postgres: {e}")))?;

    ensure_schema(&pool).await?;
    tracing::info!(max_connections = config.max_connections, "connected to Postgres");
    Ok(pool)
}
