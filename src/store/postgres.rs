//! PostgreSQL response store
//!
//! Documents live in a single `documents` table keyed by their parent
//! collection path (a `TEXT[]`) and id. Fields are a JSONB object. The `seq`
//! column records insertion order so listings come back in the order entries
//! were first written.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use tracing::{debug, info};

use super::{CollectionPath, DocumentPath, Fields, ResponseStore};
use crate::config::StoreConfig;
use crate::store_errors::StoreError;

/// Response store backed by a Postgres pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

/// Initialize the database schema
pub async fn init_database_schema(pool: &PgPool) -> Result<()> {
    info!("Initializing response store schema...");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS documents (
            seq BIGSERIAL,
            parent TEXT[] NOT NULL,
            id TEXT NOT NULL,
            fields JSONB NOT NULL DEFAULT '{}'::jsonb,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            PRIMARY KEY (parent, id)
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create documents table")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS documents_parent_seq_idx ON documents (parent, seq)")
        .execute(pool)
        .await
        .context("Failed to create documents parent index")?;

    info!("Response store schema initialized successfully");
    Ok(())
}

impl PgStore {
    /// Connect to Postgres and make sure the schema exists
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        info!(
            max_connections = config.max_connections,
            "Connecting to response store"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.operation_timeout)
            .connect(&config.database_url)
            .await
            .context("Failed to connect to the response store database")?;

        init_database_schema(&pool).await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResponseStore for PgStore {
    async fn list_children(&self, collection: &CollectionPath) -> Result<Vec<String>, StoreError> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT id FROM documents WHERE parent = $1 ORDER BY seq",
        )
        .bind(collection.segments().to_vec())
        .fetch_all(&self.pool)
        .await?;

        debug!(collection = %collection, count = ids.len(), "Listed children");
        Ok(ids)
    }

    async fn get_value(&self, document: &DocumentPath) -> Result<Option<Fields>, StoreError> {
        let fields = sqlx::query_scalar::<_, Json<Fields>>(
            "SELECT fields FROM documents WHERE parent = $1 AND id = $2",
        )
        .bind(document.parent().segments().to_vec())
        .bind(document.id())
        .fetch_optional(&self.pool)
        .await?;

        Ok(fields.map(|Json(fields)| fields))
    }

    async fn upsert(&self, document: &DocumentPath, fields: Fields) -> Result<(), StoreError> {
        document.validate()?;
        let mut tx = self.pool.begin().await?;

        for ancestor in document.ancestors() {
            sqlx::query(
                "INSERT INTO documents (parent, id) VALUES ($1, $2)
                 ON CONFLICT (parent, id) DO NOTHING",
            )
            .bind(ancestor.parent().segments().to_vec())
            .bind(ancestor.id())
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            "INSERT INTO documents (parent, id, fields) VALUES ($1, $2, $3)
             ON CONFLICT (parent, id) DO UPDATE
             SET fields = documents.fields || EXCLUDED.fields, updated_at = NOW()",
        )
        .bind(document.parent().segments().to_vec())
        .bind(document.id())
        .bind(Json(&fields))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!(path = %document, "Upserted document");
        Ok(())
    }

    async fn delete(&self, document: &DocumentPath) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE parent = $1 AND id = $2")
            .bind(document.parent().segments().to_vec())
            .bind(document.id())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_collections(&self) -> Result<Vec<String>, StoreError> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT parent[1] FROM documents
             WHERE cardinality(parent) = 1
             GROUP BY parent[1]
             ORDER BY MIN(seq)",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(names)
    }
}
