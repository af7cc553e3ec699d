//! SQLite implementation of IKeyValueStore
//!
//! Each key of the local namespace is one row of `local_storage`. Values
//! are stored as given; `updated_at` records the last write in RFC 3339.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use mindlog_core::ports::IKeyValueStore;

/// SQLite-based implementation of the local key-value port
#[derive(Clone)]
pub struct SqliteKeyValueStore {
    pool: SqlitePool,
}

impl SqliteKeyValueStore {
    /// Creates a store over the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl IKeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM local_storage WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO local_storage (key, value, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        tracing::trace!(key, bytes = value.len(), "Stored local value");
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM local_storage WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        tracing::trace!(key, "Removed local value");
        Ok(())
    }

    async fn keys(&self) -> anyhow::Result<Vec<String>> {
        let keys: Vec<String> = sqlx::query_scalar("SELECT key FROM local_storage ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(keys)
    }

    async fn entries(&self) -> anyhow::Result<Vec<(String, String)>> {
        let rows = sqlx::query("SELECT key, value FROM local_storage ORDER BY key")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| (row.get("key"), row.get("value")))
            .collect())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        let result = sqlx::query("DELETE FROM local_storage")
            .execute(&self.pool)
            .await?;

        tracing::debug!(removed = result.rows_affected(), "Cleared local namespace");
        Ok(())
    }

    async fn replace_all(&self, entries: &[(String, String)]) -> anyhow::Result<()> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM local_storage")
            .execute(&mut *tx)
            .await?;
        for (key, value) in entries {
            sqlx::query("INSERT INTO local_storage (key, value, updated_at) VALUES (?, ?, ?)")
                .bind(key)
                .bind(value)
                .bind(&now)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        tracing::debug!(keys = entries.len(), "Replaced local namespace");
        Ok(())
    }
}
