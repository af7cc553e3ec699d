//! MindLog Cache - SQLite home of the local namespace
//!
//! Everything the client keeps on the device lives in one `local_storage`
//! table of string keys and string values: the diary collection, consent
//! history, the auto-sync flag, the last-sync time, the current user and
//! the admin session marker. Typed access sits one layer up, in
//! `mindlog_core::usecases::LocalStore`.
//!
//! ```no_run
//! use std::{path::Path, sync::Arc};
//! use mindlog_cache::{DatabasePool, SqliteKeyValueStore};
//! use mindlog_core::usecases::LocalStore;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let pool = DatabasePool::new(Path::new("/tmp/mindlog.db")).await?;
//! let store = LocalStore::new(Arc::new(SqliteKeyValueStore::new(pool.pool().clone())));
//! println!("{} entries", store.load_diaries().await?.len());
//! # Ok(())
//! # }
//! ```

pub mod pool;
pub mod repository;

pub use pool::DatabasePool;
pub use repository::SqliteKeyValueStore;

/// Failures opening or migrating the database
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cannot open database: {0}")]
    ConnectionFailed(String),

    #[error("Database query failed: {0}")]
    QueryFailed(String),

    #[error("Schema setup failed: {0}")]
    MigrationFailed(String),
}

impl From<sqlx::Error> for CacheError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Configuration(inner) => CacheError::ConnectionFailed(inner.to_string()),
            sqlx::Error::Io(inner) => CacheError::ConnectionFailed(inner.to_string()),
            other => CacheError::QueryFailed(other.to_string()),
        }
    }
}
