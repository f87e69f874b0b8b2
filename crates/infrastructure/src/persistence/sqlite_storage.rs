//! SQLite local storage implementation
//!
//! Implements the LocalStorage port on a single `local_storage` table.

use std::sync::Arc;

use application::ports::{LocalStorage, StorageError};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{ErrorCode, OptionalExtension, params};
use tokio::task;
use tracing::{debug, instrument};

use super::connection::ConnectionPool;

/// SQLite-backed key/value store
#[derive(Debug, Clone)]
pub struct SqliteLocalStorage {
    pool: Arc<ConnectionPool>,
}

impl SqliteLocalStorage {
    /// Create a new SQLite local storage
    #[must_use]
    pub const fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }
}

fn backend_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Backend(e.to_string())
}

fn write_error(e: rusqlite::Error) -> StorageError {
    match e {
        rusqlite::Error::SqliteFailure(ref failure, _) if failure.code == ErrorCode::DiskFull => {
            StorageError::QuotaExceeded(e.to_string())
        },
        other => backend_error(other),
    }
}

#[async_trait]
impl LocalStorage for SqliteLocalStorage {
    #[instrument(skip(self))]
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let pool = Arc::clone(&self.pool);
        let key = key.to_string();

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(backend_error)?;
            conn.query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                [&key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(backend_error)
        })
        .await
        .map_err(backend_error)?
    }

    #[instrument(skip(self, value), fields(bytes = value.len()))]
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let pool = Arc::clone(&self.pool);
        let key = key.to_string();
        let value = value.to_string();

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(backend_error)?;
            conn.execute(
                "INSERT INTO local_storage (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )
            .map_err(write_error)?;

            debug!("Stored item");
            Ok(())
        })
        .await
        .map_err(backend_error)?
    }

    #[instrument(skip(self))]
    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let pool = Arc::clone(&self.pool);
        let key = key.to_string();

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(backend_error)?;
            conn.execute("DELETE FROM local_storage WHERE key = ?1", [&key])
                .map_err(backend_error)?;
            Ok(())
        })
        .await
        .map_err(backend_error)?
    }
}
