//! Local key/value storage port
//!
//! A string-keyed, string-valued store with the semantics of browser local
//! storage. Higher-level stores serialize their collections into single items.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

/// Errors raised by a storage backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// A value could not be encoded or decoded
    #[error("Storage serialization failed: {0}")]
    Serialization(String),

    /// The backend failed (I/O, pool, SQL)
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// The backend refused to grow
    #[error("Storage quota exceeded: {0}")]
    QuotaExceeded(String),
}

impl StorageError {
    /// Check if this error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Backend(_))
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Port for a local string key/value store
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LocalStorage: Send + Sync {
    /// Read an item
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write an item, replacing any previous value
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove an item; removing a missing key is not an error
    async fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}
