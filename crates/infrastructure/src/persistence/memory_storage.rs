//! In-memory local storage
//!
//! Useful for tests and for sessions that should leave nothing behind.

use std::collections::HashMap;

use application::ports::{LocalStorage, StorageError};
use async_trait::async_trait;
use parking_lot::RwLock;

/// Process-local key/value store with an optional size quota
#[derive(Debug, Default)]
pub struct InMemoryLocalStorage {
    items: RwLock<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl InMemoryLocalStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes that would grow the total of keys and values beyond
    /// `bytes`
    #[must_use]
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota_bytes = Some(bytes);
        self
    }

    /// Number of stored items
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

#[async_trait]
impl LocalStorage for InMemoryLocalStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.read().get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.write();

        if let Some(quota) = self.quota_bytes {
            let others: usize = items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded(format!(
                    "{needed} bytes exceeds quota of {quota} bytes"
                )));
            }
        }

        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.write().remove(key);
        Ok(())
    }
}
