//! Local storage configuration.

use serde::{Deserialize, Serialize};

use super::default_true;

/// Which key/value backend holds conversations and voice settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process memory; nothing survives a restart
    Memory,
    /// SQLite database file
    #[default]
    Sqlite,
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Path to the SQLite database file (`:memory:` for a private in-memory database)
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Maximum number of pooled connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Whether to run pending migrations on startup (default: true)
    #[serde(default = "default_true")]
    pub run_migrations: bool,

    /// Retention bound for stored conversations
    #[serde(default = "default_max_conversations")]
    pub max_conversations: usize,
}

fn default_db_path() -> String {
    "voxchat.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

const fn default_max_conversations() -> usize {
    20
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_db_path(),
            max_connections: default_max_connections(),
            run_migrations: true,
            max_conversations: default_max_conversations(),
        }
    }
}
