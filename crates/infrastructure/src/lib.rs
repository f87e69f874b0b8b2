//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer.
//! Contains the provider gateway, the speech bridge adapters, local storage
//! backends, configuration loading and telemetry setup.

pub mod adapters;
pub mod config;
pub mod persistence;
pub mod telemetry;

pub use adapters::*;
pub use config::{AppConfig, StorageBackend, StorageConfig};
pub use persistence::{
    CHAT_HISTORY_KEY, ConnectionPool, DatabaseError, InMemoryLocalStorage,
    LocalStorageConversationStore, LocalStorageVoiceSettingsStore, SqliteLocalStorage,
    VOICE_SETTINGS_KEY, create_pool,
};
pub use telemetry::{TelemetryConfig, TelemetryError, init_telemetry};
