//! Persistence module
//!
//! Local key/value storage backends (in-memory and SQLite) and the
//! conversation and voice-settings stores layered on top of them.

pub mod connection;
pub mod conversation_store;
mod memory_storage;
pub mod migrations;
mod sqlite_storage;
pub mod voice_settings_store;

pub use connection::{ConnectionPool, DatabaseError, create_pool};
pub use conversation_store::{
    CHAT_HISTORY_KEY, DEFAULT_MAX_CONVERSATIONS, LocalStorageConversationStore,
};
pub use memory_storage::InMemoryLocalStorage;
pub use sqlite_storage::SqliteLocalStorage;
pub use voice_settings_store::{LocalStorageVoiceSettingsStore, VOICE_SETTINGS_KEY};
