//! Conversation storage port
//!
//! Defines the interface for persisting and retrieving conversations.

use async_trait::async_trait;
use domain::{ChatMessage, ConversationId, ConversationSummary};
#[cfg(test)]
use mockall::automock;
use serde::Serialize;

use crate::error::ApplicationError;

/// Usage figures for the conversation collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StorageInfo {
    /// Number of stored conversations
    pub total_conversations: usize,
    /// Size of the serialized collection in bytes
    pub size_bytes: usize,
    /// Retention bound
    pub max_conversations: usize,
}

/// Port for conversation persistence
///
/// Stores receive and return copies; the engine keeps ownership of the live
/// message list.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Upsert a conversation snapshot, evicting the oldest entries beyond the
    /// retention bound
    async fn save(
        &self,
        id: &ConversationId,
        messages: &[ChatMessage],
    ) -> Result<(), ApplicationError>;

    /// Get the messages of a conversation
    async fn load(&self, id: &ConversationId) -> Result<Option<Vec<ChatMessage>>, ApplicationError>;

    /// Summaries of all conversations, most recently modified first
    async fn list(&self) -> Result<Vec<ConversationSummary>, ApplicationError>;

    /// Delete a conversation; returns whether it existed
    async fn delete(&self, id: &ConversationId) -> Result<bool, ApplicationError>;

    /// Delete every conversation
    async fn clear(&self) -> Result<(), ApplicationError>;

    /// Serialize the whole collection as pretty-printed JSON
    async fn export_all(&self) -> Result<String, ApplicationError>;

    /// Replace the whole collection from an export; returns the number of
    /// conversations imported
    async fn import_all(&self, blob: &str) -> Result<usize, ApplicationError>;

    /// Usage figures
    async fn storage_info(&self) -> Result<StorageInfo, ApplicationError>;
}
