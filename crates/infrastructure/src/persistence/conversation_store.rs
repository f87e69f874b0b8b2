//! Conversation store on top of local storage
//!
//! The whole collection lives in one item, `ai_assistant_chat_history`, as a
//! JSON object mapping conversation id to
//! `{id, messages, timestamp, messageCount}`. Every write re-reads the
//! collection, applies the change, keeps the most recently modified
//! conversations up to the retention bound and writes it back.

use std::collections::BTreeMap;
use std::sync::Arc;

use application::{
    error::ApplicationError,
    ports::{ConversationStore, LocalStorage, StorageError, StorageInfo},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{ChatMessage, Conversation, ConversationId, ConversationSummary};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Storage key of the conversation collection
pub const CHAT_HISTORY_KEY: &str = "ai_assistant_chat_history";

/// Default retention bound
pub const DEFAULT_MAX_CONVERSATIONS: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredConversation {
    id: ConversationId,
    messages: Vec<ChatMessage>,
    timestamp: DateTime<Utc>,
    message_count: usize,
}

impl StoredConversation {
    fn new(id: ConversationId, messages: Vec<ChatMessage>) -> Self {
        Self {
            id,
            message_count: messages.len(),
            messages,
            timestamp: Utc::now(),
        }
    }

    fn summary(&self) -> ConversationSummary {
        Conversation {
            id: self.id.clone(),
            messages: self.messages.clone(),
            last_modified: self.timestamp,
        }
        .summary()
    }
}

type Collection = BTreeMap<ConversationId, StoredConversation>;

/// [`ConversationStore`] that serializes into a [`LocalStorage`] item
pub struct LocalStorageConversationStore {
    storage: Arc<dyn LocalStorage>,
    max_conversations: usize,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for LocalStorageConversationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStorageConversationStore")
            .field("max_conversations", &self.max_conversations)
            .finish_non_exhaustive()
    }
}

impl LocalStorageConversationStore {
    /// Create a store with the default retention bound
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self::with_max_conversations(storage, DEFAULT_MAX_CONVERSATIONS)
    }

    /// Create a store keeping at most `max_conversations` (at least one)
    pub fn with_max_conversations(storage: Arc<dyn LocalStorage>, max_conversations: usize) -> Self {
        Self {
            storage,
            max_conversations: max_conversations.max(1),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_raw(&self) -> Result<Option<String>, StorageError> {
        self.storage.get_item(CHAT_HISTORY_KEY).await
    }

    /// Corrupt data reads as an empty collection
    async fn read_all(&self) -> Result<Collection, StorageError> {
        let Some(raw) = self.read_raw().await? else {
            return Ok(Collection::new());
        };
        Ok(parse_collection(&raw))
    }

    async fn write_all(&self, collection: &Collection) -> Result<(), StorageError> {
        let raw = serde_json::to_string(collection)?;
        self.storage.set_item(CHAT_HISTORY_KEY, &raw).await
    }

    /// Keep the most recently modified conversations; `keep` wins ties
    fn enforce_bound(&self, collection: Collection, keep: Option<&ConversationId>) -> Collection {
        if collection.len() <= self.max_conversations {
            return collection;
        }

        let mut entries: Vec<_> = collection.into_iter().collect();
        entries.sort_by(|(a_id, a), (b_id, b)| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| (Some(b_id) == keep).cmp(&(Some(a_id) == keep)))
        });
        for (id, _) in entries.iter().skip(self.max_conversations) {
            debug!(conversation_id = %id, "Evicting conversation beyond retention bound");
        }
        entries.truncate(self.max_conversations);
        entries.into_iter().collect()
    }
}

fn parse_collection(raw: &str) -> Collection {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!(error = %e, "Stored conversations are unreadable, treating as empty");
        Collection::new()
    })
}

#[async_trait]
impl ConversationStore for LocalStorageConversationStore {
    #[instrument(skip(self, messages), fields(conversation_id = %id, messages = messages.len()))]
    async fn save(&self, id: &ConversationId, messages: &[ChatMessage]) -> Result<(), ApplicationError> {
        let _guard = self.write_lock.lock().await;

        let mut collection = self.read_all().await?;
        collection.insert(id.clone(), StoredConversation::new(id.clone(), messages.to_vec()));
        let collection = self.enforce_bound(collection, Some(id));

        self.write_all(&collection).await?;
        debug!(total = collection.len(), "Saved conversation");
        Ok(())
    }

    #[instrument(skip(self), fields(conversation_id = %id))]
    async fn load(&self, id: &ConversationId) -> Result<Option<Vec<ChatMessage>>, ApplicationError> {
        let mut collection = self.read_all().await?;
        Ok(collection.remove(id).map(|stored| stored.messages))
    }

    async fn list(&self) -> Result<Vec<ConversationSummary>, ApplicationError> {
        let collection = self.read_all().await?;
        let mut summaries: Vec<_> = collection.values().map(StoredConversation::summary).collect();
        summaries.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        Ok(summaries)
    }

    #[instrument(skip(self), fields(conversation_id = %id))]
    async fn delete(&self, id: &ConversationId) -> Result<bool, ApplicationError> {
        let _guard = self.write_lock.lock().await;

        let mut collection = self.read_all().await?;
        if collection.remove(id).is_none() {
            return Ok(false);
        }
        self.write_all(&collection).await?;
        info!("Deleted conversation");
        Ok(true)
    }

    async fn clear(&self) -> Result<(), ApplicationError> {
        let _guard = self.write_lock.lock().await;
        self.storage.remove_item(CHAT_HISTORY_KEY).await?;
        info!("Cleared all conversations");
        Ok(())
    }

    async fn export_all(&self) -> Result<String, ApplicationError> {
        let collection = self.read_all().await?;
        Ok(serde_json::to_string_pretty(&collection).map_err(StorageError::from)?)
    }

    #[instrument(skip(self, blob), fields(bytes = blob.len()))]
    async fn import_all(&self, blob: &str) -> Result<usize, ApplicationError> {
        let imported: Collection = serde_json::from_str(blob).map_err(StorageError::from)?;

        let _guard = self.write_lock.lock().await;
        let collection = self.enforce_bound(imported, None);
        self.write_all(&collection).await?;

        info!(conversations = collection.len(), "Imported conversations");
        Ok(collection.len())
    }

    async fn storage_info(&self) -> Result<StorageInfo, ApplicationError> {
        let raw = self.read_raw().await?;
        let (size_bytes, total_conversations) = raw
            .as_deref()
            .map_or((0, 0), |raw| (raw.len(), parse_collection(raw).len()));

        Ok(StorageInfo {
            total_conversations,
            size_bytes,
            max_conversations: self.max_conversations,
        })
    }
}
