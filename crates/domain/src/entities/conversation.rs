//! Conversation entity - A sequence of chat messages

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ChatMessage;
use crate::value_objects::ConversationId;

/// Number of characters of the first message shown in a summary
pub const PREVIEW_CHARS: usize = 50;

/// Preview used for conversations without messages
pub const EMPTY_PREVIEW: &str = "Empty conversation";

/// A conversation containing a sequence of messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation identifier
    pub id: ConversationId,
    /// Messages in the conversation (oldest first)
    pub messages: Vec<ChatMessage>,
    /// When the conversation was last modified
    pub last_modified: DateTime<Utc>,
}

impl Conversation {
    /// Create a new empty conversation
    pub fn new(id: ConversationId) -> Self {
        Self::with_messages(id, Vec::new())
    }

    /// Create a conversation from an existing message list
    pub fn with_messages(id: ConversationId, messages: Vec<ChatMessage>) -> Self {
        Self {
            id,
            messages,
            last_modified: Utc::now(),
        }
    }

    /// Add a message to the conversation
    pub fn add_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
        self.touch();
    }

    /// Mark the conversation as modified now
    pub fn touch(&mut self) {
        self.last_modified = Utc::now();
    }

    /// Get the last message in the conversation
    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Get the number of messages
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Check if the conversation has no messages
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Build the listing summary for this conversation
    pub fn summary(&self) -> ConversationSummary {
        ConversationSummary {
            id: self.id.clone(),
            last_modified: self.last_modified,
            message_count: self.messages.len(),
            preview: preview_of(&self.messages),
        }
    }
}

/// Listing entry for a stored conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// Conversation identifier
    pub id: ConversationId,
    /// When the conversation was last modified
    pub last_modified: DateTime<Utc>,
    /// Number of stored messages
    pub message_count: usize,
    /// Start of the first message, or a placeholder
    pub preview: String,
}

fn preview_of(messages: &[ChatMessage]) -> String {
    messages.first().map_or_else(
        || EMPTY_PREVIEW.to_string(),
        |m| m.text.chars().take(PREVIEW_CHARS).collect(),
    )
}
