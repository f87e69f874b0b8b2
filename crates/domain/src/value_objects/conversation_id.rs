//! Conversation identifier used as the storage key for a chat session

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;

/// Key of the conversation used when no explicit session id is chosen
const CURRENT_KEY: &str = "current";

/// A unique conversation/session identifier
///
/// Stored conversations are keyed by an opaque string, so identifiers
/// imported from older exports (e.g. `"current"`) stay valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// Create a new random conversation ID
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The well-known id of the default session
    pub fn current() -> Self {
        Self(CURRENT_KEY.to_string())
    }

    /// Parse a conversation ID from a string
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidConversationId(s.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the underlying key
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ConversationId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid.to_string())
    }
}
