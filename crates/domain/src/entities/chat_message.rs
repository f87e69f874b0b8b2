//! Chat message entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{MessageId, ProviderId};

/// Prefix of the text shown for a failed exchange
pub const ERROR_TEXT_PREFIX: &str = "Error: ";

/// Role of the message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user
    User,
    /// Message from the assistant
    Assistant,
}

/// Lifecycle status of a message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    /// Settled content
    #[default]
    Final,
    /// Placeholder for a reply that is still in flight
    Pending,
    /// The exchange failed; the text describes why
    Error,
}

/// A single message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message identifier
    pub id: MessageId,
    /// Role of the sender
    pub role: MessageRole,
    /// Message text
    pub text: String,
    /// Lifecycle status
    #[serde(default)]
    pub status: MessageStatus,
    /// When the message was created
    pub created_at: DateTime<Utc>,
    /// Provider that produced this message (assistant messages only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<ProviderId>,
    /// Display name of that provider at the time of the exchange
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_label: Option<String>,
}

impl ChatMessage {
    fn build(role: MessageRole, text: String, status: MessageStatus) -> Self {
        Self {
            id: MessageId::next(),
            role,
            text,
            status,
            created_at: Utc::now(),
            provider_id: None,
            provider_label: None,
        }
    }

    /// Create a new user message
    pub fn user(text: impl Into<String>) -> Self {
        Self::build(MessageRole::User, text.into(), MessageStatus::Final)
    }

    /// Create a new final assistant message
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::build(MessageRole::Assistant, text.into(), MessageStatus::Final)
    }

    /// Create the placeholder shown while a reply is in flight
    pub fn pending() -> Self {
        Self::build(MessageRole::Assistant, String::new(), MessageStatus::Pending)
    }

    /// Create an assistant message describing a failed exchange
    pub fn error(description: impl AsRef<str>) -> Self {
        Self::build(
            MessageRole::Assistant,
            format!("{ERROR_TEXT_PREFIX}{}", description.as_ref()),
            MessageStatus::Error,
        )
    }

    /// Tag the message with the provider that produced it
    pub fn with_provider(mut self, id: ProviderId, label: impl Into<String>) -> Self {
        self.provider_id = Some(id);
        self.provider_label = Some(label.into());
        self
    }

    /// Whether this is the in-flight placeholder
    pub fn is_pending(&self) -> bool {
        self.status == MessageStatus::Pending
    }

    /// Whether this message reports a failed exchange
    pub fn is_error(&self) -> bool {
        self.status == MessageStatus::Error
    }

    /// Whether the message was sent by the user
    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_has_correct_role() {
        let msg = ChatMessage::user("Hello");
        assert_eq!(msg.role, MessageRole::User);
        assert_eq!(msg.text, "Hello");
        assert_eq!(msg.status, MessageStatus::Final);
        assert!(msg.is_user());
    }

    #[test]
    fn assistant_message_has_correct_role() {
        let msg = ChatMessage::assistant("Hi there!");
        assert_eq!(msg.role, MessageRole::Assistant);
        assert!(!msg.is_pending());
    }

    #[test]
    fn pending_placeholder_is_empty_assistant() {
        let msg = ChatMessage::pending();
        assert_eq!(msg.role, MessageRole::Assistant);
        assert!(msg.is_pending());
        assert!(msg.text.is_empty());
    }

    #[test]
    fn error_message_is_prefixed() {
        let msg = ChatMessage::error("timeout");
        assert_eq!(msg.text, "Error: timeout");
        assert!(msg.is_error());
    }

    #[test]
    fn provider_tagging() {
        let id = ProviderId::parse("gemini").unwrap();
        let msg = ChatMessage::assistant("ok").with_provider(id.clone(), "Gemini");
        assert_eq!(msg.provider_id, Some(id));
        assert_eq!(msg.provider_label.as_deref(), Some("Gemini"));
    }

    #[test]
    fn ids_increase_in_creation_order() {
        let a = ChatMessage::user("a");
        let b = ChatMessage::user("b");
        assert!(b.id > a.id);
    }

    #[test]
    fn serde_uses_lowercase_tags_and_skips_missing_provider() {
        let json = serde_json::to_string(&ChatMessage::user("hi")).unwrap();
        assert!(json.contains("\"role\":\"user\""));
        assert!(json.contains("\"status\":\"final\""));
        assert!(!json.contains("provider_id"));
    }

    #[test]
    fn missing_status_deserializes_as_final() {
        let json = r#"{"id":7,"role":"assistant","text":"x","created_at":"2024-01-01T00:00:00Z"}"#;
        let msg: ChatMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.status, MessageStatus::Final);
        assert_eq!(msg.id, MessageId::from_raw(7));
    }
}
