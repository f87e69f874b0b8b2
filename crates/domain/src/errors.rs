//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// Provider identifier is empty or contains unsupported characters
    #[error("Invalid provider id: {0}")]
    InvalidProviderId(String),

    /// Conversation identifier is empty
    #[error("Invalid conversation id: {0}")]
    InvalidConversationId(String),

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}
