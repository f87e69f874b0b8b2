//! Application-level errors

use domain::DomainError;
use thiserror::Error;

use crate::ports::StorageError;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A provider call failed; the message is shown to the user as-is
    #[error("{message}")]
    Provider { message: String, retryable: bool },

    /// Persistence failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Speech recognition or synthesis failed
    #[error("Speech error: {0}")]
    Speech(String),

    /// A reply is still pending
    #[error("An exchange is already in flight")]
    ExchangeInFlight,

    /// The requested provider is not registered
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// Requested entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Provider { retryable, .. } => *retryable,
            Self::ExchangeInFlight => true,
            Self::Storage(err) => err.is_retryable(),
            _ => false,
        }
    }
}
