//! Speech processing errors

use thiserror::Error;

/// Errors that can occur during speech recognition or synthesis
#[derive(Debug, Error)]
pub enum SpeechError {
    /// The platform offers no recognition or synthesis service
    #[error("{0} not supported on this platform")]
    NotSupported(String),

    /// The recognition service reported a failure
    #[error("Speech recognition error: {0}")]
    Recognition(String),

    /// The synthesis service reported a failure
    #[error("Speech synthesis error: {0}")]
    Synthesis(String),

    /// The bridge was used outside a Tokio runtime
    #[error("No async runtime available: {0}")]
    Runtime(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl SpeechError {
    /// Check if this error is retryable
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Recognition(_) | Self::Synthesis(_))
    }
}
