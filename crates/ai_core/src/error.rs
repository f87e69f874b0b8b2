//! Provider errors

use thiserror::Error;

/// Errors that can occur while talking to a provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider answered with a non-success status
    #[error("{0}")]
    Api(String),

    /// The local inference server could not be reached
    #[error(
        "Cannot connect to the local inference server on {url}. Make sure it is running and the URL is correct."
    )]
    Unreachable { url: String },

    /// The hosted API could not be reached
    #[error("Network error: unable to reach the API ({0})")]
    Network(String),

    /// The response did not have the expected shape
    #[error("{0}")]
    InvalidResponse(String),

    /// The request exceeded the configured timeout
    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    /// Any other transport failure
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The adapter could not be constructed
    #[error("Client setup failed: {0}")]
    ClientSetup(String),
}

impl ProviderError {
    /// Whether retrying the same request later may succeed
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Unreachable { .. } | Self::Network(_) | Self::Timeout(_)
        )
    }
}

impl ProviderError {
    /// Map a transport error, reporting timeouts with the configured limit
    pub fn from_transport(err: reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout_ms)
        } else {
            Self::from(err)
        }
    }
}

/// The request URL is dropped from the message; it may carry a credential
/// in its query string.
impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_connect() {
            Self::Network(err.to_string())
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}
