//! Port definitions for provider adapters
//!
//! Defines the trait every language-model backend implements, plus the
//! per-adapter exchange history.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::ProviderId;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// A language-model backend that turns a prompt into a reply
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Send a single-turn prompt and return the reply text
    async fn send_prompt(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Id of the provider this adapter serves
    fn provider_id(&self) -> &ProviderId;

    /// Successful exchanges made through this adapter
    fn exchange_log(&self) -> &ExchangeLog;
}

/// One completed prompt/reply pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub prompt: String,
    pub reply: String,
    pub timestamp: DateTime<Utc>,
}

/// Append-only record of completed exchanges
#[derive(Debug, Default)]
pub struct ExchangeLog {
    entries: Mutex<Vec<Exchange>>,
}

impl ExchangeLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed exchange
    pub fn record(&self, prompt: &str, reply: &str) {
        self.entries.lock().push(Exchange {
            prompt: prompt.to_string(),
            reply: reply.to_string(),
            timestamp: Utc::now(),
        });
    }

    /// Copy of all recorded exchanges, oldest first
    pub fn entries(&self) -> Vec<Exchange> {
        self.entries.lock().clone()
    }

    /// Number of recorded exchanges
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
