//! Message identifier - a process-wide monotonic token

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

static NEXT_MESSAGE_ID: AtomicU64 = AtomicU64::new(1);

/// Unique, monotonically increasing message identifier
///
/// Ids only need to be unique and ordered by creation within a process.
/// After restoring persisted messages call [`MessageId::observe`] so new ids
/// keep increasing past the restored ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(u64);

impl MessageId {
    /// Allocate the next id
    pub fn next() -> Self {
        Self(NEXT_MESSAGE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Make sure ids allocated from now on are greater than `seen`
    pub fn observe(seen: Self) {
        NEXT_MESSAGE_ID.fetch_max(seen.0.saturating_add(1), Ordering::Relaxed);
    }

    /// Wrap a raw value (used when restoring persisted messages)
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw value
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
