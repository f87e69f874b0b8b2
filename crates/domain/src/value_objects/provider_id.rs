//! Provider identifier - lowercase key of a configured model backend

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// A unique, lowercase provider key (e.g. `gemini`, `lmstudio`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProviderId(String);

impl ProviderId {
    /// Parse and normalize a provider id
    ///
    /// Surrounding whitespace is trimmed and the key is lowercased. Only ASCII
    /// letters, digits, `-` and `_` are accepted.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let normalized = raw.trim().to_ascii_lowercase();
        let valid = !normalized.is_empty()
            && normalized
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if valid {
            Ok(Self(normalized))
        } else {
            Err(DomainError::InvalidProviderId(raw.to_string()))
        }
    }

    /// Get the key
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Upper-case form used in environment-style configuration keys
    pub fn config_key(&self) -> String {
        self.0.replace('-', "_").to_ascii_uppercase()
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ProviderId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ProviderId> for String {
    fn from(id: ProviderId) -> Self {
        id.0
    }
}
