//! Provider descriptor - a configured language-model backend

use std::fmt;
use std::str::FromStr;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::value_objects::ProviderId;

/// The protocol family a provider speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderFamily {
    /// Hosted generative-content API authenticated with an API key
    CloudGenerative,
    /// OpenAI-compatible chat-completions server on the local network
    LocalInference,
}

impl ProviderFamily {
    /// Canonical configuration name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CloudGenerative => "cloud-generative",
            Self::LocalInference => "local-inference",
        }
    }
}

impl fmt::Display for ProviderFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderFamily {
    type Err = DomainError;

    /// Accepts the canonical names plus the short aliases used in older
    /// configurations (`gemini`, `lmstudio`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cloud-generative" | "cloud" | "gemini" => Ok(Self::CloudGenerative),
            "local-inference" | "local" | "lmstudio" => Ok(Self::LocalInference),
            other => Err(DomainError::ValidationError(format!(
                "unknown provider type '{other}'"
            ))),
        }
    }
}

/// Connection details, closed over the supported families
#[derive(Debug, Clone)]
pub enum ProviderKind {
    /// Hosted generative-content API
    CloudGenerative {
        /// API key sent with every request
        api_key: SecretString,
        /// Model name substituted into the endpoint template
        model: String,
        /// Endpoint URL containing a `{model}` placeholder
        endpoint_template: String,
    },
    /// Local chat-completions server
    LocalInference {
        /// Server base URL, e.g. `http://localhost:1234`
        base_url: String,
        /// Model loaded in the server
        model: String,
    },
}

impl ProviderKind {
    /// The family of this kind
    pub const fn family(&self) -> ProviderFamily {
        match self {
            Self::CloudGenerative { .. } => ProviderFamily::CloudGenerative,
            Self::LocalInference { .. } => ProviderFamily::LocalInference,
        }
    }

    /// Model name used by the provider
    pub fn model(&self) -> &str {
        match self {
            Self::CloudGenerative { model, .. } | Self::LocalInference { model, .. } => model,
        }
    }
}

/// A validated, immutable provider entry
#[derive(Debug, Clone)]
pub struct ProviderDescriptor {
    /// Unique key
    pub id: ProviderId,
    /// Human readable name
    pub display_name: String,
    /// Optional icon (emoji or short label)
    pub icon: Option<String>,
    /// Connection details
    pub kind: ProviderKind,
}

impl ProviderDescriptor {
    /// Label for display, including the icon when present
    pub fn label(&self) -> String {
        match &self.icon {
            Some(icon) => format!("{icon} {}", self.display_name),
            None => self.display_name.clone(),
        }
    }
}
