//! Configuration for provider adapters

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Sampling and transport options shared by all adapters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Options for hosted generative-content providers
    #[serde(default)]
    pub cloud: CloudSampling,

    /// Options for local chat-completions servers
    #[serde(default)]
    pub local: LocalSampling,
}

/// Generation options sent to the hosted API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudSampling {
    #[serde(default = "default_cloud_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_max_tokens")]
    pub max_output_tokens: u32,
}

/// Generation options sent to the local server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalSampling {
    #[serde(default = "default_local_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

const fn default_timeout_ms() -> u64 {
    60_000
}

const fn default_cloud_temperature() -> f32 {
    0.9
}

const fn default_local_temperature() -> f32 {
    0.7
}

const fn default_top_k() -> u32 {
    40
}

const fn default_top_p() -> f32 {
    0.95
}

const fn default_max_tokens() -> u32 {
    1024
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            cloud: CloudSampling::default(),
            local: LocalSampling::default(),
        }
    }
}

impl Default for CloudSampling {
    fn default() -> Self {
        Self {
            temperature: default_cloud_temperature(),
            top_k: default_top_k(),
            top_p: default_top_p(),
            max_output_tokens: default_max_tokens(),
        }
    }
}

impl Default for LocalSampling {
    fn default() -> Self {
        Self {
            temperature: default_local_temperature(),
            top_p: default_top_p(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Flat provider configuration keys
///
/// Keys are stored upper-cased without any prefix, e.g. `PROVIDERS`,
/// `GEMINI_TYPE`, `LMSTUDIO_API_URL`. Values are trimmed; empty values count
/// as unset.
#[derive(Debug, Clone, Default)]
pub struct ProviderSettings {
    values: BTreeMap<String, String>,
}

impl ProviderSettings {
    /// Key holding the comma separated list of provider ids
    pub const PROVIDERS_KEY: &'static str = "PROVIDERS";

    /// Build settings from key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut settings = Self::default();
        for (key, value) in pairs {
            settings.insert(key.as_ref(), value.as_ref());
        }
        settings
    }

    /// Collect every environment variable starting with `prefix`
    ///
    /// Keys that continue with an underscore after the prefix (the
    /// `VOXCHAT__SECTION__FIELD` form used for application settings) are
    /// skipped.
    pub fn from_env(prefix: &str) -> Self {
        Self::from_pairs(std::env::vars().filter_map(|(key, value)| {
            let rest = key.strip_prefix(prefix)?;
            (!rest.is_empty() && !rest.starts_with('_')).then(|| (rest.to_string(), value))
        }))
    }

    /// Overlay `other` on top of these settings
    #[must_use]
    pub fn merged_with(mut self, other: &Self) -> Self {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
        self
    }

    /// Insert a single key
    pub fn insert(&mut self, key: &str, value: &str) {
        let value = value.trim();
        if !value.is_empty() {
            self.values
                .insert(key.trim().to_ascii_uppercase(), value.to_string());
        }
    }

    /// Look up a key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(&key.to_ascii_uppercase())
            .map(String::as_str)
    }

    /// Look up a per-provider key, e.g. `field("GEMINI", "API_KEY")`
    pub fn field(&self, provider_key: &str, field: &str) -> Option<&str> {
        self.get(&format!("{provider_key}_{field}"))
    }

    /// Provider ids in declaration order
    pub fn declared_ids(&self) -> Vec<String> {
        self.get(Self::PROVIDERS_KEY)
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether no keys are set
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
