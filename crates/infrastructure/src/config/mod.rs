//! Application configuration
//!
//! Settings are read from an optional `config.toml` and overridden by
//! `VOXCHAT__SECTION__FIELD` environment variables. Provider declarations
//! use flat keys: the `[providers]` table of the file, overlaid with
//! `VOXCHAT_<KEY>` environment variables.

mod storage;

use std::collections::BTreeMap;
use std::path::Path;

use ai_core::{ProviderSettings, SamplingConfig};
use ai_speech::SpeechConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::telemetry::TelemetryConfig;

pub use storage::{StorageBackend, StorageConfig};

/// Prefix of flat provider keys in the environment, e.g. `VOXCHAT_GEMINI_TYPE`
pub const PROVIDER_ENV_PREFIX: &str = "VOXCHAT_";

/// Prefix of nested settings in the environment, e.g. `VOXCHAT__STORAGE__PATH`
const SETTINGS_ENV_PREFIX: &str = "VOXCHAT";

const DEFAULT_CONFIG_FILE: &str = "config";

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Local storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Provider request options
    #[serde(default)]
    pub sampling: SamplingConfig,

    /// Speech bridge configuration
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Flat provider keys (`PROVIDERS`, `GEMINI_TYPE`, ...)
    #[serde(default)]
    pub providers: BTreeMap<String, String>,
}

impl AppConfig {
    /// Load `config.toml` from the working directory (if present) plus
    /// environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(None)
    }

    /// Load from an explicit file, which must exist, or fall back to
    /// [`AppConfig::load`] behaviour when `path` is `None`
    pub fn load_from(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config: Self = config::Config::builder()
            .add_source(file)
            // Override with environment variables (e.g., VOXCHAT__STORAGE__PATH)
            .add_source(
                config::Environment::with_prefix(SETTINGS_ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        debug!(
            backend = ?config.storage.backend,
            provider_keys = config.providers.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Provider keys from the `[providers]` table only
    pub fn file_provider_settings(&self) -> ProviderSettings {
        ProviderSettings::from_pairs(&self.providers)
    }

    /// Provider keys from the file overlaid with `VOXCHAT_*` environment keys
    pub fn provider_settings(&self) -> ProviderSettings {
        self.file_provider_settings()
            .merged_with(&ProviderSettings::from_env(PROVIDER_ENV_PREFIX))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use ai_core::ProviderRegistry;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_are_sensible() {
        let config = AppConfig::default();
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.storage.path, "voxchat.db");
        assert_eq!(config.storage.max_conversations, 20);
        assert!(config.storage.run_migrations);
        assert_eq!(config.sampling.timeout_ms, 60_000);
        assert!(config.providers.is_empty());
    }

    #[test]
    fn load_reads_sections_and_keeps_defaults() {
        let file = write_config(
            r#"
            [storage]
            backend = "memory"
            max_conversations = 5

            [sampling.local]
            temperature = 0.2

            [telemetry]
            json = true
            "#,
        );

        let config = AppConfig::load_from(Some(file.path())).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.max_conversations, 5);
        assert_eq!(config.storage.path, "voxchat.db");
        assert!((config.sampling.local.temperature - 0.2).abs() < f32::EPSILON);
        assert!((config.sampling.cloud.temperature - 0.9).abs() < f32::EPSILON);
        assert!(config.telemetry.json);
    }

    #[test]
    fn providers_table_feeds_the_registry() {
        let file = write_config(
            r#"
            [providers]
            PROVIDERS = "lmstudio"
            LMSTUDIO_TYPE = "local-inference"
            LMSTUDIO_NAME = "LM Studio"
            LMSTUDIO_MODEL = "qwen2.5-7b-instruct"
            "#,
        );

        let config = AppConfig::load_from(Some(file.path())).unwrap();
        let registry = ProviderRegistry::load(&config.file_provider_settings());

        assert_eq!(registry.len(), 1);
        let descriptor = &registry.descriptors()[0];
        assert_eq!(descriptor.id.as_str(), "lmstudio");
        assert_eq!(descriptor.display_name, "LM Studio");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = AppConfig::load_from(Some(Path::new("/nonexistent/voxchat.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn storage_config_serialization() {
        let config = StorageConfig {
            backend: StorageBackend::Memory,
            path: ":memory:".to_string(),
            max_connections: 1,
            run_migrations: false,
            max_conversations: 3,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"backend\":\"memory\""));
        let parsed: StorageConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
