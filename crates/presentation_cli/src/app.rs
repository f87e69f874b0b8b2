//! Component wiring from configuration

use std::sync::Arc;

use ai_core::ProviderRegistry;
use anyhow::{Context, Result};
use application::{
    ConversationEngine, ConversationStore, LocalStorage, ProviderGateway, VoiceSettingsService,
};
use infrastructure::{
    AppConfig, InMemoryLocalStorage, LocalStorageConversationStore,
    LocalStorageVoiceSettingsStore, RegistryProviderGateway, SqliteLocalStorage, StorageBackend,
    create_pool,
};
use tracing::info;

/// Everything a command needs
pub struct App {
    pub gateway: Arc<dyn ProviderGateway>,
    pub conversations: Arc<dyn ConversationStore>,
    pub voice_settings: Arc<VoiceSettingsService>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App").finish_non_exhaustive()
    }
}

impl App {
    /// Open storage and register providers
    pub fn build(config: &AppConfig) -> Result<Self> {
        let storage: Arc<dyn LocalStorage> = match config.storage.backend {
            StorageBackend::Memory => Arc::new(InMemoryLocalStorage::new()),
            StorageBackend::Sqlite => {
                let pool = create_pool(&config.storage)
                    .with_context(|| format!("Failed to open database {}", config.storage.path))?;
                Arc::new(SqliteLocalStorage::new(Arc::new(pool)))
            },
        };

        let registry = ProviderRegistry::load(&config.provider_settings());
        let registered = registry.len();
        let rejected = registry.rejected().len();
        let gateway = RegistryProviderGateway::new(registry, &config.sampling)
            .context("Failed to create provider adapters")?;

        info!(
            backend = ?config.storage.backend,
            registered,
            rejected,
            "Application components ready"
        );

        Ok(Self::from_parts(
            Arc::new(gateway),
            storage,
            config.storage.max_conversations,
        ))
    }

    /// Assemble from an existing gateway and storage backend
    pub fn from_parts(
        gateway: Arc<dyn ProviderGateway>,
        storage: Arc<dyn LocalStorage>,
        max_conversations: usize,
    ) -> Self {
        let conversations = Arc::new(LocalStorageConversationStore::with_max_conversations(
            Arc::clone(&storage),
            max_conversations,
        ));
        let voice_settings = Arc::new(VoiceSettingsService::new(Arc::new(
            LocalStorageVoiceSettingsStore::new(storage),
        )));

        Self {
            gateway,
            conversations,
            voice_settings,
        }
    }

    /// A fresh engine on the shared gateway and store
    pub fn engine(&self) -> ConversationEngine {
        ConversationEngine::new(Arc::clone(&self.gateway), Arc::clone(&self.conversations))
    }
}
