//! Voice settings store on top of local storage

use std::sync::Arc;

use application::{
    error::ApplicationError,
    ports::{LocalStorage, StorageError, VoiceSettingsStore},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::VoiceProfile;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Storage key of the voice profile
pub const VOICE_SETTINGS_KEY: &str = "ai_assistant_voice_settings";

/// `{rate, pitch, volume, selectedVoiceIndex, timestamp}`
#[derive(Debug, Serialize, Deserialize)]
struct StoredVoiceSettings {
    #[serde(flatten)]
    profile: VoiceProfile,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
}

/// [`VoiceSettingsStore`] that serializes into a [`LocalStorage`] item
pub struct LocalStorageVoiceSettingsStore {
    storage: Arc<dyn LocalStorage>,
}

impl std::fmt::Debug for LocalStorageVoiceSettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStorageVoiceSettingsStore")
            .finish_non_exhaustive()
    }
}

impl LocalStorageVoiceSettingsStore {
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl VoiceSettingsStore for LocalStorageVoiceSettingsStore {
    async fn save(&self, profile: &VoiceProfile) -> Result<(), ApplicationError> {
        let stored = StoredVoiceSettings {
            profile: *profile,
            timestamp: Some(Utc::now()),
        };
        let raw = serde_json::to_string(&stored).map_err(StorageError::from)?;
        self.storage.set_item(VOICE_SETTINGS_KEY, &raw).await?;
        debug!("Saved voice settings");
        Ok(())
    }

    async fn load(&self) -> Result<Option<VoiceProfile>, ApplicationError> {
        let Some(raw) = self.storage.get_item(VOICE_SETTINGS_KEY).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<StoredVoiceSettings>(&raw) {
            Ok(stored) => Ok(Some(stored.profile)),
            Err(e) => {
                warn!(error = %e, "Stored voice settings are unreadable, ignoring");
                Ok(None)
            },
        }
    }

    async fn clear(&self) -> Result<(), ApplicationError> {
        self.storage.remove_item(VOICE_SETTINGS_KEY).await?;
        Ok(())
    }
}
