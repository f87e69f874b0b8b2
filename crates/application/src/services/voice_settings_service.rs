//! Voice settings service - Reads and adjusts the persisted voice profile

use std::sync::Arc;

use domain::{VoiceProfile, VoiceSetting};
use tracing::{debug, instrument, warn};

use crate::error::ApplicationError;
use crate::ports::VoiceSettingsStore;

/// Use cases around the speech synthesis preferences
pub struct VoiceSettingsService {
    store: Arc<dyn VoiceSettingsStore>,
}

impl std::fmt::Debug for VoiceSettingsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceSettingsService").finish_non_exhaustive()
    }
}

impl VoiceSettingsService {
    pub fn new(store: Arc<dyn VoiceSettingsStore>) -> Self {
        Self { store }
    }

    /// The stored profile, or defaults when nothing usable is stored
    #[instrument(skip(self))]
    pub async fn current(&self) -> VoiceProfile {
        match self.store.load().await {
            Ok(Some(profile)) => profile.sanitized(),
            Ok(None) => VoiceProfile::default(),
            Err(e) => {
                warn!(error = %e, "Failed to load voice settings, using defaults");
                VoiceProfile::default()
            },
        }
    }

    /// Change one field and persist the result
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        setting: VoiceSetting,
        value: f64,
    ) -> Result<VoiceProfile, ApplicationError> {
        let mut profile = self.current().await;
        profile.set(setting, value)?;
        self.store.save(&profile).await?;
        debug!(%setting, value, "Voice setting updated");
        Ok(profile)
    }

    /// Persist a whole profile
    pub async fn save(&self, profile: &VoiceProfile) -> Result<VoiceProfile, ApplicationError> {
        let profile = profile.sanitized();
        self.store.save(&profile).await?;
        Ok(profile)
    }

    /// Forget stored settings; defaults apply afterwards
    pub async fn reset(&self) -> Result<(), ApplicationError> {
        self.store.clear().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{MockVoiceSettingsStore, StorageError};

    #[tokio::test]
    async fn current_defaults_when_nothing_stored() {
        let mut store = MockVoiceSettingsStore::new();
        store.expect_load().returning(|| Ok(None));

        let service = VoiceSettingsService::new(Arc::new(store));
        assert_eq!(service.current().await, VoiceProfile::default());
    }

    #[tokio::test]
    async fn current_defaults_on_storage_error() {
        let mut store = MockVoiceSettingsStore::new();
        store
            .expect_load()
            .returning(|| Err(StorageError::Backend("gone".to_string()).into()));

        let service = VoiceSettingsService::new(Arc::new(store));
        assert_eq!(service.current().await, VoiceProfile::default());
    }

    #[tokio::test]
    async fn current_sanitizes_stored_profile() {
        let mut store = MockVoiceSettingsStore::new();
        store.expect_load().returning(|| {
            Ok(Some(VoiceProfile {
                rate: 9.0,
                pitch: 1.2,
                volume: 0.5,
                selected_voice_index: Some(2),
            }))
        });

        let service = VoiceSettingsService::new(Arc::new(store));
        let profile = service.current().await;
        assert!((profile.rate - 0.95).abs() < f32::EPSILON);
        assert!((profile.pitch - 1.2).abs() < f32::EPSILON);
        assert_eq!(profile.selected_voice_index, Some(2));
    }

    #[tokio::test]
    async fn update_persists_changed_field() {
        let mut store = MockVoiceSettingsStore::new();
        store.expect_load().returning(|| Ok(None));
        store
            .expect_save()
            .withf(|p| (p.volume - 0.5).abs() < f32::EPSILON)
            .times(1)
            .returning(|_| Ok(()));

        let service = VoiceSettingsService::new(Arc::new(store));
        let profile = service.update(VoiceSetting::Volume, 0.5).await.unwrap();
        assert!((profile.volume - 0.5).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn update_rejects_out_of_range_without_saving() {
        let mut store = MockVoiceSettingsStore::new();
        store.expect_load().returning(|| Ok(None));
        store.expect_save().never();

        let service = VoiceSettingsService::new(Arc::new(store));
        let err = service.update(VoiceSetting::Rate, 7.0).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Domain(_)));
    }

    #[tokio::test]
    async fn reset_clears_store() {
        let mut store = MockVoiceSettingsStore::new();
        store.expect_clear().times(1).returning(|| Ok(()));

        let service = VoiceSettingsService::new(Arc::new(store));
        service.reset().await.unwrap();
    }
}
