//! Voice settings storage port

use async_trait::async_trait;
use domain::VoiceProfile;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for persisting the speech synthesis preferences
#[cfg_attr(test, automock)]
#[async_trait]
pub trait VoiceSettingsStore: Send + Sync {
    /// Persist the profile
    async fn save(&self, profile: &VoiceProfile) -> Result<(), ApplicationError>;

    /// Load the stored profile, if any
    ///
    /// Invalid fields are replaced with their defaults.
    async fn load(&self) -> Result<Option<VoiceProfile>, ApplicationError>;

    /// Forget the stored profile
    async fn clear(&self) -> Result<(), ApplicationError>;
}
