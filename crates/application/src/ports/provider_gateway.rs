//! Provider gateway port - Routes prompts to configured model backends

use async_trait::async_trait;
use domain::{ProviderDescriptor, ProviderFamily, ProviderId};
#[cfg(test)]
use mockall::automock;
use serde::Serialize;

use crate::error::ApplicationError;

/// Public, credential-free view of a registered provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderInfo {
    pub id: ProviderId,
    pub display_name: String,
    pub icon: Option<String>,
    pub family: ProviderFamily,
    pub model: String,
}

impl ProviderInfo {
    /// Label for display, including the icon when present
    pub fn label(&self) -> String {
        match &self.icon {
            Some(icon) => format!("{icon} {}", self.display_name),
            None => self.display_name.clone(),
        }
    }
}

impl From<&ProviderDescriptor> for ProviderInfo {
    fn from(descriptor: &ProviderDescriptor) -> Self {
        Self {
            id: descriptor.id.clone(),
            display_name: descriptor.display_name.clone(),
            icon: descriptor.icon.clone(),
            family: descriptor.kind.family(),
            model: descriptor.kind.model().to_string(),
        }
    }
}

/// Port for sending prompts to language-model providers
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProviderGateway: Send + Sync {
    /// Registered providers in declaration order
    fn providers(&self) -> Vec<ProviderInfo>;

    /// Send a single-turn prompt to the given provider
    ///
    /// Failures are reported as [`ApplicationError::Provider`] (or
    /// [`ApplicationError::UnknownProvider`]) and never panic.
    async fn send_prompt(
        &self,
        provider: &ProviderId,
        prompt: &str,
    ) -> Result<String, ApplicationError>;
}
