//! Shared fixtures for the command tests

use std::sync::Arc;

use application::{ApplicationError, ProviderGateway, ProviderInfo};
use async_trait::async_trait;
use domain::{ProviderFamily, ProviderId};
use infrastructure::InMemoryLocalStorage;

use crate::app::App;

/// Replies with the provider id and the prompt
pub struct EchoGateway;

#[async_trait]
impl ProviderGateway for EchoGateway {
    fn providers(&self) -> Vec<ProviderInfo> {
        ["alpha", "beta"]
            .into_iter()
            .map(|id| ProviderInfo {
                id: ProviderId::parse(id).unwrap(),
                display_name: id.to_uppercase(),
                icon: None,
                family: ProviderFamily::LocalInference,
                model: "m".to_string(),
            })
            .collect()
    }

    async fn send_prompt(
        &self,
        provider: &ProviderId,
        prompt: &str,
    ) -> Result<String, ApplicationError> {
        Ok(format!("{provider} heard {prompt}"))
    }
}

pub fn memory_app() -> App {
    App::from_parts(
        Arc::new(EchoGateway),
        Arc::new(InMemoryLocalStorage::new()),
        20,
    )
}
