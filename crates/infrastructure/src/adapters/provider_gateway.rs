//! Provider gateway adapter - Implements ProviderGateway using ai_core

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use ai_core::{Exchange, ProviderAdapter, ProviderError, ProviderRegistry, SamplingConfig};
use application::{
    error::ApplicationError,
    ports::{ProviderGateway, ProviderInfo},
};
use async_trait::async_trait;
use domain::ProviderId;
use tracing::{debug, info, instrument, warn};

/// Routes prompts to the adapter of the chosen provider
pub struct RegistryProviderGateway {
    registry: ProviderRegistry,
    adapters: HashMap<ProviderId, Arc<dyn ProviderAdapter>>,
}

impl std::fmt::Debug for RegistryProviderGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryProviderGateway")
            .field("providers", &self.registry.len())
            .finish_non_exhaustive()
    }
}

impl RegistryProviderGateway {
    /// Build one adapter per registered provider
    pub fn new(registry: ProviderRegistry, sampling: &SamplingConfig) -> Result<Self, ApplicationError> {
        let adapters = registry
            .build_adapters(sampling)
            .map_err(|e| ApplicationError::Configuration(e.to_string()))?;
        Ok(Self::with_adapters(registry, adapters))
    }

    /// Use pre-built adapters; adapters for unregistered ids are ignored
    pub fn with_adapters(registry: ProviderRegistry, adapters: Vec<Arc<dyn ProviderAdapter>>) -> Self {
        let adapters: HashMap<_, _> = adapters
            .into_iter()
            .filter(|adapter| registry.contains(adapter.provider_id()))
            .map(|adapter| (adapter.provider_id().clone(), adapter))
            .collect();

        info!(providers = adapters.len(), "Provider gateway ready");
        Self { registry, adapters }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Completed exchanges of one provider, oldest first
    pub fn exchange_history(&self, provider: &ProviderId) -> Option<Vec<Exchange>> {
        self.adapters
            .get(provider)
            .map(|adapter| adapter.exchange_log().entries())
    }

    fn map_error(e: &ProviderError) -> ApplicationError {
        ApplicationError::Provider {
            message: e.to_string(),
            retryable: e.is_retryable(),
        }
    }
}

#[async_trait]
impl ProviderGateway for RegistryProviderGateway {
    fn providers(&self) -> Vec<ProviderInfo> {
        self.registry
            .descriptors()
            .iter()
            .map(ProviderInfo::from)
            .collect()
    }

    #[instrument(skip(self, prompt), fields(provider = %provider, prompt_len = prompt.len()))]
    async fn send_prompt(&self, provider: &ProviderId, prompt: &str) -> Result<String, ApplicationError> {
        let adapter = self
            .adapters
            .get(provider)
            .ok_or_else(|| ApplicationError::UnknownProvider(provider.to_string()))?;

        let start = Instant::now();
        match adapter.send_prompt(prompt).await {
            Ok(reply) => {
                debug!(
                    latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
                    reply_len = reply.len(),
                    "Provider replied"
                );
                Ok(reply)
            },
            Err(e) => {
                warn!(error = %e, retryable = e.is_retryable(), "Provider call failed");
                Err(Self::map_error(&e))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use ai_core::{ExchangeLog, ProviderSettings};

    use super::*;

    /// Adapter answering from a fixed script
    struct ScriptedAdapter {
        id: ProviderId,
        reply: Option<String>,
        log: ExchangeLog,
    }

    impl ScriptedAdapter {
        fn new(id: &str, reply: Option<&str>) -> Arc<dyn ProviderAdapter> {
            Arc::new(Self {
                id: ProviderId::parse(id).unwrap(),
                reply: reply.map(ToString::to_string),
                log: ExchangeLog::new(),
            })
        }
    }

    #[async_trait]
    impl ProviderAdapter for ScriptedAdapter {
        async fn send_prompt(&self, prompt: &str) -> Result<String, ProviderError> {
            match &self.reply {
                Some(reply) => {
                    self.log.record(prompt, reply);
                    Ok(reply.clone())
                },
                None => Err(ProviderError::Unreachable {
                    url: "http://localhost:1234".to_string(),
                }),
            }
        }

        fn provider_id(&self) -> &ProviderId {
            &self.id
        }

        fn exchange_log(&self) -> &ExchangeLog {
            &self.log
        }
    }

    fn registry() -> ProviderRegistry {
        ProviderRegistry::load(&ProviderSettings::from_pairs([
            ("PROVIDERS", "good,down"),
            ("GOOD_TYPE", "local-inference"),
            ("GOOD_NAME", "Good"),
            ("GOOD_MODEL", "m"),
            ("DOWN_TYPE", "local-inference"),
            ("DOWN_NAME", "Down"),
            ("DOWN_MODEL", "m"),
        ]))
    }

    fn gateway() -> RegistryProviderGateway {
        RegistryProviderGateway::with_adapters(
            registry(),
            vec![
                ScriptedAdapter::new("good", Some("pong")),
                ScriptedAdapter::new("down", None),
                ScriptedAdapter::new("stray", Some("ignored")),
            ],
        )
    }

    #[test]
    fn providers_follow_declaration_order() {
        let names: Vec<_> = gateway()
            .providers()
            .into_iter()
            .map(|p| p.display_name)
            .collect();
        assert_eq!(names, vec!["Good", "Down"]);
    }

    #[tokio::test]
    async fn routes_to_matching_adapter_and_records_history() {
        let gateway = gateway();
        let good = ProviderId::parse("good").unwrap();

        assert_eq!(gateway.send_prompt(&good, "ping").await.unwrap(), "pong");

        let history = gateway.exchange_history(&good).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].prompt, "ping");
    }

    #[tokio::test]
    async fn adapter_failure_becomes_retryable_provider_error() {
        let gateway = gateway();
        let err = gateway
            .send_prompt(&ProviderId::parse("down").unwrap(), "ping")
            .await
            .unwrap_err();

        match err {
            ApplicationError::Provider { message, retryable } => {
                assert!(message.contains("Cannot connect to the local inference server"));
                assert!(retryable);
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unregistered_provider_is_rejected() {
        let gateway = gateway();
        let err = gateway
            .send_prompt(&ProviderId::parse("stray").unwrap(), "ping")
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::UnknownProvider(_)));
    }

    #[test]
    fn new_builds_adapters_from_registry() {
        let gateway = RegistryProviderGateway::new(registry(), &SamplingConfig::default()).unwrap();
        assert_eq!(gateway.providers().len(), 2);
        assert!(gateway
            .exchange_history(&ProviderId::parse("good").unwrap())
            .unwrap()
            .is_empty());
    }
}
