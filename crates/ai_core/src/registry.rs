//! Provider registry
//!
//! Builds the ordered set of provider descriptors from flat configuration
//! keys. Invalid entries are rejected whole and reported, never partially
//! registered.

use std::sync::Arc;

use domain::{ProviderDescriptor, ProviderFamily, ProviderId, ProviderKind};
use secrecy::SecretString;
use thiserror::Error;
use tracing::{info, warn};

use crate::cloud::{CloudGenerativeAdapter, DEFAULT_CLOUD_MODEL, DEFAULT_ENDPOINT_TEMPLATE};
use crate::config::{ProviderSettings, SamplingConfig};
use crate::error::ProviderError;
use crate::local::{DEFAULT_LOCAL_URL, LocalInferenceAdapter};
use crate::ports::ProviderAdapter;

/// Why a declared provider was not registered
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The declared id is not a valid provider key
    #[error("invalid provider id '{0}'")]
    InvalidId(String),

    /// A required key is missing for this provider
    #[error("provider '{provider}' is missing required key {key}")]
    MissingField { provider: String, key: String },

    /// The TYPE key names an unsupported family
    #[error("provider '{provider}' has unknown type '{value}'")]
    UnknownType { provider: String, value: String },

    /// The id was declared more than once
    #[error("provider '{0}' is declared more than once")]
    Duplicate(String),
}

/// Ordered collection of validated providers
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    descriptors: Vec<ProviderDescriptor>,
    rejected: Vec<ConfigurationError>,
}

impl ProviderRegistry {
    /// Build the registry from configuration keys
    pub fn load(settings: &ProviderSettings) -> Self {
        let mut registry = Self::default();

        for raw_id in settings.declared_ids() {
            match parse_descriptor(settings, &raw_id) {
                Ok(descriptor) if registry.contains(&descriptor.id) => {
                    registry.reject(ConfigurationError::Duplicate(descriptor.id.to_string()));
                },
                Ok(descriptor) => {
                    info!(
                        provider = %descriptor.id,
                        family = %descriptor.kind.family(),
                        model = %descriptor.kind.model(),
                        "Registered provider"
                    );
                    registry.descriptors.push(descriptor);
                },
                Err(error) => registry.reject(error),
            }
        }

        if registry.descriptors.is_empty() {
            warn!("No providers configured");
        }

        registry
    }

    /// Build a registry from already validated descriptors
    pub fn from_descriptors(descriptors: Vec<ProviderDescriptor>) -> Self {
        let mut registry = Self::default();
        for descriptor in descriptors {
            if registry.contains(&descriptor.id) {
                registry.reject(ConfigurationError::Duplicate(descriptor.id.to_string()));
            } else {
                registry.descriptors.push(descriptor);
            }
        }
        registry
    }

    fn reject(&mut self, error: ConfigurationError) {
        warn!(error = %error, "Provider rejected");
        self.rejected.push(error);
    }

    /// Registered descriptors in declaration order
    pub fn descriptors(&self) -> &[ProviderDescriptor] {
        &self.descriptors
    }

    /// Configuration problems found while loading
    pub fn rejected(&self) -> &[ConfigurationError] {
        &self.rejected
    }

    /// Look up a descriptor by id
    pub fn get(&self, id: &ProviderId) -> Option<&ProviderDescriptor> {
        self.descriptors.iter().find(|d| &d.id == id)
    }

    /// Whether a provider with this id is registered
    pub fn contains(&self, id: &ProviderId) -> bool {
        self.get(id).is_some()
    }

    /// The default active provider
    pub fn first_id(&self) -> Option<&ProviderId> {
        self.descriptors.first().map(|d| &d.id)
    }

    /// Number of registered providers
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether no provider is registered
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Create one adapter per registered descriptor, in order
    pub fn build_adapters(
        &self,
        sampling: &SamplingConfig,
    ) -> Result<Vec<Arc<dyn ProviderAdapter>>, ProviderError> {
        self.descriptors
            .iter()
            .map(|descriptor| build_adapter(descriptor, sampling))
            .collect()
    }
}

/// Create the adapter matching a descriptor's kind
pub fn build_adapter(
    descriptor: &ProviderDescriptor,
    sampling: &SamplingConfig,
) -> Result<Arc<dyn ProviderAdapter>, ProviderError> {
    Ok(match descriptor.kind {
        ProviderKind::CloudGenerative { .. } => Arc::new(CloudGenerativeAdapter::from_descriptor(
            descriptor, sampling,
        )?),
        ProviderKind::LocalInference { .. } => Arc::new(LocalInferenceAdapter::from_descriptor(
            descriptor, sampling,
        )?),
    })
}

fn parse_descriptor(
    settings: &ProviderSettings,
    raw_id: &str,
) -> Result<ProviderDescriptor, ConfigurationError> {
    let id = ProviderId::parse(raw_id).map_err(|_| ConfigurationError::InvalidId(raw_id.to_string()))?;
    let key = id.config_key();

    let required = |field: &str| {
        settings
            .field(&key, field)
            .map(ToString::to_string)
            .ok_or_else(|| ConfigurationError::MissingField {
                provider: id.to_string(),
                key: format!("{key}_{field}"),
            })
    };
    let optional = |field: &str| settings.field(&key, field).map(ToString::to_string);

    let type_value = required("TYPE")?;
    let family: ProviderFamily =
        type_value
            .parse()
            .map_err(|_| ConfigurationError::UnknownType {
                provider: id.to_string(),
                value: type_value.clone(),
            })?;
    let display_name = required("NAME")?;
    let icon = optional("ICON");

    let kind = match family {
        ProviderFamily::CloudGenerative => ProviderKind::CloudGenerative {
            api_key: SecretString::from(required("API_KEY")?),
            model: optional("MODEL").unwrap_or_else(|| DEFAULT_CLOUD_MODEL.to_string()),
            endpoint_template: optional("API_URL")
                .unwrap_or_else(|| DEFAULT_ENDPOINT_TEMPLATE.to_string()),
        },
        ProviderFamily::LocalInference => ProviderKind::LocalInference {
            model: required("MODEL")?,
            base_url: optional("API_URL").unwrap_or_else(|| DEFAULT_LOCAL_URL.to_string()),
        },
    };

    Ok(ProviderDescriptor {
        id,
        display_name,
        icon,
        kind,
    })
}
