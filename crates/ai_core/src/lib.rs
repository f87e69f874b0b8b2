//! AI Core - Provider registry and language-model adapters
//!
//! Turns provider configuration into validated descriptors and talks to the
//! supported backends: a hosted generative-content API and a local
//! OpenAI-compatible chat-completions server.

pub mod cloud;
pub mod config;
pub mod error;
pub mod local;
pub mod ports;
pub mod registry;

pub use cloud::CloudGenerativeAdapter;
pub use config::{CloudSampling, LocalSampling, ProviderSettings, SamplingConfig};
pub use error::ProviderError;
pub use local::LocalInferenceAdapter;
pub use ports::{Exchange, ExchangeLog, ProviderAdapter};
pub use registry::{ConfigurationError, ProviderRegistry, build_adapter};
