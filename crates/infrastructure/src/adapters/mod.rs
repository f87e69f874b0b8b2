//! Adapters implementing application ports

mod provider_gateway;
mod speech_adapter;

pub use provider_gateway::RegistryProviderGateway;
pub use speech_adapter::{BridgeSpeechOutput, BridgeTranscriptSource, spawn_read_aloud_sync};
