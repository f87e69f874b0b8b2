//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod conversation_store;
mod local_storage;
mod provider_gateway;
mod speech_port;
mod voice_settings_store;

#[cfg(test)]
pub use conversation_store::MockConversationStore;
pub use conversation_store::{ConversationStore, StorageInfo};
#[cfg(test)]
pub use local_storage::MockLocalStorage;
pub use local_storage::{LocalStorage, StorageError};
#[cfg(test)]
pub use provider_gateway::MockProviderGateway;
pub use provider_gateway::{ProviderGateway, ProviderInfo};
#[cfg(test)]
pub use speech_port::{MockSpeechOutputPort, MockTranscriptSource};
pub use speech_port::{SpeechOutputPort, TranscriptSource};
#[cfg(test)]
pub use voice_settings_store::MockVoiceSettingsStore;
pub use voice_settings_store::VoiceSettingsStore;
