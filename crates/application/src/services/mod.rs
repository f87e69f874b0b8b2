//! Application services - Use case implementations

mod conversation_engine;
mod voice_settings_service;

pub use conversation_engine::{ConversationEngine, EngineSnapshot, NO_PROVIDER_CONFIGURED};
pub use voice_settings_service::VoiceSettingsService;
