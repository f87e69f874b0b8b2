//! Domain entities - Objects with identity and lifecycle

mod chat_message;
mod conversation;
mod provider_descriptor;
mod voice_profile;

pub use chat_message::{ChatMessage, ERROR_TEXT_PREFIX, MessageRole, MessageStatus};
pub use conversation::{Conversation, ConversationSummary, EMPTY_PREVIEW, PREVIEW_CHARS};
pub use provider_descriptor::{ProviderDescriptor, ProviderFamily, ProviderKind};
pub use voice_profile::{
    PITCH_RANGE, RATE_RANGE, VOLUME_RANGE, VoiceProfile, VoiceSetting,
};
