//! Value objects - Immutable identifiers compared by value

mod conversation_id;
mod message_id;
mod provider_id;

pub use conversation_id::ConversationId;
pub use message_id::MessageId;
pub use provider_id::ProviderId;
