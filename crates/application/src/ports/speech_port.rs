//! Speech ports - What the conversation engine needs from speech I/O

use domain::VoiceProfile;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for reading text aloud
#[cfg_attr(test, automock)]
pub trait SpeechOutputPort: Send + Sync {
    /// Start reading `text`, replacing any current playback
    fn speak(&self, text: &str, profile: &VoiceProfile) -> Result<(), ApplicationError>;

    /// Stop playback
    fn stop(&self);

    /// Whether playback is active
    fn is_speaking(&self) -> bool;
}

/// Port for draining finalized speech transcripts
#[cfg_attr(test, automock)]
pub trait TranscriptSource: Send + Sync {
    /// Return the finalized transcript and clear it
    fn take_final_transcript(&self) -> String;
}
