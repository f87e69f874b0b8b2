//! Types for speech processing
//!
//! Platform events, voices, utterances and the snapshots the bridges publish.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One recognition hypothesis delivered by the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionResult {
    pub transcript: String,
    pub is_final: bool,
}

impl RecognitionResult {
    /// A partial hypothesis that may still change
    pub fn interim(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: false,
        }
    }

    /// A committed phrase
    pub fn finalized(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: true,
        }
    }
}

/// Events emitted by a recognition platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// Capture has begun
    Started,
    /// New results since the previous event
    Results(Vec<RecognitionResult>),
    /// The platform failed (e.g. `no-speech`, `not-allowed`)
    Error(String),
    /// Capture has ended
    Ended,
}

/// Options handed to the platform when recognition starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionOptions {
    pub language: String,
    pub interim_results: bool,
    pub continuous: bool,
}

/// Observable state of the speech input bridge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptSnapshot {
    pub is_listening: bool,
    /// Latest partial text; replaced on every result event
    pub interim_transcript: String,
    /// Finalized phrases, each followed by a space
    pub final_transcript: String,
    pub last_error: Option<String>,
}

/// A synthesis voice offered by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    /// BCP 47 language tag, e.g. `en-US`
    pub lang: String,
    /// Whether the voice is rendered on-device
    pub local_service: bool,
    /// Whether the platform marks this voice as its default
    #[serde(default)]
    pub is_default: bool,
}

impl Voice {
    pub fn new(name: impl Into<String>, lang: impl Into<String>, local_service: bool) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
            local_service,
            is_default: false,
        }
    }
}

/// Identifier of a single playback request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtteranceId(pub u64);

impl fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A text-to-speech playback request
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: UtteranceId,
    pub text: String,
    pub lang: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    /// `None` lets the platform pick its default voice
    pub voice: Option<Voice>,
}

/// Events emitted by a synthesis platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisEvent {
    Started(UtteranceId),
    Paused(UtteranceId),
    Resumed(UtteranceId),
    Ended(UtteranceId),
    Error { id: UtteranceId, message: String },
    /// The platform's voice list changed
    VoicesChanged(Vec<Voice>),
}

/// Observable state of the speech output bridge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackSnapshot {
    pub is_speaking: bool,
    pub is_paused: bool,
    /// Utterance currently owning playback
    pub current: Option<UtteranceId>,
    pub available_voices: Vec<Voice>,
    pub selected_voice_index: usize,
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_constructors() {
        assert!(!RecognitionResult::interim("hel").is_final);
        assert!(RecognitionResult::finalized("hello").is_final);
    }

    #[test]
    fn voice_serde_defaults_is_default() {
        let voice: Voice =
            serde_json::from_str(r#"{"name":"Samantha","lang":"en-US","local_service":true}"#)
                .unwrap();
        assert!(!voice.is_default);
        assert_eq!(voice, Voice::new("Samantha", "en-US", true));
    }
}
