//! Port definitions for platform speech services
//!
//! Recognition and synthesis are callback-driven on every platform. Adapters
//! translate those callbacks into events pushed onto a bounded channel owned
//! by the corresponding bridge.

use tokio::sync::mpsc;

use crate::error::SpeechError;
use crate::types::{RecognitionEvent, RecognitionOptions, SynthesisEvent, Utterance, Voice};

/// Platform speech-to-text service
pub trait RecognitionPlatform: Send + Sync {
    /// Whether recognition is available at all
    fn is_supported(&self) -> bool;

    /// Begin capturing; events for this session go to `events`
    fn start(
        &self,
        options: &RecognitionOptions,
        events: mpsc::Sender<RecognitionEvent>,
    ) -> Result<(), SpeechError>;

    /// Stop capturing and deliver pending results
    fn stop(&self);

    /// Stop capturing and discard pending results
    fn abort(&self);
}

/// Platform text-to-speech service
pub trait SynthesisPlatform: Send + Sync {
    /// Whether synthesis is available at all
    fn is_supported(&self) -> bool;

    /// Voices currently offered (may be empty until the platform loads them)
    fn voices(&self) -> Vec<Voice>;

    /// Register the channel that receives playback and voice-list events
    fn attach(&self, events: mpsc::Sender<SynthesisEvent>);

    /// Queue an utterance for playback
    fn speak(&self, utterance: Utterance) -> Result<(), SpeechError>;

    /// Drop the current and all queued utterances
    fn cancel(&self);

    fn pause(&self);

    fn resume(&self);
}
