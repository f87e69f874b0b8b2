//! AI Speech - Speech recognition and synthesis bridges
//!
//! Platform speech services are callback driven. This crate turns them into
//! observable state:
//! - [`SpeechInputBridge`] folds recognition events into interim and
//!   finalized transcripts
//! - [`SpeechOutputBridge`] plays one utterance at a time with a
//!   [`domain::VoiceProfile`]
//!
//! # Architecture
//!
//! This crate follows the ports & adapters pattern:
//! - `ports` module defines the platform traits
//! - `input` and `output` contain the bridges consuming platform events over
//!   bounded channels and publishing `watch` snapshots
//!
//! # Example
//!
//! ```ignore
//! use ai_speech::{SpeechConfig, SpeechOutputBridge};
//! use domain::VoiceProfile;
//!
//! let output = SpeechOutputBridge::new(platform, SpeechConfig::default())?;
//! output.speak("Hello, world!", &VoiceProfile::default())?;
//! ```

pub mod config;
pub mod error;
pub mod input;
mod observable;
pub mod output;
pub mod ports;
pub mod types;

pub use config::SpeechConfig;
pub use error::SpeechError;
pub use input::SpeechInputBridge;
pub use output::{SpeechOutputBridge, preferred_voice_index};
pub use ports::{RecognitionPlatform, SynthesisPlatform};
pub use types::{
    PlaybackSnapshot, RecognitionEvent, RecognitionOptions, RecognitionResult, SynthesisEvent,
    TranscriptSnapshot, Utterance, UtteranceId, Voice,
};
