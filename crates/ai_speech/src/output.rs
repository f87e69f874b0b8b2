//! Speech output bridge
//!
//! At most one utterance owns playback. Starting a new one cancels the
//! previous utterance, and late events that still reference it are ignored.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use domain::VoiceProfile;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::SpeechConfig;
use crate::error::SpeechError;
use crate::observable::Published;
use crate::ports::SynthesisPlatform;
use crate::types::{PlaybackSnapshot, SynthesisEvent, Utterance, UtteranceId, Voice};

/// Bridges a platform synthesizer to observable playback state
pub struct SpeechOutputBridge {
    platform: Arc<dyn SynthesisPlatform>,
    config: SpeechConfig,
    shared: Arc<Published<PlaybackSnapshot>>,
    next_utterance: AtomicU64,
    pump: JoinHandle<()>,
}

impl std::fmt::Debug for SpeechOutputBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechOutputBridge")
            .field("config", &self.config)
            .field("state", &self.shared.get())
            .finish_non_exhaustive()
    }
}

impl SpeechOutputBridge {
    /// Attach to the platform and load its current voices
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        platform: Arc<dyn SynthesisPlatform>,
        config: SpeechConfig,
    ) -> Result<Self, SpeechError> {
        let runtime = Handle::try_current().map_err(|e| SpeechError::Runtime(e.to_string()))?;

        let voices = platform.voices();
        let initial = PlaybackSnapshot {
            selected_voice_index: preferred_voice_index(&voices).unwrap_or(0),
            available_voices: voices,
            ..PlaybackSnapshot::default()
        };
        let shared = Arc::new(Published::new(initial));

        let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
        platform.attach(tx);
        let pump = runtime.spawn(pump_events(rx, Arc::clone(&shared)));

        debug!(
            voices = shared.read(|s| s.available_voices.len()),
            "Speech output bridge attached"
        );

        Ok(Self {
            platform,
            config,
            shared,
            next_utterance: AtomicU64::new(1),
            pump,
        })
    }

    /// Whether the platform offers synthesis
    pub fn is_supported(&self) -> bool {
        self.platform.is_supported()
    }

    /// Read `text` aloud, cancelling whatever is playing
    ///
    /// The profile's voice index wins when set, otherwise the bridge's own
    /// selection is used. An out-of-range index falls back to the first
    /// voice; with no voices loaded the platform default is used. The voice
    /// actually chosen becomes the selection reported by
    /// [`voice_info`](Self::voice_info).
    pub fn speak(&self, text: &str, profile: &VoiceProfile) -> Result<UtteranceId, SpeechError> {
        if !self.platform.is_supported() {
            return Err(SpeechError::NotSupported("Speech synthesis".to_string()));
        }

        self.platform.cancel();

        let id = UtteranceId(self.next_utterance.fetch_add(1, Ordering::Relaxed));
        let profile = profile.sanitized();
        let voice = self.shared.update(|s| {
            s.current = Some(id);
            s.is_speaking = true;
            s.is_paused = false;
            s.last_error = None;
            let requested = profile
                .selected_voice_index
                .unwrap_or(s.selected_voice_index);
            let (index, voice) = pick_voice(&s.available_voices, requested)?;
            s.selected_voice_index = index;
            Some(voice)
        });

        let utterance = Utterance {
            id,
            text: text.to_string(),
            lang: self.config.language.clone(),
            rate: profile.rate,
            pitch: profile.pitch,
            volume: profile.volume,
            voice,
        };

        if let Err(err) = self.platform.speak(utterance) {
            warn!(utterance = %id, error = %err, "Failed to start speech synthesis");
            self.shared.update(|s| {
                if s.current == Some(id) {
                    s.current = None;
                    s.is_speaking = false;
                }
                s.last_error = Some(err.to_string());
            });
            return Err(err);
        }

        info!(utterance = %id, chars = text.chars().count(), "Speaking");
        Ok(id)
    }

    pub fn pause(&self) {
        let should_pause = self.shared.read(|s| s.is_speaking && !s.is_paused);
        if should_pause {
            self.platform.pause();
            self.shared.update(|s| s.is_paused = true);
        }
    }

    pub fn resume(&self) {
        if self.shared.read(|s| s.is_paused) {
            self.platform.resume();
            self.shared.update(|s| s.is_paused = false);
        }
    }

    /// Cancel playback
    pub fn stop(&self) {
        self.platform.cancel();
        self.shared.update(|s| {
            s.current = None;
            s.is_speaking = false;
            s.is_paused = false;
        });
    }

    /// Select the voice reported by [`voice_info`](Self::voice_info)
    ///
    /// Out-of-range indices are ignored; returns whether the selection changed.
    pub fn select_voice(&self, index: usize) -> bool {
        self.shared.update(|s| {
            if index < s.available_voices.len() {
                s.selected_voice_index = index;
                true
            } else {
                false
            }
        })
    }

    /// The currently selected voice, if voices are loaded
    pub fn voice_info(&self) -> Option<Voice> {
        self.shared
            .read(|s| s.available_voices.get(s.selected_voice_index).cloned())
    }

    pub fn available_voices(&self) -> Vec<Voice> {
        self.shared.read(|s| s.available_voices.clone())
    }

    pub fn is_speaking(&self) -> bool {
        self.shared.read(|s| s.is_speaking)
    }

    pub fn is_paused(&self) -> bool {
        self.shared.read(|s| s.is_paused)
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.shared.get()
    }

    /// Observe every state transition
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.shared.subscribe()
    }
}

impl Drop for SpeechOutputBridge {
    fn drop(&mut self) {
        if self.shared.read(|s| s.is_speaking) {
            self.platform.cancel();
        }
        self.pump.abort();
    }
}

async fn pump_events(
    mut rx: mpsc::Receiver<SynthesisEvent>,
    shared: Arc<Published<PlaybackSnapshot>>,
) {
    while let Some(event) = rx.recv().await {
        shared.update(|state| apply_event(state, event));
    }
    debug!("Synthesis event channel closed");
}

/// Fold one platform event into the playback state
pub(crate) fn apply_event(state: &mut PlaybackSnapshot, event: SynthesisEvent) {
    match event {
        SynthesisEvent::VoicesChanged(voices) => {
            let keep_selection =
                !state.available_voices.is_empty() && state.selected_voice_index < voices.len();
            if !keep_selection {
                state.selected_voice_index = preferred_voice_index(&voices).unwrap_or(0);
            }
            state.available_voices = voices;
        },
        SynthesisEvent::Started(id) if state.current == Some(id) => {
            state.is_speaking = true;
            state.is_paused = false;
        },
        SynthesisEvent::Paused(id) if state.current == Some(id) => state.is_paused = true,
        SynthesisEvent::Resumed(id) if state.current == Some(id) => state.is_paused = false,
        SynthesisEvent::Ended(id) if state.current == Some(id) => {
            state.current = None;
            state.is_speaking = false;
            state.is_paused = false;
        },
        SynthesisEvent::Error { id, message } if state.current == Some(id) => {
            warn!(utterance = %id, error = %message, "Speech synthesis error");
            state.current = None;
            state.is_speaking = false;
            state.is_paused = false;
            state.last_error = Some(SpeechError::Synthesis(message).to_string());
        },
        stale => debug!(event = ?stale, "Ignoring event for superseded utterance"),
    }
}

fn pick_voice(voices: &[Voice], index: usize) -> Option<(usize, Voice)> {
    let index = if index < voices.len() { index } else { 0 };
    voices.get(index).map(|voice| (index, voice.clone()))
}

/// Index of the most natural-sounding default voice
///
/// Preference order: US English from Google, on-device US English, any US
/// English, on-device English, any English, then the first voice.
pub fn preferred_voice_index(voices: &[Voice]) -> Option<usize> {
    if voices.is_empty() {
        return None;
    }

    let preferences: [fn(&Voice) -> bool; 5] = [
        |v| v.lang.starts_with("en-US") && v.name.contains("Google"),
        |v| v.lang.starts_with("en-US") && v.local_service,
        |v| v.lang.starts_with("en-US"),
        |v| v.lang.starts_with("en-") && v.local_service,
        |v| v.lang.starts_with("en-"),
    ];

    preferences
        .iter()
        .find_map(|predicate| voices.iter().position(predicate))
        .or(Some(0))
}
