//! Speech input bridge
//!
//! Owns the receiving end of the recognition event channel and folds platform
//! events into a [`TranscriptSnapshot`] that observers read through a watch
//! channel.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::SpeechConfig;
use crate::error::SpeechError;
use crate::observable::Published;
use crate::ports::RecognitionPlatform;
use crate::types::{RecognitionEvent, RecognitionOptions, TranscriptSnapshot};

/// Bridges a platform recognizer to observable transcript state
pub struct SpeechInputBridge {
    platform: Arc<dyn RecognitionPlatform>,
    config: SpeechConfig,
    shared: Arc<Published<TranscriptSnapshot>>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for SpeechInputBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechInputBridge")
            .field("config", &self.config)
            .field("state", &self.shared.get())
            .finish_non_exhaustive()
    }
}

impl SpeechInputBridge {
    pub fn new(platform: Arc<dyn RecognitionPlatform>, config: SpeechConfig) -> Self {
        Self {
            platform,
            config,
            shared: Arc::new(Published::new(TranscriptSnapshot::default())),
            pump: Mutex::new(None),
        }
    }

    /// Whether the platform offers recognition
    pub fn is_supported(&self) -> bool {
        self.platform.is_supported()
    }

    /// Start listening
    ///
    /// A call while already listening does nothing. Clears the previous
    /// transcript and error. Must be called from within a Tokio runtime.
    pub fn start(&self) -> Result<(), SpeechError> {
        if !self.platform.is_supported() {
            let err = SpeechError::NotSupported("Speech recognition".to_string());
            self.shared.update(|s| s.last_error = Some(err.to_string()));
            return Err(err);
        }

        let runtime = Handle::try_current().map_err(|e| SpeechError::Runtime(e.to_string()))?;

        let already_listening = self.shared.update(|s| {
            if s.is_listening {
                return true;
            }
            s.is_listening = true;
            s.interim_transcript.clear();
            s.final_transcript.clear();
            s.last_error = None;
            false
        });
        if already_listening {
            debug!("Recognition already running");
            return Ok(());
        }

        let (tx, rx) = mpsc::channel(self.config.channel_capacity.max(1));
        let handle = runtime.spawn(pump_events(rx, Arc::clone(&self.shared)));
        if let Some(previous) = self.pump.lock().replace(handle) {
            previous.abort();
        }

        let options = RecognitionOptions {
            language: self.config.language.clone(),
            interim_results: self.config.interim_results,
            continuous: self.config.continuous,
        };
        if let Err(err) = self.platform.start(&options, tx) {
            warn!(error = %err, "Failed to start recognition");
            self.shared.update(|s| {
                s.is_listening = false;
                s.last_error = Some(err.to_string());
            });
            return Err(err);
        }

        info!(language = %options.language, "Speech recognition started");
        Ok(())
    }

    /// Ask the platform to stop; finalized results still arrive
    pub fn stop(&self) {
        if self.shared.read(|s| s.is_listening) {
            self.platform.stop();
        }
    }

    /// Stop immediately, discarding pending results
    pub fn abort(&self) {
        self.platform.abort();
        self.shared.update(|s| {
            s.is_listening = false;
            s.interim_transcript.clear();
        });
    }

    /// Clear both transcripts and the last error
    pub fn reset(&self) {
        self.shared.update(|s| {
            s.interim_transcript.clear();
            s.final_transcript.clear();
            s.last_error = None;
        });
    }

    /// Return the finalized text and clear it
    pub fn take_final_transcript(&self) -> String {
        self.shared
            .update(|s| std::mem::take(&mut s.final_transcript))
    }

    pub fn snapshot(&self) -> TranscriptSnapshot {
        self.shared.get()
    }

    pub fn is_listening(&self) -> bool {
        self.shared.read(|s| s.is_listening)
    }

    /// Observe every state transition
    pub fn subscribe(&self) -> watch::Receiver<TranscriptSnapshot> {
        self.shared.subscribe()
    }
}

impl Drop for SpeechInputBridge {
    fn drop(&mut self) {
        if self.shared.read(|s| s.is_listening) {
            self.platform.abort();
        }
        if let Some(handle) = self.pump.lock().take() {
            handle.abort();
        }
    }
}

async fn pump_events(
    mut rx: mpsc::Receiver<RecognitionEvent>,
    shared: Arc<Published<TranscriptSnapshot>>,
) {
    while let Some(event) = rx.recv().await {
        if let RecognitionEvent::Error(code) = &event {
            warn!(error = %code, "Speech recognition error");
        }
        shared.update(|state| apply_event(state, event));
    }
    debug!("Recognition event channel closed");
}

/// Fold one platform event into the transcript state
pub(crate) fn apply_event(state: &mut TranscriptSnapshot, event: RecognitionEvent) {
    match event {
        RecognitionEvent::Started => {
            state.is_listening = true;
            state.last_error = None;
            state.interim_transcript.clear();
            state.final_transcript.clear();
        },
        RecognitionEvent::Results(results) => {
            let mut interim = String::new();
            for result in results {
                if result.is_final {
                    state.final_transcript.push_str(&result.transcript);
                    state.final_transcript.push(' ');
                } else {
                    interim.push_str(&result.transcript);
                }
            }
            state.interim_transcript = interim;
        },
        RecognitionEvent::Error(code) => {
            state.last_error = Some(SpeechError::Recognition(code).to_string());
            state.is_listening = false;
        },
        RecognitionEvent::Ended => {
            state.is_listening = false;
            state.interim_transcript.clear();
        },
    }
}
