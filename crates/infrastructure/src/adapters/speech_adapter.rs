//! Speech adapters - Expose the ai_speech bridges through application ports

use std::sync::Arc;

use ai_speech::{SpeechError, SpeechInputBridge, SpeechOutputBridge};
use application::{
    ConversationEngine,
    error::ApplicationError,
    ports::{SpeechOutputPort, TranscriptSource},
};
use domain::VoiceProfile;
use tokio::task::JoinHandle;
use tracing::debug;

fn map_error(e: &SpeechError) -> ApplicationError {
    ApplicationError::Speech(e.to_string())
}

/// Read-aloud through a [`SpeechOutputBridge`]
#[derive(Debug, Clone)]
pub struct BridgeSpeechOutput {
    bridge: Arc<SpeechOutputBridge>,
}

impl BridgeSpeechOutput {
    pub fn new(bridge: Arc<SpeechOutputBridge>) -> Self {
        Self { bridge }
    }

    pub fn bridge(&self) -> &Arc<SpeechOutputBridge> {
        &self.bridge
    }
}

impl SpeechOutputPort for BridgeSpeechOutput {
    fn speak(&self, text: &str, profile: &VoiceProfile) -> Result<(), ApplicationError> {
        let id = self.bridge.speak(text, profile).map_err(|e| map_error(&e))?;
        debug!(utterance = id.0, "Utterance queued");
        Ok(())
    }

    fn stop(&self) {
        self.bridge.stop();
    }

    fn is_speaking(&self) -> bool {
        self.bridge.is_speaking()
    }
}

/// Finalized dictation from a [`SpeechInputBridge`]
#[derive(Debug, Clone)]
pub struct BridgeTranscriptSource {
    bridge: Arc<SpeechInputBridge>,
}

impl BridgeTranscriptSource {
    pub fn new(bridge: Arc<SpeechInputBridge>) -> Self {
        Self { bridge }
    }

    pub fn bridge(&self) -> &Arc<SpeechInputBridge> {
        &self.bridge
    }
}

impl TranscriptSource for BridgeTranscriptSource {
    fn take_final_transcript(&self) -> String {
        self.bridge.take_final_transcript()
    }
}

/// Clear the engine's read-aloud marker whenever playback stops on its own
///
/// The task ends once the engine or the bridge is dropped.
pub fn spawn_read_aloud_sync(
    engine: &Arc<ConversationEngine>,
    bridge: &Arc<SpeechOutputBridge>,
) -> JoinHandle<()> {
    let mut playback = bridge.subscribe();
    let engine = Arc::downgrade(engine);
    let bridge = Arc::downgrade(bridge);

    tokio::spawn(async move {
        while playback.changed().await.is_ok() {
            if playback.borrow_and_update().is_speaking {
                continue;
            }
            let (Some(engine), Some(bridge)) = (engine.upgrade(), bridge.upgrade()) else {
                break;
            };
            // Re-read: a new utterance may have started since the snapshot
            engine.sync_read_aloud(bridge.is_speaking());
        }
        debug!("Read-aloud sync stopped");
    })
}
