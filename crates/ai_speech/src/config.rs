//! Configuration for the speech bridges

use serde::{Deserialize, Serialize};

/// Configuration for speech recognition and synthesis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// BCP 47 language tag used for recognition and utterances
    #[serde(default = "default_language")]
    pub language: String,

    /// Deliver partial results while the user is still speaking
    #[serde(default = "default_interim_results")]
    pub interim_results: bool,

    /// Keep listening after the first finalized phrase
    #[serde(default)]
    pub continuous: bool,

    /// Capacity of the platform event channels
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_language() -> String {
    "en-US".to_string()
}

const fn default_interim_results() -> bool {
    true
}

const fn default_channel_capacity() -> usize {
    64
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            interim_results: default_interim_results(),
            continuous: false,
            channel_capacity: default_channel_capacity(),
        }
    }
}
