//! Voice profile - text-to-speech preferences

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Accepted speaking rates
pub const RATE_RANGE: RangeInclusive<f32> = 0.5..=2.0;
/// Accepted pitch values
pub const PITCH_RANGE: RangeInclusive<f32> = 0.5..=2.0;
/// Accepted volume values
pub const VOLUME_RANGE: RangeInclusive<f32> = 0.0..=1.0;

const DEFAULT_RATE: f32 = 0.95;
const DEFAULT_PITCH: f32 = 1.0;
const DEFAULT_VOLUME: f32 = 0.9;

/// Speech synthesis preferences
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VoiceProfile {
    /// Speaking rate multiplier
    pub rate: f32,
    /// Pitch multiplier
    pub pitch: f32,
    /// Volume in `0.0..=1.0`
    pub volume: f32,
    /// Index into the platform's voice list; `None` leaves the choice to
    /// the speech output
    pub selected_voice_index: Option<usize>,
}

impl Default for VoiceProfile {
    fn default() -> Self {
        Self {
            rate: DEFAULT_RATE,
            pitch: DEFAULT_PITCH,
            volume: DEFAULT_VOLUME,
            selected_voice_index: None,
        }
    }
}

impl VoiceProfile {
    /// Replace every invalid field with its default, keeping valid ones
    #[must_use]
    pub fn sanitized(self) -> Self {
        Self {
            rate: within(self.rate, &RATE_RANGE).unwrap_or(DEFAULT_RATE),
            pitch: within(self.pitch, &PITCH_RANGE).unwrap_or(DEFAULT_PITCH),
            volume: within(self.volume, &VOLUME_RANGE).unwrap_or(DEFAULT_VOLUME),
            selected_voice_index: self.selected_voice_index,
        }
    }

    /// Set one field, rejecting out-of-range values
    pub fn set(&mut self, setting: VoiceSetting, value: f64) -> Result<(), DomainError> {
        #[allow(clippy::cast_possible_truncation)]
        let narrowed = value as f32;
        match setting {
            VoiceSetting::Rate => self.rate = checked(setting, narrowed, &RATE_RANGE)?,
            VoiceSetting::Pitch => self.pitch = checked(setting, narrowed, &PITCH_RANGE)?,
            VoiceSetting::Volume => self.volume = checked(setting, narrowed, &VOLUME_RANGE)?,
            VoiceSetting::VoiceIndex => {
                if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
                    return Err(DomainError::ValidationError(format!(
                        "{setting} must be a non-negative integer, got {value}"
                    )));
                }
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                {
                    self.selected_voice_index = Some(value as usize);
                }
            },
        }
        Ok(())
    }
}

fn within(value: f32, range: &RangeInclusive<f32>) -> Option<f32> {
    (value.is_finite() && range.contains(&value)).then_some(value)
}

fn checked(
    setting: VoiceSetting,
    value: f32,
    range: &RangeInclusive<f32>,
) -> Result<f32, DomainError> {
    within(value, range).ok_or_else(|| {
        DomainError::ValidationError(format!(
            "{setting} must be between {} and {}, got {value}",
            range.start(),
            range.end()
        ))
    })
}

/// A single adjustable field of a [`VoiceProfile`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoiceSetting {
    Rate,
    Pitch,
    Volume,
    VoiceIndex,
}

impl fmt::Display for VoiceSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rate => "rate",
            Self::Pitch => "pitch",
            Self::Volume => "volume",
            Self::VoiceIndex => "voice",
        })
    }
}

impl FromStr for VoiceSetting {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rate" => Ok(Self::Rate),
            "pitch" => Ok(Self::Pitch),
            "volume" => Ok(Self::Volume),
            "voice" | "voice-index" | "selectedvoiceindex" => Ok(Self::VoiceIndex),
            other => Err(DomainError::ValidationError(format!(
                "unknown voice setting '{other}'"
            ))),
        }
    }
}
