use serde::{Deserialize, Serialize};

use crate::common::freq_to_midi_note;

/// A single pitch measurement, produced once per analysis window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PitchMeasurement {
    /// The fundamental frequency in Hz, or 0 if the window was unvoiced
    /// (silence, noise or no reliable pitch).
    pub frequency_hz: f32,
    /// Seconds elapsed since the producer started, at the last sample of the window.
    pub timestamp_seconds: f64,
}

impl PitchMeasurement {
    pub fn new(frequency_hz: f32, timestamp_seconds: f64) -> Self {
        PitchMeasurement {
            frequency_hz,
            timestamp_seconds,
        }
    }

    /// A measurement without a detectable pitch.
    pub fn unvoiced(timestamp_seconds: f64) -> Self {
        PitchMeasurement::new(0.0, timestamp_seconds)
    }

    /// Returns true if the measurement carries a pitch.
    pub fn is_voiced(&self) -> bool {
        self.frequency_hz > 0.0
    }

    /// The pitch as a fractional MIDI note number, or `None` if unvoiced.
    pub fn midi_note(&self) -> Option<f32> {
        if self.is_voiced() {
            Some(freq_to_midi_note(self.frequency_hz))
        } else {
            None
        }
    }
}
