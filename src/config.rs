use serde::{Deserialize, Serialize};

use crate::channel::{validate_capacity, DEFAULT_CAPACITY};
use crate::error::ConfigError;
use crate::tracker::{
    validate_display_window, validate_refresh_rate, DEFAULT_DISPLAY_WINDOW_SECONDS,
    DEFAULT_REFRESH_RATE_HZ,
};
use crate::yin::{validate_window_size, DifferenceMethod, DEFAULT_THRESHOLD, DEFAULT_WINDOW_SIZE};

/// Settings for a pitch tracker. Fixed for the lifetime of a stream, except
/// `display_window_seconds` which can be changed at any time on the consumer side.
///
/// Missing fields take their default values when deserializing.
///
/// ```
/// use micro_pitch::{DifferenceMethod, TrackerConfig};
///
/// let config: TrackerConfig = serde_json::from_str(r#"{ "window_size": 1024, "difference_method": "fft" }"#).unwrap();
/// assert_eq!(config.window_size, 1024);
/// assert_eq!(config.difference_method, DifferenceMethod::Fft);
/// assert_eq!(config.channel_capacity, 4096);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// The number of samples per analysis window. A power of two >= 512.
    pub window_size: usize,
    /// The voicing threshold. Clamped to [0.05, 0.5] by the estimator.
    pub threshold: f32,
    pub difference_method: DifferenceMethod,
    /// The number of measurements the channel can hold. A power of two.
    pub channel_capacity: usize,
    /// Seconds of history to display.
    pub display_window_seconds: f32,
    /// How many times per second the history is drained.
    pub refresh_rate_hz: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            window_size: DEFAULT_WINDOW_SIZE,
            threshold: DEFAULT_THRESHOLD,
            difference_method: DifferenceMethod::Direct,
            channel_capacity: DEFAULT_CAPACITY,
            display_window_seconds: DEFAULT_DISPLAY_WINDOW_SECONDS,
            refresh_rate_hz: DEFAULT_REFRESH_RATE_HZ,
        }
    }
}

impl TrackerConfig {
    /// Returns the first problem found with the settings, if any.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_window_size(self.window_size, self.difference_method)?;
        if !self.threshold.is_finite() {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        validate_capacity(self.channel_capacity)?;
        validate_display_window(self.display_window_seconds)?;
        validate_refresh_rate(self.refresh_rate_hz)?;
        Ok(())
    }
}
