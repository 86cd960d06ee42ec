//! Error types.
//!
//! Nothing on the real time path returns these. They are reported when a
//! configuration is validated and when a channel is reset.

use thiserror::Error;

/// A [TrackerConfig](crate::TrackerConfig) that can't be used to build a pitch tracker.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("Invalid window size {0}. Must be a power of two >= {min}", min = crate::yin::MIN_WINDOW_SIZE)]
    InvalidWindowSize(usize),

    #[error("Window size {0} is too large for FFT difference computation")]
    UnsupportedFftSize(usize),

    #[error("Invalid threshold {0}. Must be a finite number")]
    InvalidThreshold(f32),

    #[error("Invalid channel capacity {0}. Must be a power of two > 0")]
    InvalidChannelCapacity(usize),

    #[error("Invalid display window {0} s. Must be finite and >= 0")]
    InvalidDisplayWindow(f32),

    #[error("Invalid refresh rate {0} Hz. Must be finite and >= {min} Hz", min = crate::tracker::MIN_REFRESH_RATE_HZ)]
    InvalidRefreshRate(f32),

    #[error("Invalid sample rate {0} Hz. Must be finite and > 0")]
    InvalidSampleRate(f64),
}

/// Errors returned by channel maintenance operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError {
    #[error("Producer does not belong to this channel")]
    ForeignProducer,
}
