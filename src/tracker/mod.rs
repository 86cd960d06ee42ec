//! The producer and consumer halves of a pitch tracker.
//!
//! A [PitchAccumulator] lives on the audio thread, turning incoming blocks into
//! pitch measurements, and a [PitchHistory] lives on a display or update thread,
//! collecting those measurements. They are connected by a
//! [channel](crate::channel::channel), so nothing on the audio thread waits for
//! the other thread.
//!
//! ```
//! use micro_pitch::tracker::pitch_tracker;
//! use micro_pitch::TrackerConfig;
//!
//! let sample_rate = 44100.0;
//! let (mut accumulator, mut history) = pitch_tracker(&TrackerConfig::default(), sample_rate).unwrap();
//!
//! // Audio thread: a stereo block with a tone at 220 Hz in both channels
//! let mut left: Vec<f32> = (0..4096)
//!     .map(|i| (2.0 * std::f64::consts::PI * 220.0 * (i as f64) / sample_rate).sin() as f32)
//!     .collect();
//! let mut right = left.clone();
//! accumulator.process_block(&mut [&mut left[..], &mut right[..]], 2, 4096);
//!
//! // Display thread, every history.poll_interval()
//! assert_eq!(history.drain(), 2);
//! assert!((history.current_frequency_hz() - 220.0).abs() <= 2.2);
//! ```

mod accumulator;
mod history;

pub use accumulator::{validate_sample_rate, PitchAccumulator};
pub use history::{
    validate_display_window, validate_refresh_rate, HistoryPoint, PitchHistory,
    DEFAULT_DISPLAY_WINDOW_SECONDS, DEFAULT_REFRESH_RATE_HZ, MIN_REFRESH_RATE_HZ,
    PRUNE_MARGIN_SECONDS,
};

use crate::channel::channel;
use crate::config::TrackerConfig;
use crate::error::{ChannelError, ConfigError};
use crate::yin::PitchEstimator;

/// Creates a connected accumulator and history from a configuration.
pub fn pitch_tracker(
    config: &TrackerConfig,
    sample_rate: f64,
) -> Result<(PitchAccumulator, PitchHistory), ConfigError> {
    config.validate()?;
    validate_sample_rate(sample_rate)?;

    let estimator =
        PitchEstimator::from_options(config.window_size, config.threshold, config.difference_method);
    let (producer, consumer) = channel(config.channel_capacity);
    log::info!(
        "Created pitch tracker, window size {}, channel capacity {}, {} Hz",
        config.window_size,
        config.channel_capacity,
        sample_rate
    );

    Ok((
        PitchAccumulator::new(estimator, producer, sample_rate),
        PitchHistory::from_options(consumer, config.display_window_seconds, config.refresh_rate_hz),
    ))
}

/// Starts a new stream. Empties the channel, the analysis window and the history,
/// and restarts the stream time at zero.
///
/// Must be called while neither half is in use, which the mutable borrows enforce.
/// Fails if the two halves are not connected to each other.
///
/// Panics if `sample_rate` is not a positive, finite number.
pub fn restart(
    accumulator: &mut PitchAccumulator,
    history: &mut PitchHistory,
    sample_rate: f64,
) -> Result<(), ChannelError> {
    history.consumer_mut().reset(accumulator.producer_mut())?;
    accumulator.prepare(sample_rate);
    history.clear();
    Ok(())
}
