//! Real time [pitch](https://en.wikipedia.org/wiki/Pitch_%28music%29) tracking of live,
//! monophonic audio, using the YIN algorithm.
//!
//! The audio thread mixes incoming blocks down to mono, analyzes one window at a time
//! and hands each [PitchMeasurement] to a non real time consumer, typically a display
//! refreshed a few dozen times per second, which keeps a rolling history of measurements.
//!
//! Features
//! * No allocations, locks or panics on the audio thread.
//! * A lock free, fixed capacity single producer, single consumer channel between the threads.
//! * Optional FFT accelerated difference function computation.
//! * `no_std` compatible.
//!
//! # Modules
//! * [yin] - The pitch estimator, operating on a single window.
//! * [channel] - The lossy channel carrying measurements between threads.
//! * [tracker] - Accumulation of audio blocks into windows on the audio thread, and
//!   the measurement history on the consumer thread.
//! * [common] - Level and MIDI note utilities.
//!
//! # Example
//! ```
//! use micro_pitch::tracker::pitch_tracker;
//! use micro_pitch::TrackerConfig;
//!
//! let sample_rate = 44100.0;
//! let (mut accumulator, mut history) = pitch_tracker(&TrackerConfig::default(), sample_rate).unwrap();
//!
//! // On the audio thread, for each incoming block
//! let mut block = vec![0.0; 4096];
//! accumulator.process_block(&mut [&mut block[..]], 1, 4096);
//!
//! // On the display thread, every history.poll_interval()
//! history.drain();
//! for point in history.visible_points() {
//!     // Silence has no pitch
//!     assert_eq!(point.frequency_hz, 0.0);
//! }
//! ```

#![no_std]

extern crate alloc;
#[cfg(test)]
extern crate std;

pub mod channel;
pub mod common;
mod config;
mod error;
mod measurement;
pub mod tracker;
pub mod yin;

pub use config::TrackerConfig;
pub use error::{ChannelError, ConfigError};
pub use measurement::PitchMeasurement;
pub use yin::DifferenceMethod;
