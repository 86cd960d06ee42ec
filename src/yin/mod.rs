//! A rust implementation of the YIN [pitch](https://en.wikipedia.org/wiki/Pitch_%28music%29) detection algorithm,
//! described in the paper [YIN, a fundamental frequency estimator for speech and music](http://audition.ens.fr/adc/pdf/2002_JASA_YIN.pdf)
//! by Alain de Cheveigné and Hideki Kawahara. The algorithm is used for detecting pitch in monophonic sounds. It
//! cannot be used to detect multiple pitches at once, like in a musical chord.
//!
//! The implementation is suitable for use in a real time audio callback:
//! * Memory is only allocated on initialization.
//! * Windows below roughly -60 dBFS are rejected before any expensive computation.
//! * The difference function can optionally be computed using FFT.
//!
//! Each window is processed in the following steps:
//! 1. Compute the difference function `d(τ)` over half the window.
//! 2. Normalize it by its cumulative mean, which removes the trivial minimum at `τ = 0`.
//! 3. Search lags corresponding to 40 - 1200 Hz for the first dip below the voicing
//!    threshold, and settle at the bottom of that dip. If a shorter lag
//!    that is a whole fraction of the found lag also dips below the threshold,
//!    it is used instead, which lets tones up to 2000 Hz be detected.
//! 4. Refine the lag using parabolic interpolation.
//!
//! # Example
//! ```
//! use micro_pitch::yin::PitchEstimator;
//!
//! // Create a window containing a pure tone at 220 Hz.
//! let sample_rate = 44100.0;
//! let window_size = 2048;
//! let window: Vec<f32> = (0..window_size)
//!     .map(|i| (2.0 * std::f64::consts::PI * 220.0 * (i as f64) / sample_rate).sin() as f32)
//!     .collect();
//!
//! let mut estimator = PitchEstimator::new(window_size);
//! let frequency = estimator.estimate(&window[..], sample_rate);
//! assert!((frequency - 220.0).abs() <= 2.2);
//!
//! // Silence has no pitch.
//! assert_eq!(estimator.estimate(&vec![0.0; window_size][..], sample_rate), 0.0);
//! ```

mod estimator;
mod util;

pub use estimator::{
    validate_window_size, DifferenceMethod, PitchEstimator, DEFAULT_THRESHOLD,
    DEFAULT_WINDOW_SIZE, MAX_THRESHOLD, MIN_THRESHOLD, MIN_WINDOW_SIZE, SILENCE_MEAN_SQUARE,
};
