use alloc::boxed::Box;
use alloc::vec;
use microfft::Complex32;
use serde::{Deserialize, Serialize};

use crate::common::{is_supported_fft_size, F32ArrayExt};
use crate::error::ConfigError;
use crate::yin::util::{
    correct_octave, cumulative_mean_normalize, difference_direct, difference_fft,
    find_period_lag, min_accepted_lag, parabolic_interpolation, search_lag_range, MAX_FREQUENCY,
    MIN_FREQUENCY,
};

/// The smallest supported window size.
pub const MIN_WINDOW_SIZE: usize = 512;
/// The default window size, about 46 ms at 44.1 kHz.
pub const DEFAULT_WINDOW_SIZE: usize = 2048;
/// The default voicing threshold.
pub const DEFAULT_THRESHOLD: f32 = 0.15;
/// The lowest allowed voicing threshold. Lower values are clamped to this.
pub const MIN_THRESHOLD: f32 = 0.05;
/// The highest allowed voicing threshold. Higher values are clamped to this.
pub const MAX_THRESHOLD: f32 = 0.5;
/// Windows with a mean square below this (roughly -60 dBFS) are treated as silence.
pub const SILENCE_MEAN_SQUARE: f32 = 1e-6;

/// How the difference function is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifferenceMethod {
    /// Dense summation, `O(N²/4)` operations per window.
    #[default]
    Direct,
    /// Cross terms computed with FFT, `O(N log N)` operations per window.
    /// Limited to window sizes up to [MAX_FFT_SIZE](crate::common::MAX_FFT_SIZE).
    Fft,
}

/// Checks that a window size and difference method can be used to create a [PitchEstimator].
pub fn validate_window_size(window_size: usize, method: DifferenceMethod) -> Result<(), ConfigError> {
    if window_size < MIN_WINDOW_SIZE || !window_size.is_power_of_two() {
        return Err(ConfigError::InvalidWindowSize(window_size));
    }
    if method == DifferenceMethod::Fft && !is_supported_fft_size(window_size) {
        return Err(ConfigError::UnsupportedFftSize(window_size));
    }
    Ok(())
}

fn clamp_threshold(threshold: f32) -> f32 {
    if threshold.is_nan() {
        DEFAULT_THRESHOLD
    } else {
        threshold.max(MIN_THRESHOLD).min(MAX_THRESHOLD)
    }
}

/// Estimates the fundamental frequency of a fixed size window of mono samples
/// using the YIN algorithm.
///
/// All memory is allocated on creation. [estimate](PitchEstimator::estimate)
/// does not allocate, lock or panic.
pub struct PitchEstimator {
    window_size: usize,
    threshold: f32,
    method: DifferenceMethod,
    /// Holds the difference function, then its normalized version. `window_size / 2` long.
    difference: Box<[f32]>,
    /// FFT scratch buffers. Empty unless `method` is `DifferenceMethod::Fft`.
    head_spectrum: Box<[Complex32]>,
    signal_spectrum: Box<[Complex32]>,
}

impl PitchEstimator {
    /// Creates an estimator with the default threshold and direct difference computation.
    ///
    /// Panics if `window_size` is not a power of two >= [MIN_WINDOW_SIZE].
    pub fn new(window_size: usize) -> Self {
        PitchEstimator::from_options(window_size, DEFAULT_THRESHOLD, DifferenceMethod::Direct)
    }

    /// Panics if `window_size` is not a power of two >= [MIN_WINDOW_SIZE], or if
    /// `method` is [DifferenceMethod::Fft] and the window size is not a supported FFT size.
    pub fn from_options(window_size: usize, threshold: f32, method: DifferenceMethod) -> Self {
        if let Err(error) = validate_window_size(window_size, method) {
            panic!("{}", error)
        }

        let spectrum_size = match method {
            DifferenceMethod::Direct => 0,
            DifferenceMethod::Fft => window_size,
        };

        log::debug!(
            "Created pitch estimator, window size {}, threshold {}, {:?} difference",
            window_size,
            clamp_threshold(threshold),
            method
        );

        PitchEstimator {
            window_size,
            threshold: clamp_threshold(threshold),
            method,
            difference: vec![0.0; window_size / 2].into_boxed_slice(),
            head_spectrum: vec![Complex32::new(0.0, 0.0); spectrum_size].into_boxed_slice(),
            signal_spectrum: vec![Complex32::new(0.0, 0.0); spectrum_size].into_boxed_slice(),
        }
    }

    /// Returns the fundamental frequency in Hz of the first `window_size` samples,
    /// or 0 if no clear pitch was found (silence, noise, unvoiced sounds).
    /// Also returns 0 if `samples` holds fewer than `window_size` samples or
    /// if `sample_rate` is not a positive number.
    ///
    /// A non-zero result is always in the range [40, 2000] Hz.
    pub fn estimate(&mut self, samples: &[f32], sample_rate: f64) -> f32 {
        if samples.len() < self.window_size || !(sample_rate > 0.0) || !sample_rate.is_finite() {
            return 0.0;
        }
        let window = &samples[..self.window_size];

        // Skip silent windows, avoiding phantom detections and the expensive steps below.
        if !(window.mean_square() >= SILENCE_MEAN_SQUARE) {
            return 0.0;
        }

        let computed_with_fft = self.method == DifferenceMethod::Fft
            && difference_fft(
                window,
                &mut self.difference,
                &mut self.head_spectrum,
                &mut self.signal_spectrum,
            );
        if !computed_with_fft {
            difference_direct(window, &mut self.difference);
        }
        cumulative_mean_normalize(&mut self.difference);

        let normalized = &self.difference[..];
        let (tau_min, tau_max) = search_lag_range(sample_rate, normalized.len());
        let tau = match find_period_lag(normalized, tau_min, tau_max, self.threshold) {
            Some(tau) => tau,
            None => return 0.0,
        };
        let tau = correct_octave(
            normalized,
            tau,
            tau_min,
            min_accepted_lag(sample_rate),
            self.threshold,
        );

        let refined_tau = parabolic_interpolation(normalized, tau);
        if !(refined_tau > 0.0) {
            return 0.0;
        }

        let frequency = (sample_rate / (refined_tau as f64)) as f32;
        if frequency >= MIN_FREQUENCY && frequency <= MAX_FREQUENCY {
            frequency
        } else {
            0.0
        }
    }

    /// The number of samples analyzed by [estimate](PitchEstimator::estimate).
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Sets the voicing threshold, clamped to [[MIN_THRESHOLD], [MAX_THRESHOLD]].
    /// Lower values make detection stricter.
    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = clamp_threshold(threshold);
    }

    pub fn difference_method(&self) -> DifferenceMethod {
        self.method
    }

    /// The cumulative mean normalized difference function computed by the most
    /// recent call to [estimate](PitchEstimator::estimate) that got past the
    /// energy gate.
    pub fn normalized_difference(&self) -> &[f32] {
        &self.difference
    }
}
