use alloc::boxed::Box;
use alloc::vec;

use crate::channel::PitchProducer;
use crate::error::ConfigError;
use crate::measurement::PitchMeasurement;
use crate::yin::PitchEstimator;

/// Checks that `sample_rate` is a usable sample rate in Hz.
pub fn validate_sample_rate(sample_rate: f64) -> Result<(), ConfigError> {
    if sample_rate > 0.0 && sample_rate.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidSampleRate(sample_rate))
    }
}

/// The audio thread side of a pitch tracker.
///
/// * Mixes incoming blocks down to mono
/// * Collects the mono samples into non-overlapping windows
/// * Estimates the pitch of each filled window and sends the result,
///   stamped with the stream time of the last sample in the window, to the consumer.
///
/// Block sizes don't need to divide the window size. Processing never blocks,
/// allocates or panics.
pub struct PitchAccumulator {
    estimator: PitchEstimator,
    producer: PitchProducer,
    window: Box<[f32]>,
    /// The number of samples written to `window` since it was last analyzed.
    window_fill: usize,
    sample_rate: f64,
    samples_processed: u64,
    windows_analyzed: u64,
}

impl PitchAccumulator {
    /// Panics if `sample_rate` is not a positive, finite number.
    pub fn new(estimator: PitchEstimator, producer: PitchProducer, sample_rate: f64) -> Self {
        if let Err(error) = validate_sample_rate(sample_rate) {
            panic!("{}", error)
        }
        let window_size = estimator.window_size();
        PitchAccumulator {
            estimator,
            producer,
            window: vec![0.0; window_size].into_boxed_slice(),
            window_fill: 0,
            sample_rate,
            samples_processed: 0,
            windows_analyzed: 0,
        }
    }

    /// Prepares for a new stream: sets the sample rate and starts over with an
    /// empty window and the stream time at zero. Does not touch the channel, see
    /// [restart](crate::tracker::restart).
    ///
    /// Panics if `sample_rate` is not a positive, finite number.
    pub fn prepare(&mut self, sample_rate: f64) {
        if let Err(error) = validate_sample_rate(sample_rate) {
            panic!("{}", error)
        }
        self.sample_rate = sample_rate;
        for sample in self.window.iter_mut() {
            *sample = 0.0;
        }
        self.window_fill = 0;
        self.samples_processed = 0;
        self.windows_analyzed = 0;
        log::info!(
            "Prepared pitch tracking at {} Hz, window size {}",
            sample_rate,
            self.window.len()
        );
    }

    /// Processes a block of planar audio in place.
    ///
    /// The first `input_channel_count` entries of `channels` are inputs and pass
    /// through untouched. The average of the first two inputs (or the only input)
    /// is analyzed. Remaining channels have no input and are cleared. Only the first
    /// `num_samples` samples of each channel are used, fewer if any channel is shorter.
    /// The stream time advances by the same count whether or not there are inputs.
    pub fn process_block(
        &mut self,
        channels: &mut [&mut [f32]],
        input_channel_count: usize,
        num_samples: usize,
    ) {
        let input_channel_count = input_channel_count.min(channels.len());
        // Samples per channel actually present in the block
        let sample_count = channels
            .iter()
            .fold(num_samples, |count, channel| count.min(channel.len()));

        for channel in channels.iter_mut().skip(input_channel_count) {
            for sample in channel[..sample_count].iter_mut() {
                *sample = 0.0;
            }
        }

        if input_channel_count == 0 {
            // Nothing to analyze, but the stream time still advances
            self.samples_processed += sample_count as u64;
            return;
        }

        let left: &[f32] = &channels[0];
        if input_channel_count > 1 {
            let right: &[f32] = &channels[1];
            for (l, r) in left[..sample_count].iter().zip(right[..sample_count].iter()) {
                self.push_sample((l + r) * 0.5);
            }
        } else {
            for sample in left[..sample_count].iter() {
                self.push_sample(*sample);
            }
        }
    }

    /// Processes a block of mono samples.
    pub fn process_mono(&mut self, samples: &[f32]) {
        for sample in samples.iter() {
            self.push_sample(*sample);
        }
    }

    fn push_sample(&mut self, sample: f32) {
        self.window[self.window_fill] = sample;
        self.window_fill += 1;
        self.samples_processed += 1;

        if self.window_fill == self.window.len() {
            let frequency_hz = self.estimator.estimate(&self.window, self.sample_rate);
            let timestamp_seconds = self.samples_processed as f64 / self.sample_rate;
            // A full channel drops the measurement, which the producer counts
            let _ = self
                .producer
                .offer(PitchMeasurement::new(frequency_hz, timestamp_seconds));
            self.windows_analyzed += 1;
            self.window_fill = 0;
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// The number of samples processed since the stream was prepared,
    /// including samples of blocks without inputs.
    pub fn samples_processed(&self) -> u64 {
        self.samples_processed
    }

    /// The number of windows analyzed since the stream was prepared.
    pub fn windows_analyzed(&self) -> u64 {
        self.windows_analyzed
    }

    /// The number of measurements dropped because the channel was full.
    pub fn dropped_count(&self) -> usize {
        self.producer.dropped_count()
    }

    pub fn window_size(&self) -> usize {
        self.window.len()
    }

    pub fn estimator(&self) -> &PitchEstimator {
        &self.estimator
    }

    pub fn estimator_mut(&mut self) -> &mut PitchEstimator {
        &mut self.estimator
    }

    pub(crate) fn producer_mut(&mut self) -> &mut PitchProducer {
        &mut self.producer
    }
}
