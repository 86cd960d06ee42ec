use alloc::collections::VecDeque;
use core::time::Duration;

use crate::channel::PitchConsumer;
use crate::common::{freq_to_midi_note, note_name, NoteName};
use crate::error::ConfigError;
use crate::measurement::PitchMeasurement;

/// How many seconds of history to keep for display by default.
pub const DEFAULT_DISPLAY_WINDOW_SECONDS: f32 = 8.0;
/// How many times per second the history is expected to be drained by default.
pub const DEFAULT_REFRESH_RATE_HZ: f32 = 30.0;
/// The lowest supported drain rate, one drain every 100 seconds.
pub const MIN_REFRESH_RATE_HZ: f32 = 0.01;
/// Extra seconds of history kept beyond the display window, so that points don't
/// disappear while still at the edge of the display.
pub const PRUNE_MARGIN_SECONDS: f64 = 1.0;

/// Checks that `seconds` is a usable display window length.
pub fn validate_display_window(seconds: f32) -> Result<(), ConfigError> {
    if seconds >= 0.0 && seconds.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidDisplayWindow(seconds))
    }
}

/// Checks that `refresh_rate_hz` is a usable drain rate.
pub fn validate_refresh_rate(refresh_rate_hz: f32) -> Result<(), ConfigError> {
    if refresh_rate_hz >= MIN_REFRESH_RATE_HZ && refresh_rate_hz.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidRefreshRate(refresh_rate_hz))
    }
}

/// A measurement in the history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryPoint {
    /// The frequency in Hz, 0 if unvoiced.
    pub frequency_hz: f32,
    /// The fractional MIDI note number, `None` if unvoiced.
    pub midi_note: Option<f32>,
    pub timestamp_seconds: f64,
}

impl From<PitchMeasurement> for HistoryPoint {
    fn from(measurement: PitchMeasurement) -> Self {
        HistoryPoint {
            frequency_hz: measurement.frequency_hz,
            midi_note: measurement.midi_note(),
            timestamp_seconds: measurement.timestamp_seconds,
        }
    }
}

/// The consumer side of a pitch tracker. Meant to be drained periodically,
/// at [poll_interval](PitchHistory::poll_interval), by a non real time thread.
///
/// Keeps the measurements of the last `display_window_seconds` (plus a
/// margin of [PRUNE_MARGIN_SECONDS]) in time order, along with the most
/// recent voiced frequency.
pub struct PitchHistory {
    consumer: PitchConsumer,
    points: VecDeque<HistoryPoint>,
    current_frequency_hz: f32,
    latest_timestamp: f64,
    display_window_seconds: f32,
    refresh_rate_hz: f32,
    /// The producer's drop count at the previous drain.
    reported_dropped_count: usize,
}

impl PitchHistory {
    /// Panics if `display_window_seconds` is negative or not finite.
    pub fn new(consumer: PitchConsumer, display_window_seconds: f32) -> Self {
        PitchHistory::from_options(consumer, display_window_seconds, DEFAULT_REFRESH_RATE_HZ)
    }

    /// Panics if `display_window_seconds` is negative or not finite, or if
    /// `refresh_rate_hz` is not a positive, finite number.
    pub fn from_options(consumer: PitchConsumer, display_window_seconds: f32, refresh_rate_hz: f32) -> Self {
        if let Err(error) = validate_display_window(display_window_seconds) {
            panic!("{}", error)
        }
        if let Err(error) = validate_refresh_rate(refresh_rate_hz) {
            panic!("{}", error)
        }
        PitchHistory {
            consumer,
            points: VecDeque::new(),
            current_frequency_hz: 0.0,
            latest_timestamp: 0.0,
            display_window_seconds,
            refresh_rate_hz,
            reported_dropped_count: 0,
        }
    }

    /// Moves all available measurements from the channel to the history and
    /// prunes points that have fallen behind the display window.
    /// Returns the number of measurements received.
    pub fn drain(&mut self) -> usize {
        let mut received = 0;
        while let Some(measurement) = self.consumer.poll() {
            if measurement.is_voiced() {
                self.current_frequency_hz = measurement.frequency_hz;
            }
            if measurement.timestamp_seconds > self.latest_timestamp {
                self.latest_timestamp = measurement.timestamp_seconds;
            }
            self.points.push_back(measurement.into());
            received += 1;
        }

        let dropped_count = self.consumer.dropped_count();
        if dropped_count > self.reported_dropped_count {
            log::warn!(
                "Pitch channel full, {} measurements dropped since last drain",
                dropped_count - self.reported_dropped_count
            );
        }
        self.reported_dropped_count = dropped_count;

        self.prune();
        received
    }

    fn prune(&mut self) {
        let prune_before =
            self.latest_timestamp - self.display_window_seconds as f64 - PRUNE_MARGIN_SECONDS;
        while let Some(oldest) = self.points.front() {
            if oldest.timestamp_seconds < prune_before {
                self.points.pop_front();
            } else {
                break;
            }
        }
    }

    /// All retained points, oldest first.
    pub fn points(&self) -> &VecDeque<HistoryPoint> {
        &self.points
    }

    /// The retained points within the display window, i.e no older than
    /// `display_window_seconds` before the latest timestamp, oldest first.
    pub fn visible_points(&self) -> impl Iterator<Item = &HistoryPoint> + '_ {
        let window_start = self.window_start();
        self.points
            .iter()
            .skip_while(move |point| point.timestamp_seconds < window_start)
    }

    /// The timestamp of the left edge of the display window.
    pub fn window_start(&self) -> f64 {
        self.latest_timestamp - self.display_window_seconds as f64
    }

    /// The frequency of the most recent voiced measurement, or 0 if there hasn't been one.
    pub fn current_frequency_hz(&self) -> f32 {
        self.current_frequency_hz
    }

    /// The name of the note closest to [current_frequency_hz](PitchHistory::current_frequency_hz).
    pub fn current_note(&self) -> Option<NoteName> {
        if self.current_frequency_hz > 0.0 {
            Some(note_name(freq_to_midi_note(self.current_frequency_hz)))
        } else {
            None
        }
    }

    /// The largest timestamp received so far.
    pub fn latest_timestamp(&self) -> f64 {
        self.latest_timestamp
    }

    pub fn display_window_seconds(&self) -> f32 {
        self.display_window_seconds
    }

    /// Sets the length of the display window, taking effect on the next drain.
    /// Invalid values are rejected and leave the window unchanged.
    pub fn set_display_window_seconds(&mut self, seconds: f32) -> Result<(), ConfigError> {
        validate_display_window(seconds)?;
        log::debug!("Pitch history display window set to {} s", seconds);
        self.display_window_seconds = seconds;
        Ok(())
    }

    pub fn refresh_rate_hz(&self) -> f32 {
        self.refresh_rate_hz
    }

    /// The time between drains at the configured refresh rate.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.refresh_rate_hz as f64)
    }

    /// The number of measurements waiting in the channel.
    pub fn pending_count(&self) -> usize {
        self.consumer.available_count()
    }

    /// The total number of measurements dropped by the producer because the channel was full.
    pub fn dropped_count(&self) -> usize {
        self.consumer.dropped_count()
    }

    /// Forgets all points, the current frequency and the latest timestamp.
    pub fn clear(&mut self) {
        self.points.clear();
        self.current_frequency_hz = 0.0;
        self.latest_timestamp = 0.0;
        self.reported_dropped_count = 0;
    }

    pub(crate) fn consumer_mut(&mut self) -> &mut PitchConsumer {
        &mut self.consumer
    }
}
