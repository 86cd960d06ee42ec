//! A bounded, lossy, lock free channel moving [PitchMeasurement]s from exactly one
//! producer (the audio thread) to exactly one consumer (for example a UI thread).
//!
//! The channel is a ring buffer indexed by two monotonically increasing cursors.
//! The write cursor is only stored to by the producer and the read cursor only by
//! the consumer. A slot is written before the write cursor is advanced with
//! release ordering, and the consumer loads the write cursor with acquire ordering
//! before reading the slot, so a record is never observed partially written.
//! The same pairing in the opposite direction keeps the producer from overwriting
//! a slot that is still being read.
//!
//! When the channel is full, [PitchProducer::offer] drops the new record. Records
//! already in the channel are never overwritten, so the consumer always sees the
//! oldest records, in the order they were offered.
//!
//! ```
//! use micro_pitch::channel::channel;
//! use micro_pitch::PitchMeasurement;
//!
//! let (mut producer, mut consumer) = channel(4);
//! for i in 0..6 {
//!     producer.offer(PitchMeasurement::new(220.0, i as f64));
//! }
//! // The last two records did not fit
//! assert_eq!(consumer.dropped_count(), 2);
//! assert_eq!(consumer.poll().map(|m| m.timestamp_seconds), Some(0.0));
//! assert_eq!(consumer.available_count(), 3);
//! ```

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{ChannelError, ConfigError};
use crate::measurement::PitchMeasurement;

/// The default capacity. At one record per 2048 samples at 44.1 kHz, this is
/// more than three minutes of measurements.
pub const DEFAULT_CAPACITY: usize = 4096;

/// Checks that `capacity` is a valid channel capacity, i.e a power of two.
pub fn validate_capacity(capacity: usize) -> Result<(), ConfigError> {
    if capacity.is_power_of_two() {
        Ok(())
    } else {
        Err(ConfigError::InvalidChannelCapacity(capacity))
    }
}

/// Keeps the two cursors on separate cache lines.
#[repr(align(64))]
struct CachePadded(AtomicUsize);

struct Shared {
    slots: Box<[UnsafeCell<PitchMeasurement>]>,
    /// Capacity - 1
    mask: usize,
    /// The number of records written so far, wrapping. Only stored to by the producer.
    write_cursor: CachePadded,
    /// The number of records read so far, wrapping. Only stored to by the consumer.
    read_cursor: CachePadded,
    /// The number of dropped records. Only stored to by the producer.
    dropped: AtomicUsize,
}

// Slots are only accessed according to the cursor protocol described above.
unsafe impl Sync for Shared {}

impl Shared {
    fn capacity(&self) -> usize {
        self.mask + 1
    }
}

/// Creates a channel with a fixed `capacity` and returns its producer and consumer ends.
///
/// Panics if `capacity` is not a power of two.
pub fn channel(capacity: usize) -> (PitchProducer, PitchConsumer) {
    if let Err(error) = validate_capacity(capacity) {
        panic!("{}", error)
    }

    let slots: Vec<UnsafeCell<PitchMeasurement>> = (0..capacity)
        .map(|_| UnsafeCell::new(PitchMeasurement::default()))
        .collect();
    let shared = Arc::new(Shared {
        slots: slots.into_boxed_slice(),
        mask: capacity - 1,
        write_cursor: CachePadded(AtomicUsize::new(0)),
        read_cursor: CachePadded(AtomicUsize::new(0)),
        dropped: AtomicUsize::new(0),
    });
    log::debug!("Created pitch channel with capacity {}", capacity);

    (
        PitchProducer {
            shared: shared.clone(),
            dropped: 0,
        },
        PitchConsumer { shared },
    )
}

/// The producing end of a pitch channel. Never blocks or allocates.
pub struct PitchProducer {
    shared: Arc<Shared>,
    dropped: usize,
}

impl PitchProducer {
    /// Appends a record to the channel. If the channel is full, the record is
    /// dropped and false is returned.
    pub fn offer(&mut self, measurement: PitchMeasurement) -> bool {
        let shared = &*self.shared;
        let write = shared.write_cursor.0.load(Ordering::Relaxed);
        let read = shared.read_cursor.0.load(Ordering::Acquire);

        if write.wrapping_sub(read) >= shared.capacity() {
            self.dropped = self.dropped.wrapping_add(1);
            shared.dropped.store(self.dropped, Ordering::Relaxed);
            return false;
        }

        // The slot at the write cursor is not visible to the consumer
        // until the cursor is advanced below.
        unsafe {
            *shared.slots[write & shared.mask].get() = measurement;
        }
        shared
            .write_cursor
            .0
            .store(write.wrapping_add(1), Ordering::Release);
        true
    }

    /// The number of records dropped because the channel was full.
    pub fn dropped_count(&self) -> usize {
        self.dropped
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity()
    }
}

/// The consuming end of a pitch channel. Never blocks.
pub struct PitchConsumer {
    shared: Arc<Shared>,
}

impl PitchConsumer {
    /// Removes and returns the oldest record, or `None` if the channel is empty.
    pub fn poll(&mut self) -> Option<PitchMeasurement> {
        let shared = &*self.shared;
        let read = shared.read_cursor.0.load(Ordering::Relaxed);
        let write = shared.write_cursor.0.load(Ordering::Acquire);

        if read == write {
            return None;
        }

        // The producer does not touch this slot until the read cursor has been advanced.
        let measurement = unsafe { *shared.slots[read & shared.mask].get() };
        shared
            .read_cursor
            .0
            .store(read.wrapping_add(1), Ordering::Release);
        Some(measurement)
    }

    /// The number of records ready to be polled. More records may arrive at any time.
    pub fn available_count(&self) -> usize {
        let read = self.shared.read_cursor.0.load(Ordering::Relaxed);
        let write = self.shared.write_cursor.0.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }

    /// The number of records the producer has dropped because the channel was full.
    pub fn dropped_count(&self) -> usize {
        self.shared.dropped.load(Ordering::Relaxed)
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity()
    }

    /// Empties the channel and clears the drop count. Taking both ends by mutable
    /// reference guarantees that neither is in use, for example while an audio
    /// stream is being restarted.
    pub fn reset(&mut self, producer: &mut PitchProducer) -> Result<(), ChannelError> {
        if !Arc::ptr_eq(&self.shared, &producer.shared) {
            return Err(ChannelError::ForeignProducer);
        }
        self.shared.write_cursor.0.store(0, Ordering::Relaxed);
        self.shared.read_cursor.0.store(0, Ordering::Relaxed);
        self.shared.dropped.store(0, Ordering::Relaxed);
        producer.dropped = 0;
        log::debug!("Reset pitch channel");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    fn measurement(index: usize) -> PitchMeasurement {
        PitchMeasurement::new(100.0 + index as f32, index as f64 * 0.05)
    }

    #[test]
    fn test_fifo_round_trip() {
        let (mut producer, mut consumer) = channel(8);
        assert_eq!(consumer.poll(), None);
        for i in 0..5 {
            assert!(producer.offer(measurement(i)));
        }
        assert_eq!(consumer.available_count(), 5);
        for i in 0..5 {
            assert_eq!(consumer.poll(), Some(measurement(i)));
        }
        assert_eq!(consumer.poll(), None);
        assert_eq!(consumer.available_count(), 0);
    }

    #[test]
    fn test_full_channel_keeps_oldest() {
        let capacity = 16;
        let extra = 5;
        let (mut producer, mut consumer) = channel(capacity);
        let mut accepted = 0;
        for i in 0..capacity + extra {
            if producer.offer(measurement(i)) {
                accepted += 1;
            }
        }
        assert_eq!(accepted, capacity);
        assert_eq!(producer.dropped_count(), extra);
        assert_eq!(consumer.dropped_count(), extra);
        assert_eq!(consumer.available_count(), capacity);

        let mut received: Vec<PitchMeasurement> = vec![];
        while let Some(m) = consumer.poll() {
            received.push(m);
        }
        let expected: Vec<PitchMeasurement> = (0..capacity).map(measurement).collect();
        assert_eq!(received, expected);
    }

    #[test]
    fn test_default_capacity_keeps_oldest() {
        let (mut producer, mut consumer) = channel(DEFAULT_CAPACITY);
        for i in 0..DEFAULT_CAPACITY + 1 {
            producer.offer(measurement(i));
        }
        assert_eq!(consumer.available_count(), DEFAULT_CAPACITY);
        assert_eq!(consumer.poll(), Some(measurement(0)));
        let mut last = None;
        while let Some(m) = consumer.poll() {
            last = Some(m);
        }
        assert_eq!(last, Some(measurement(DEFAULT_CAPACITY - 1)));
    }

    #[test]
    fn test_wraparound() {
        let (mut producer, mut consumer) = channel(4);
        let mut next_expected = 0;
        for i in 0..50 {
            assert!(producer.offer(measurement(i)));
            if i % 3 == 2 {
                while let Some(m) = consumer.poll() {
                    assert_eq!(m, measurement(next_expected));
                    next_expected += 1;
                }
            }
        }
        while let Some(m) = consumer.poll() {
            assert_eq!(m, measurement(next_expected));
            next_expected += 1;
        }
        assert_eq!(next_expected, 50);
        assert_eq!(consumer.dropped_count(), 0);
    }

    #[test]
    fn test_space_is_freed_by_polling() {
        let (mut producer, mut consumer) = channel(2);
        assert!(producer.offer(measurement(0)));
        assert!(producer.offer(measurement(1)));
        assert!(!producer.offer(measurement(2)));
        assert_eq!(consumer.poll(), Some(measurement(0)));
        assert!(producer.offer(measurement(3)));
        assert_eq!(consumer.poll(), Some(measurement(1)));
        assert_eq!(consumer.poll(), Some(measurement(3)));
        assert_eq!(consumer.poll(), None);
    }

    #[test]
    fn test_reset() {
        let (mut producer, mut consumer) = channel(4);
        for i in 0..6 {
            producer.offer(measurement(i));
        }
        assert_eq!(consumer.reset(&mut producer), Ok(()));
        assert_eq!(consumer.available_count(), 0);
        assert_eq!(consumer.dropped_count(), 0);
        assert_eq!(producer.dropped_count(), 0);
        assert_eq!(consumer.poll(), None);

        assert!(producer.offer(measurement(10)));
        assert_eq!(consumer.poll(), Some(measurement(10)));
    }

    #[test]
    fn test_reset_with_foreign_producer() {
        let (mut producer, mut consumer) = channel(4);
        let (mut other_producer, _other_consumer) = channel(4);
        producer.offer(measurement(0));
        assert_eq!(
            consumer.reset(&mut other_producer),
            Err(ChannelError::ForeignProducer)
        );
        assert_eq!(consumer.available_count(), 1);
    }

    #[test]
    fn test_capacity() {
        let (producer, consumer) = channel(64);
        assert_eq!(producer.capacity(), 64);
        assert_eq!(consumer.capacity(), 64);
        assert_eq!(validate_capacity(4096), Ok(()));
        assert_eq!(validate_capacity(0), Err(ConfigError::InvalidChannelCapacity(0)));
        assert_eq!(validate_capacity(100), Err(ConfigError::InvalidChannelCapacity(100)));
    }

    #[test]
    #[should_panic]
    fn test_zero_capacity() {
        channel(0);
    }

    #[test]
    #[should_panic]
    fn test_capacity_not_power_of_two() {
        channel(1000);
    }

    #[test]
    fn test_concurrent_producer_and_consumer() {
        use std::thread;

        const COUNT: usize = 200_000;
        let (mut producer, mut consumer) = channel(64);

        let handle = thread::spawn(move || {
            for i in 0..COUNT {
                // Every field is derived from the index, so a torn read would be detected
                producer.offer(PitchMeasurement::new((i % 1000) as f32, i as f64));
            }
            producer
        });

        let mut received = 0;
        let mut last_index: Option<usize> = None;
        let mut check = |m: PitchMeasurement| {
            let index = m.timestamp_seconds as usize;
            assert_eq!(m.frequency_hz, (index % 1000) as f32);
            if let Some(last) = last_index {
                assert!(index > last);
            }
            last_index = Some(index);
            received += 1;
        };

        while !handle.is_finished() {
            while let Some(m) = consumer.poll() {
                check(m);
            }
        }
        let producer = handle.join().unwrap();
        while let Some(m) = consumer.poll() {
            check(m);
        }

        assert_eq!(received + producer.dropped_count(), COUNT);
        assert_eq!(consumer.dropped_count(), producer.dropped_count());
    }
}
