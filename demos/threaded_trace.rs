//! Feeds a gliding synthetic tone through a pitch tracker from a simulated
//! audio thread and prints the detected note from the main thread.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use micro_pitch::tracker::pitch_tracker;
use micro_pitch::TrackerConfig;

const SAMPLE_RATE: f64 = 44100.0;
const BLOCK_SIZE: usize = 512;
const RUN_SECONDS: f64 = 4.0;

fn main() {
    let config = TrackerConfig::default();
    let (mut accumulator, mut history) = match pitch_tracker(&config, SAMPLE_RATE) {
        Ok(tracker) => tracker,
        Err(error) => {
            eprintln!("invalid tracker config: {}", error);
            return;
        }
    };

    let done = Arc::new(AtomicBool::new(false));
    let audio_done = done.clone();

    let audio_thread = thread::spawn(move || {
        let block_duration = Duration::from_secs_f64(BLOCK_SIZE as f64 / SAMPLE_RATE);
        let total_blocks = (RUN_SECONDS * SAMPLE_RATE) as usize / BLOCK_SIZE;
        let mut left = vec![0.0; BLOCK_SIZE];
        let mut right = vec![0.0; BLOCK_SIZE];
        let mut phase = 0.0_f64;

        for block_index in 0..total_blocks {
            // Glide from A2 to A4 over the run
            let progress = block_index as f64 / total_blocks as f64;
            let frequency = 110.0 * (2.0_f64).powf(2.0 * progress);
            for i in 0..BLOCK_SIZE {
                let value = (0.5 * phase.sin()) as f32;
                left[i] = value;
                right[i] = value;
                phase += 2.0 * std::f64::consts::PI * frequency / SAMPLE_RATE;
            }
            accumulator.process_block(&mut [&mut left[..], &mut right[..]], 2, BLOCK_SIZE);
            thread::sleep(block_duration);
        }
        audio_done.store(true, Ordering::Release);
    });

    let start = Instant::now();
    while !done.load(Ordering::Acquire) {
        thread::sleep(history.poll_interval());
        if history.drain() == 0 {
            continue;
        }
        let elapsed = start.elapsed().as_secs_f64();
        match history.current_note() {
            Some(note) => println!(
                "{:6.2} s  {:8.2} Hz  {}",
                elapsed,
                history.current_frequency_hz(),
                note
            ),
            None => println!("{:6.2} s  no pitch", elapsed),
        }
    }

    if audio_thread.join().is_err() {
        eprintln!("audio thread panicked");
    }
    history.drain();
    println!(
        "{} points in history, {} measurements dropped",
        history.points().len(),
        history.dropped_count()
    );
}
