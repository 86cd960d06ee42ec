//! Common algorithms and utilities.

mod cross_corr;
mod f32_array_ext;
mod fft;
mod midi;

pub use cross_corr::{cross_correlate_fft, cross_correlate_sum};
pub use f32_array_ext::F32ArrayExt;
pub use fft::{complex_fft_in_place, is_supported_fft_size, MAX_FFT_SIZE};
pub use midi::{freq_to_midi_note, is_black_key, nearest_midi_note, note_name, NoteName};
