use core::convert::TryFrom;
use microfft::Complex32;

/// The smallest FFT size handled by [complex_fft_in_place].
pub const MIN_FFT_SIZE: usize = 8;
/// The largest FFT size handled by [complex_fft_in_place].
pub const MAX_FFT_SIZE: usize = 4096;

/// Returns true if `size` is an FFT size supported by [complex_fft_in_place].
pub fn is_supported_fft_size(size: usize) -> bool {
    size.is_power_of_two() && (MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&size)
}

fn run_fft<const N: usize>(
    buffer: &mut [Complex32],
    fft: fn(&mut [Complex32; N]) -> &mut [Complex32; N],
) -> bool {
    match <&mut [Complex32; N]>::try_from(buffer) {
        Ok(array) => {
            let _ = fft(array);
            true
        }
        Err(_) => false,
    }
}

/// Performs an in-place complex FFT on a given buffer. Returns false,
/// leaving the buffer untouched, if the buffer length is not
/// a supported FFT size.
pub fn complex_fft_in_place(buffer: &mut [Complex32]) -> bool {
    match buffer.len() {
        8 => run_fft(buffer, microfft::complex::cfft_8),
        16 => run_fft(buffer, microfft::complex::cfft_16),
        32 => run_fft(buffer, microfft::complex::cfft_32),
        64 => run_fft(buffer, microfft::complex::cfft_64),
        128 => run_fft(buffer, microfft::complex::cfft_128),
        256 => run_fft(buffer, microfft::complex::cfft_256),
        512 => run_fft(buffer, microfft::complex::cfft_512),
        1024 => run_fft(buffer, microfft::complex::cfft_1024),
        2048 => run_fft(buffer, microfft::complex::cfft_2048),
        4096 => run_fft(buffer, microfft::complex::cfft_4096),
        _ => false,
    }
}
