use microfft::Complex32;

use super::fft::complex_fft_in_place;

/// Computes the cross-correlation `c(τ) = Σ_{j < L} x[j] · x[j + τ]` between the
/// first `L = result.len()` samples of `signal` and the whole of `signal`,
/// for `τ` in `[0, L)`, using FFT.
///
/// # Arguments
///
/// * `signal` - Input buffer. Must be at least `2 * result.len() - 1` samples long.
/// * `result` - A buffer to write the result to.
/// * `head_spectrum` - Scratch buffer, one FFT's worth of complex values.
/// * `signal_spectrum` - Scratch buffer of the same length as `head_spectrum`.
///
/// The FFT size is the length of the scratch buffers. It must be a supported
/// FFT size and not shorter than `signal`, otherwise false is returned and
/// `result` is left untouched. Since every product `x[j] · x[j + τ]` has
/// `j + τ <= 2L - 2 < signal.len()`, the circular correlation computed by the FFT
/// has no wrap-around terms.
pub fn cross_correlate_fft(
    signal: &[f32],
    result: &mut [f32],
    head_spectrum: &mut [Complex32],
    signal_spectrum: &mut [Complex32],
) -> bool {
    let lag_count = result.len();
    let fft_size = head_spectrum.len();
    if signal_spectrum.len() != fft_size
        || fft_size < signal.len()
        || lag_count == 0
        || 2 * lag_count - 1 > signal.len()
    {
        return false;
    }

    // Build FFT input signals
    for (index, value) in head_spectrum.iter_mut().enumerate() {
        let sample = if index < lag_count { signal[index] } else { 0.0 };
        *value = Complex32::new(sample, 0.0);
    }
    for (index, value) in signal_spectrum.iter_mut().enumerate() {
        let sample = signal.get(index).copied().unwrap_or(0.0);
        *value = Complex32::new(sample, 0.0);
    }

    if !complex_fft_in_place(head_spectrum) || !complex_fft_in_place(signal_spectrum) {
        return false;
    }

    // c = IFFT(conj(H) · S). Since c is real, IFFT(Z) = conj(FFT(conj(Z))) / n
    // reduces to Re(FFT(H · conj(S))) / n.
    for (head, whole) in head_spectrum.iter_mut().zip(signal_spectrum.iter()) {
        *head = *head * whole.conj();
    }
    if !complex_fft_in_place(head_spectrum) {
        return false;
    }

    let scale = 1.0 / (fft_size as f32);
    for (result, value) in result.iter_mut().zip(head_spectrum.iter()) {
        *result = scale * value.re;
    }
    true
}

/// Computes the same cross-correlation as [cross_correlate_fft] as a
/// naive summation.
pub fn cross_correlate_sum(signal: &[f32], result: &mut [f32]) {
    let lag_count = result.len();
    for (tau, value) in result.iter_mut().enumerate() {
        let mut sum: f32 = 0.0;
        for j in 0..lag_count {
            sum += signal[j] * signal[j + tau];
        }
        *value = sum;
    }
}
