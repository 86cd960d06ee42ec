use micromath::F32Ext;

use crate::common::cross_correlate_fft;
use microfft::Complex32;

/// Lowest frequency, in Hz, considered when searching for the pitch period.
pub(crate) const SEARCH_MIN_FREQUENCY: f64 = 40.0;
/// Highest frequency, in Hz, at which the pitch period search starts.
pub(crate) const SEARCH_MAX_FREQUENCY: f64 = 1200.0;
/// Range, in Hz, of frequencies accepted as a detected pitch.
pub(crate) const MIN_FREQUENCY: f32 = 40.0;
pub(crate) const MAX_FREQUENCY: f32 = 2000.0;

fn floor_positive(value: f64) -> usize {
    // `as` truncates towards zero and saturates, which is floor for value >= 0
    value as usize
}

fn ceil_positive(value: f64) -> usize {
    let floor = floor_positive(value);
    if (floor as f64) < value {
        floor.saturating_add(1)
    } else {
        floor
    }
}

/// Computes the difference function `d(τ) = Σ_{j < L} (x[j] − x[j + τ])²`
/// for `τ` in `[0, L)`, where `L = result.len()`, as a dense summation.
/// `window` must hold at least `2L - 1` samples.
pub(crate) fn difference_direct(window: &[f32], result: &mut [f32]) {
    let lag_count = result.len();
    for (tau, value) in result.iter_mut().enumerate() {
        let mut sum: f32 = 0.0;
        for j in 0..lag_count {
            let delta = window[j] - window[j + tau];
            sum += delta * delta;
        }
        *value = sum;
    }
}

/// Computes the same difference function as [difference_direct] by expanding
/// `(a − b)² = a² + b² − 2ab` and computing the cross terms with FFT.
/// `window` must hold at least `2L` samples. Returns false if the
/// FFT could not be performed.
pub(crate) fn difference_fft(
    window: &[f32],
    result: &mut [f32],
    head_spectrum: &mut [Complex32],
    signal_spectrum: &mut [Complex32],
) -> bool {
    if window.len() < 2 * result.len() {
        return false;
    }
    if !cross_correlate_fft(window, result, head_spectrum, signal_spectrum) {
        return false;
    }

    let lag_count = result.len();
    let mut head_energy: f64 = 0.0;
    for sample in window[..lag_count].iter() {
        head_energy += (*sample as f64) * (*sample as f64);
    }

    // Energy of window[τ..τ + L], updated incrementally
    let mut shifted_energy = head_energy;
    for (tau, value) in result.iter_mut().enumerate() {
        let difference = head_energy + shifted_energy - 2.0 * (*value as f64);
        *value = if difference > 0.0 { difference as f32 } else { 0.0 };

        let leaving = window[tau] as f64;
        let entering = window[tau + lag_count] as f64;
        shifted_energy += entering * entering - leaving * leaving;
    }
    true
}

/// Replaces `d(τ)` with the cumulative mean normalized difference
/// `d'(τ) = d(τ) · τ / Σ_{j=1..τ} d(j)`, with `d'(0) = 1`. Lags where the
/// running sum is zero get the value 1.
pub(crate) fn cumulative_mean_normalize(difference: &mut [f32]) {
    if difference.is_empty() {
        return;
    }
    difference[0] = 1.0;
    let mut running_sum: f32 = 0.0;
    for tau in 1..difference.len() {
        running_sum += difference[tau];
        difference[tau] = if running_sum > 0.0 {
            difference[tau] * (tau as f32) / running_sum
        } else {
            1.0
        };
    }
}

/// Returns the inclusive lag range `[τ_min, τ_max]` to search for the pitch period.
/// The range is empty (`τ_min > τ_max`) if the lag count is too small for
/// the sample rate.
pub(crate) fn search_lag_range(sample_rate: f64, lag_count: usize) -> (usize, usize) {
    let tau_min = ceil_positive(sample_rate / SEARCH_MAX_FREQUENCY).max(1);
    let tau_max = floor_positive(sample_rate / SEARCH_MIN_FREQUENCY).min(lag_count.saturating_sub(2));
    (tau_min, tau_max)
}

/// Finds the first lag in `[tau_min, tau_max]` where the normalized difference
/// drops below `threshold` and follows it down to the bottom of the dip.
pub(crate) fn find_period_lag(
    normalized: &[f32],
    tau_min: usize,
    tau_max: usize,
    threshold: f32,
) -> Option<usize> {
    let mut tau = tau_min;
    while tau <= tau_max {
        if normalized[tau] < threshold {
            while tau + 1 <= tau_max && normalized[tau + 1] < normalized[tau] {
                tau += 1;
            }
            return Some(tau);
        }
        tau += 1;
    }
    None
}

/// The search starts at `τ_min`, so a tone above the search range is first
/// seen at a multiple of its period. Looks for the shortest lag `τ / k`, at
/// least `min_lag` and below `tau_min`, that is also a dip below `threshold`.
pub(crate) fn correct_octave(
    normalized: &[f32],
    tau: usize,
    tau_min: usize,
    min_lag: usize,
    threshold: f32,
) -> usize {
    let min_lag = min_lag.max(1);
    let last_index = normalized.len().saturating_sub(1);
    let mut best = tau;
    let mut divisor = 2;
    while tau / divisor >= min_lag {
        let mut candidate = (tau + divisor / 2) / divisor;
        if candidate < tau_min && candidate >= 1 && candidate < last_index {
            // Settle at the local minimum next to the rounded candidate
            if normalized[candidate - 1] < normalized[candidate] {
                candidate -= 1;
            } else if normalized[candidate + 1] < normalized[candidate] {
                candidate += 1;
            }
            if candidate >= min_lag && normalized[candidate] < threshold {
                best = candidate;
            }
        }
        divisor += 1;
    }
    best
}

/// Refines an integer lag by fitting a parabola through the normalized
/// difference at `tau − 1`, `tau` and `tau + 1` and returning the lag of its vertex.
/// Falls back to `tau` at the edges and when the parabola is degenerate.
pub(crate) fn parabolic_interpolation(normalized: &[f32], tau: usize) -> f32 {
    if tau < 1 || tau + 1 >= normalized.len() {
        return tau as f32;
    }

    let s0 = normalized[tau - 1];
    let s1 = normalized[tau];
    let s2 = normalized[tau + 1];

    let denominator = s0 - 2.0 * s1 + s2;
    if F32Ext::abs(denominator) < 1e-8 {
        return tau as f32;
    }

    (tau as f32) + 0.5 * (s0 - s2) / denominator
}

/// Returns the shortest lag considered by [correct_octave] at a given sample rate.
/// Rounded down, so a lag refined to just above `sample_rate / MAX_FREQUENCY`
/// is still reachable. Anything refined to above `MAX_FREQUENCY` is rejected later.
pub(crate) fn min_accepted_lag(sample_rate: f64) -> usize {
    floor_positive(sample_rate / (MAX_FREQUENCY as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    #[test]
    fn test_difference_direct() {
        let window: Vec<f32> = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let mut difference: Vec<f32> = vec![0.0; 4];
        difference_direct(&window[..], &mut difference[..]);
        // Each shift by one adds 1 to every difference
        assert_eq!(difference, vec![0.0, 4.0, 16.0, 36.0]);
    }

    #[test]
    fn test_difference_fft_matches_direct() {
        let window_size = 512;
        let window: Vec<f32> = (0..window_size)
            .map(|i| {
                let t = i as f32 / 44100.0;
                (2.0 * core::f32::consts::PI * 330.0 * t).sin()
                    + 0.3 * (2.0 * core::f32::consts::PI * 990.0 * t).sin()
            })
            .collect();
        let lag_count = window_size / 2;

        let mut direct = vec![0.0_f32; lag_count];
        difference_direct(&window[..], &mut direct[..]);

        let mut fft = vec![0.0_f32; lag_count];
        let mut head = vec![Complex32::new(0.0, 0.0); window_size];
        let mut whole = vec![Complex32::new(0.0, 0.0); window_size];
        assert!(difference_fft(&window[..], &mut fft[..], &mut head[..], &mut whole[..]));

        for (direct, fft) in direct.iter().zip(fft.iter()) {
            assert!((direct - fft).abs() <= 1e-2 * direct.max(1.0));
        }
    }

    #[test]
    fn test_normalization() {
        let mut difference: Vec<f32> = vec![0.0, 2.0, 4.0, 0.0];
        cumulative_mean_normalize(&mut difference[..]);
        assert_eq!(difference[0], 1.0);
        // 2 * 1 / 2
        assert_eq!(difference[1], 1.0);
        // 4 * 2 / 6
        assert!((difference[2] - 4.0 / 3.0).abs() <= f32::EPSILON);
        assert_eq!(difference[3], 0.0);
    }

    #[test]
    fn test_normalization_zero_running_sum() {
        let mut difference: Vec<f32> = vec![0.0; 5];
        cumulative_mean_normalize(&mut difference[..]);
        assert!(difference.iter().all(|v| *v == 1.0));
    }

    #[test]
    fn test_search_lag_range() {
        assert_eq!(search_lag_range(44100.0, 1024), (37, 1022));
        assert_eq!(search_lag_range(48000.0, 1024), (40, 1022));
        assert_eq!(search_lag_range(8000.0, 1024), (7, 200));
        // Lag count too small for the sample rate: empty range
        let (tau_min, tau_max) = search_lag_range(192000.0 * 8.0, 256);
        assert!(tau_min > tau_max);
    }

    #[test]
    fn test_find_period_lag_walks_to_bottom_of_dip() {
        let normalized = [1.0, 0.9, 0.8, 0.14, 0.1, 0.05, 0.2, 0.01, 0.5];
        assert_eq!(find_period_lag(&normalized, 1, 7, 0.15), Some(5));
        // Nothing below the threshold
        assert_eq!(find_period_lag(&normalized, 1, 2, 0.15), None);
        // Walking stops at tau_max
        assert_eq!(find_period_lag(&normalized, 1, 4, 0.15), Some(4));
    }

    #[test]
    fn test_correct_octave() {
        let mut normalized = vec![1.0_f32; 64];
        // Dips at multiples of 20
        normalized[20] = 0.02;
        normalized[40] = 0.01;
        normalized[60] = 0.03;
        // Found at 40 with tau_min = 30: 20 is the true period
        assert_eq!(correct_octave(&normalized, 40, 30, 10, 0.15), 20);
        // Candidates at or above tau_min were already rejected by the search
        assert_eq!(correct_octave(&normalized, 40, 15, 10, 0.15), 40);
        // Candidates below min_lag are not considered
        assert_eq!(correct_octave(&normalized, 40, 30, 21, 0.15), 40);
    }

    #[test]
    fn test_parabolic_interpolation() {
        // Symmetric dip: vertex at the integer lag
        assert_eq!(parabolic_interpolation(&[0.5, 0.1, 0.5], 1), 1.0);
        // Asymmetric dip
        let refined = parabolic_interpolation(&[0.4, 0.1, 0.2], 1);
        assert!((refined - (1.0 + 0.5 * 0.2 / 0.4)).abs() <= 1e-6);
        // Degenerate parabola falls back to the integer lag
        assert_eq!(parabolic_interpolation(&[0.3, 0.3, 0.3], 1), 1.0);
        // Edges fall back to the integer lag
        assert_eq!(parabolic_interpolation(&[0.3, 0.1, 0.3], 0), 0.0);
        assert_eq!(parabolic_interpolation(&[0.3, 0.1, 0.3], 2), 2.0);
    }

    #[test]
    fn test_min_accepted_lag() {
        assert_eq!(min_accepted_lag(44100.0), 22);
        assert_eq!(min_accepted_lag(48000.0), 24);
    }

    #[test]
    fn test_huge_sample_rate_saturates() {
        assert_eq!(ceil_positive(1e30), usize::MAX);
        assert_eq!(ceil_positive(2.5), 3);
        assert_eq!(ceil_positive(3.0), 3);
        // The search range is empty rather than overflowing
        let (tau_min, tau_max) = search_lag_range(1e300, 1024);
        assert_eq!(tau_min, usize::MAX);
        assert!(tau_min > tau_max);
    }
}
