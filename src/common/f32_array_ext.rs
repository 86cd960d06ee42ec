//! `[f32]` extensions.

use micromath::F32Ext;

/// `[f32]` extensions.
pub trait F32ArrayExt {
    /// Returns the mean of the squared sample values, i.e the average power.
    /// An empty slice has a mean square of zero.
    fn mean_square(&self) -> f32;
    /// Returns the maximum absolute value.
    fn peak_level(&self) -> f32;
    /// Returns the [root mean square](https://en.wikipedia.org/wiki/Root_mean_square)
    /// level.
    fn rms_level(&self) -> f32;
    /// Returns the [root mean square](https://en.wikipedia.org/wiki/Root_mean_square)
    /// level in dB relative to 1, i.e 0 dB corresponds to a level of 1.
    fn rms_level_db(&self) -> f32;
}

impl F32ArrayExt for [f32] {
    fn mean_square(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let mut sum: f32 = 0.0;
        for sample in self.iter() {
            sum += sample * sample
        }
        sum / (self.len() as f32)
    }

    fn peak_level(&self) -> f32 {
        let mut max: f32 = 0.0;
        for sample in self.iter() {
            let value = F32Ext::abs(*sample);
            if value > max {
                max = value
            }
        }
        max
    }

    fn rms_level(&self) -> f32 {
        F32Ext::sqrt(self.mean_square())
    }

    fn rms_level_db(&self) -> f32 {
        20. * F32Ext::log10(self.rms_level())
    }
}
