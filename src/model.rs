//! Forward model: residual combination, its spectrum and the likelihood.

use itertools::izip;
use num_complex::Complex;

use crate::config::{RangingSettings, Result};
use crate::data::TdiData;
use crate::delay::{DelayDecomposition, DelayPair};
use crate::fft::FftPlans;
use crate::filter::delay_kernel;
use crate::math::whitened_power;
use crate::noise::NoiseModel;

/// Scores a pair of arm delays against the loaded channels.
///
/// Construction validates settings and data once; scoring is then pure and
/// reusable from any chain.
pub struct XComboModel {
    data: TdiData,
    settings: RangingSettings,
    plans: FftPlans,
    noise_psd: Vec<f64>,
}

impl XComboModel {
    pub fn new(data: TdiData, settings: RangingSettings) -> Result<Self> {
        settings.validate()?;
        let plans = FftPlans::new(data.len());
        let noise_psd = NoiseModel::new(settings.arm_length, settings.light_speed)
            .grid(data.len(), settings.sample_rate);
        Ok(Self {
            data,
            settings,
            plans,
            noise_psd,
        })
    }

    pub fn settings(&self) -> &RangingSettings {
        &self.settings
    }

    pub fn data(&self) -> &TdiData {
        &self.data
    }

    /// Noise PSD on the half-spectrum grid the likelihood whitens with.
    pub fn noise_psd(&self) -> &[f64] {
        &self.noise_psd
    }

    /// Residual combination for the hypothesis `delays`.
    ///
    /// Each channel is convolved with the kernel carrying the round trip of
    /// the opposite arm, then combined as
    /// `delayed(ch2) - ch2 - delayed(ch1) + ch1`. Laser noise common to both
    /// channels cancels at the true delays.
    pub fn residual(&self, delays: DelayPair) -> Vec<f64> {
        let len = self.plans.len();
        let order = self.settings.kernel_order;
        let window = self.settings.window;
        let (d1, d2) = delays.round_trip_samples(self.settings.sample_rate);

        let kernel_for_ch2 = delay_kernel(len, DelayDecomposition::of(d1), order, window);
        let kernel_for_ch1 = delay_kernel(len, DelayDecomposition::of(d2), order, window);
        let delayed_2 = self.plans.convolve_same(self.data.channel_2(), &kernel_for_ch2);
        let delayed_1 = self.plans.convolve_same(self.data.channel_1(), &kernel_for_ch1);

        izip!(
            delayed_2,
            self.data.channel_2(),
            delayed_1,
            self.data.channel_1()
        )
        .map(|(d2s, c2, d1s, c1)| d2s - c2 - d1s + c1)
        .collect()
    }

    /// Orthonormal half spectrum of the residual.
    pub fn spectrum(&self, delays: DelayPair) -> Vec<Complex<f64>> {
        self.plans.rfft_ortho(&self.residual(delays))
    }

    /// Gaussian log likelihood, `-0.5 * sum_k |X_k|^2 / PSD_k` over the half
    /// spectrum. The diverging DC bin of the PSD drops out of the sum.
    pub fn log_likelihood(&self, delays: DelayPair) -> f64 {
        -0.5 * whitened_power(&self.spectrum(delays), &self.noise_psd)
    }
}
