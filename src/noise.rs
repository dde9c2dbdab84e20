//! Analytic model of the secondary noises entering the combination.
//!
//! Two stationary contributions: optical metrology noise, flat with a
//! low-frequency relaxation, and acceleration noise shaped by the usual
//! low- and high-frequency corners. Both are referred to fractional arm
//! length, so the PSD diverges at DC and any whitened statistic ignores
//! the DC bin.

use std::f64::consts::PI;

/// Optical metrology noise amplitude, m / sqrt(Hz).
const OMS_LEVEL: f64 = 1.5e-11;
/// Acceleration noise amplitude, m s^-2 / sqrt(Hz).
const ACC_LEVEL: f64 = 3.0e-15;
/// Relaxation corner of the metrology noise, Hz.
const OMS_CORNER: f64 = 2.0e-3;
/// Low-frequency corner of the acceleration noise, Hz.
const ACC_LOW_CORNER: f64 = 0.4e-3;
/// High-frequency corner of the acceleration noise, Hz.
const ACC_HIGH_CORNER: f64 = 8.0e-3;

/// Secondary noise PSD for a nominal arm length.
#[derive(Debug, Clone, Copy)]
pub struct NoiseModel {
    arm_length: f64,
    transfer_frequency: f64,
}

impl NoiseModel {
    pub fn new(arm_length: f64, light_speed: f64) -> Self {
        Self {
            arm_length,
            transfer_frequency: light_speed / (2.0 * PI * arm_length),
        }
    }

    /// One-sided PSD at frequency `freq` in Hz. Infinite at DC.
    pub fn psd(&self, freq: f64) -> f64 {
        let oms = OMS_LEVEL.powi(2) * (1.0 + (OMS_CORNER / freq).powi(4));
        let acc = ACC_LEVEL.powi(2)
            * (1.0 + (ACC_LOW_CORNER / freq).powi(2))
            * (1.0 + (freq / ACC_HIGH_CORNER).powi(4));
        let arm2 = self.arm_length * self.arm_length;
        oms / arm2
            + 2.0 * (1.0 + (freq / self.transfer_frequency).cos().powi(2)) * acc
                / ((2.0 * PI * freq).powi(4) * arm2)
    }

    /// PSD evaluated on the half-spectrum frequency grid of `len` samples
    /// taken at `sample_rate`.
    pub fn grid(&self, len: usize, sample_rate: f64) -> Vec<f64> {
        (0..=len / 2)
            .map(|k| self.psd(k as f64 * sample_rate / len as f64))
            .collect()
    }
}
