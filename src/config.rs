//! Run configuration and the fail-fast validation applied before a chain
//! starts.

use thiserror::Error;

/// Speed of light in vacuum, m/s.
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Errors raised while validating a run setup.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RangingError {
    #[error("Kernel order must be odd, got {order}")]
    EvenKernelOrder { order: usize },
    #[error("Sample rate must be positive and finite, got {rate}")]
    InvalidSampleRate { rate: f64 },
    #[error("Prior bounds must be finite with low < high, got [{low}, {high}]")]
    InvalidPriorBounds { low: f64, high: f64 },
    #[error("Arm length must be positive and finite, got {length}")]
    InvalidArmLength { length: f64 },
    #[error("Light speed must be positive and finite, got {speed}")]
    InvalidLightSpeed { speed: f64 },
    #[error("Proposal step must have positive scale and correlation in (-1, 1), got scale {scale} and correlation {correlation}")]
    InvalidProposalStep { scale: f64, correlation: f64 },
    #[error("Measurement channels differ in length: {len_1} vs {len_2}")]
    ChannelMismatch { len_1: usize, len_2: usize },
    #[error("Measurement channels are empty")]
    EmptyChannels,
}

pub type Result<T> = std::result::Result<T, RangingError>;

/// Window applied to the shifted sinc when building a delay kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KernelWindow {
    /// Maximally flat at low frequencies. The usual choice for ranging.
    #[default]
    Lagrange,
    /// Classic three-term cosine window with lower sidelobes.
    Blackman,
}

/// Scale and correlation of one Gaussian proposal mode.
#[derive(Debug, Clone, Copy)]
pub struct ProposalStepSettings {
    /// Standard deviation of the step in each delay coordinate, in seconds.
    pub scale: f64,
    /// Correlation between the two coordinates of the step.
    pub correlation: f64,
}

impl ProposalStepSettings {
    fn validate(&self) -> Result<()> {
        if !(self.scale > 0.0 && self.scale.is_finite() && self.correlation.abs() < 1.0) {
            return Err(RangingError::InvalidProposalStep {
                scale: self.scale,
                correlation: self.correlation,
            });
        }
        Ok(())
    }
}

/// Settings for a ranging run.
#[derive(Debug, Clone, Copy)]
pub struct RangingSettings {
    /// Number of taps of the fractional delay kernel. Must be odd.
    pub kernel_order: usize,
    /// Window shaping the kernel taps.
    pub window: KernelWindow,
    /// Sample rate of the measurement channels, Hz.
    pub sample_rate: f64,
    /// Lower edge of the flat prior box on each delay, seconds.
    pub prior_low: f64,
    /// Upper edge of the flat prior box on each delay, seconds.
    pub prior_high: f64,
    /// Nominal arm length used by the noise model, meters.
    pub arm_length: f64,
    /// Light speed used by the noise model, m/s.
    pub light_speed: f64,
    /// Number of Metropolis iterations after the seed state.
    pub num_iterations: u64,
    /// Fine exploration step, applied every third iteration.
    pub small_step: ProposalStepSettings,
    /// Coarse exploration step, applied every third iteration.
    pub large_step: ProposalStepSettings,
    /// Seed of the chain's random generator.
    pub seed: u64,
}

impl Default for RangingSettings {
    fn default() -> Self {
        Self {
            kernel_order: 31,
            window: KernelWindow::default(),
            sample_rate: 1.0,
            prior_low: 8.3,
            prior_high: 8.4,
            arm_length: 2.5e9,
            light_speed: SPEED_OF_LIGHT,
            num_iterations: 10_000,
            small_step: ProposalStepSettings {
                scale: 1.0 / SPEED_OF_LIGHT,
                correlation: 0.99,
            },
            large_step: ProposalStepSettings {
                scale: 0.1,
                correlation: 0.99,
            },
            seed: 0,
        }
    }
}

impl RangingSettings {
    /// Check every field before any signal processing happens.
    pub fn validate(&self) -> Result<()> {
        if self.kernel_order % 2 == 0 {
            return Err(RangingError::EvenKernelOrder {
                order: self.kernel_order,
            });
        }
        if !(self.sample_rate > 0.0 && self.sample_rate.is_finite()) {
            return Err(RangingError::InvalidSampleRate {
                rate: self.sample_rate,
            });
        }
        if !(self.prior_low.is_finite()
            && self.prior_high.is_finite()
            && self.prior_low < self.prior_high)
        {
            return Err(RangingError::InvalidPriorBounds {
                low: self.prior_low,
                high: self.prior_high,
            });
        }
        if !(self.arm_length > 0.0 && self.arm_length.is_finite()) {
            return Err(RangingError::InvalidArmLength {
                length: self.arm_length,
            });
        }
        if !(self.light_speed > 0.0 && self.light_speed.is_finite()) {
            return Err(RangingError::InvalidLightSpeed {
                speed: self.light_speed,
            });
        }
        self.small_step.validate()?;
        self.large_step.validate()?;
        Ok(())
    }
}
