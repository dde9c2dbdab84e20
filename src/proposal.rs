//! The cyclic three-mode proposal family of the chain.
//!
//! Iterations rotate deterministically through a fine correlated Gaussian
//! step, a coarse correlated Gaussian step and an independent uniform draw
//! over the prior box. The rotation does not depend on accept decisions, so
//! every third iteration can escape a local mode regardless of history.

use std::f64::consts::PI;

use rand::Rng;
use rand_distr::StandardNormal;

use crate::config::ProposalStepSettings;
use crate::delay::DelayPair;

/// Which of the three proposal distributions an iteration uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalMode {
    Small,
    Large,
    Uniform,
}

impl ProposalMode {
    /// Successor in the fixed Small -> Large -> Uniform rotation.
    pub fn next(self) -> Self {
        match self {
            ProposalMode::Small => ProposalMode::Large,
            ProposalMode::Large => ProposalMode::Uniform,
            ProposalMode::Uniform => ProposalMode::Small,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            ProposalMode::Small => 0,
            ProposalMode::Large => 1,
            ProposalMode::Uniform => 2,
        }
    }
}

/// Rotates through the modes, one step per iteration, starting from Small.
#[derive(Debug, Clone, Copy)]
pub struct ProposalCycle {
    next: ProposalMode,
}

impl ProposalCycle {
    pub fn new() -> Self {
        Self {
            next: ProposalMode::Small,
        }
    }

    /// Mode to use for this iteration; advances the rotation.
    pub fn advance(&mut self) -> ProposalMode {
        let mode = self.next;
        self.next = mode.next();
        mode
    }
}

impl Default for ProposalCycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Correlated Gaussian step with the same scale in both coordinates.
#[derive(Debug, Clone, Copy)]
struct GaussianStep {
    scale: f64,
    correlation: f64,
}

impl GaussianStep {
    fn of(settings: ProposalStepSettings) -> Self {
        Self {
            scale: settings.scale,
            correlation: settings.correlation,
        }
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R, center: DelayPair) -> DelayPair {
        let u: f64 = rng.sample(StandardNormal);
        let v: f64 = rng.sample(StandardNormal);
        let tangent = (1.0 - self.correlation * self.correlation).sqrt();
        DelayPair::new(
            center.l1 + self.scale * u,
            center.l2 + self.scale * (self.correlation * u + tangent * v),
        )
    }

    fn log_density(&self, target: DelayPair, center: DelayPair) -> f64 {
        let r2 = 1.0 - self.correlation * self.correlation;
        let dx = (target.l1 - center.l1) / self.scale;
        let dy = (target.l2 - center.l2) / self.scale;
        let quad = (dx * dx - 2.0 * self.correlation * dx * dy + dy * dy) / r2;
        -(2.0 * PI).ln() - (self.scale * self.scale).ln() - 0.5 * r2.ln() - 0.5 * quad
    }
}

/// The three proposal distributions and their density evaluator.
pub struct ProposalScheme {
    small: GaussianStep,
    large: GaussianStep,
    low: f64,
    high: f64,
}

impl ProposalScheme {
    /// Assumes validated step settings and bounds.
    pub fn new(
        small: ProposalStepSettings,
        large: ProposalStepSettings,
        low: f64,
        high: f64,
    ) -> Self {
        Self {
            small: GaussianStep::of(small),
            large: GaussianStep::of(large),
            low,
            high,
        }
    }

    /// Draw a proposal from `mode` around `current`. The uniform mode
    /// ignores `current` entirely.
    pub fn draw<R: Rng + ?Sized>(
        &self,
        mode: ProposalMode,
        rng: &mut R,
        current: DelayPair,
    ) -> DelayPair {
        match mode {
            ProposalMode::Small => self.small.draw(rng, current),
            ProposalMode::Large => self.large.draw(rng, current),
            ProposalMode::Uniform => DelayPair::new(
                rng.random_range(self.low..self.high),
                rng.random_range(self.low..self.high),
            ),
        }
    }

    /// Log density of drawing `target` from `mode` centered at `given`.
    ///
    /// The uniform mode reports zero instead of the normalized box density;
    /// the constant cancels between the two sides of the acceptance ratio.
    pub fn log_density(&self, mode: ProposalMode, target: DelayPair, given: DelayPair) -> f64 {
        match mode {
            ProposalMode::Small => self.small.log_density(target, given),
            ProposalMode::Large => self.large.log_density(target, given),
            ProposalMode::Uniform => 0.0,
        }
    }
}
