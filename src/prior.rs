use rand::Rng;

use crate::delay::DelayPair;

/// Flat prior over the closed box `[low, high]` in each delay coordinate.
///
/// Degenerate bounds are caught by settings validation before a chain is
/// built; an inverted box here would simply contain nothing.
#[derive(Debug, Clone, Copy)]
pub struct BoxPrior {
    low: f64,
    high: f64,
}

impl BoxPrior {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    /// Both coordinates inside the closed interval, edges included.
    pub fn contains(&self, delays: DelayPair) -> bool {
        delays.l1 >= self.low
            && delays.l1 <= self.high
            && delays.l2 >= self.low
            && delays.l2 <= self.high
    }

    /// Log of the unnormalized indicator: `0.0` inside the box, negative
    /// infinity outside.
    pub fn log_density(&self, delays: DelayPair) -> f64 {
        if self.contains(delays) {
            0.0
        } else {
            f64::NEG_INFINITY
        }
    }

    /// Uniform draw from the box.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> DelayPair {
        DelayPair::new(
            rng.random_range(self.low..self.high),
            rng.random_range(self.low..self.high),
        )
    }
}
