//! Arm delay parameters and their decomposition into filter coordinates.

/// The two arm light travel times, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayPair {
    pub l1: f64,
    pub l2: f64,
}

impl DelayPair {
    pub fn new(l1: f64, l2: f64) -> Self {
        Self { l1, l2 }
    }

    /// Round trip delay of each arm expressed in samples, `2 * L * f_s`.
    pub fn round_trip_samples(&self, sample_rate: f64) -> (f64, f64) {
        (
            2.0 * self.l1 * sample_rate,
            2.0 * self.l2 * sample_rate,
        )
    }
}

/// A real-valued sample delay split into an integer shift and a fractional
/// remainder in `[0, 1)`.
///
/// Euclidean division keeps the remainder nonnegative for negative delays,
/// so `integer + fraction` always reconstructs the input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayDecomposition {
    pub integer: i64,
    pub fraction: f64,
}

impl DelayDecomposition {
    pub fn of(samples: f64) -> Self {
        let integer = samples.div_euclid(1.0) as i64;
        let fraction = samples.rem_euclid(1.0);
        // rem_euclid rounds up to exactly 1.0 just below an integer.
        if fraction == 1.0 {
            return Self {
                integer: integer + 1,
                fraction: 0.0,
            };
        }
        Self { integer, fraction }
    }
}
