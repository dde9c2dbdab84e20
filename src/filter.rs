//! Fractional delay FIR kernels on the signal-length grid.
//!
//! A kernel is an all-zero vector of the signal length carrying one window
//! of `order` taps. Convolving a channel with it (in "same" mode) shifts the
//! channel by the integer part of the delay and interpolates the fractional
//! remainder.

use crate::config::KernelWindow;
use crate::delay::DelayDecomposition;
use crate::math::{generalized_binomial, sinc};
use std::f64::consts::PI;

/// Build the kernel realizing `delay` on signals of `len` samples.
///
/// The grid value at index `j` is `j - len / 2`. Taps are placed where the
/// shifted coordinate `m = grid(j) - delay.integer + 1` falls inside
/// `[-(order - 1) / 2, (order - 1) / 2]`; everything else stays zero. A
/// zero fraction places a single unit tap instead of evaluating the
/// window. A window pushed entirely off the grid yields the all-zero
/// kernel, which degenerates the delayed channel to zero downstream.
/// `order` must be odd.
pub fn delay_kernel(
    len: usize,
    delay: DelayDecomposition,
    order: usize,
    window: KernelWindow,
) -> Vec<f64> {
    assert!(order % 2 == 1, "kernel order must be odd");

    let mut kernel = vec![0.0; len];
    let center = (len / 2) as i64;

    // An integer delay is a pure index shift. The windowed weights have a
    // removable singularity at zero fraction and evaluate to the wrong
    // sign there, so place the unit tap directly.
    if delay.fraction == 0.0 {
        let tap = center + delay.integer - 1;
        if tap >= 0 && tap < len as i64 {
            kernel[tap as usize] = 1.0;
        }
        return kernel;
    }

    let half = ((order - 1) / 2) as i64;
    let first = center + delay.integer - 1 - half;
    let last = center + delay.integer - 1 + half;
    let lo = first.max(0);
    let hi = last.min(len as i64 - 1);

    for j in lo..=hi {
        let m = (j - center - delay.integer + 1) as f64;
        kernel[j as usize] = tap_weight(m, order, delay.fraction, window);
    }
    kernel
}

fn tap_weight(m: f64, order: usize, fraction: f64, window: KernelWindow) -> f64 {
    let gain = match window {
        KernelWindow::Lagrange => lagrange_gain(m, order, fraction),
        KernelWindow::Blackman => blackman_gain(m, order, fraction),
    };
    gain * sinc(m - fraction)
}

/// Lagrange window evaluated at tap coordinate `m`.
///
/// Multiplied with the shifted sinc this reproduces the classic Lagrange
/// interpolation coefficients, so the in-grid taps sum to one.
fn lagrange_gain(m: f64, order: usize, fraction: f64) -> f64 {
    let n = order as f64;
    let t = 0.5 * (n - 1.0) + fraction;
    PI * n / (PI * t).sin()
        * generalized_binomial(t, n)
        * generalized_binomial(n - 1.0, m + 0.5 * (n - 1.0))
}

fn blackman_gain(m: f64, order: usize, fraction: f64) -> f64 {
    let n = order as f64;
    let phase = PI * (fraction - m) / (n - 1.0);
    0.42 + 0.5 * (2.0 * phase).cos() + 0.08 * (4.0 * phase).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn decomposed(samples: f64) -> DelayDecomposition {
        DelayDecomposition::of(samples)
    }

    #[test]
    fn integer_delay_gives_unit_tap() {
        let len = 64;
        let kernel = delay_kernel(len, decomposed(6.0), 31, KernelWindow::Lagrange);
        let peak = len / 2 + 6 - 1;
        assert_abs_diff_eq!(kernel[peak], 1.0, epsilon = 1e-8);
        for (j, tap) in kernel.iter().enumerate() {
            if j != peak {
                assert!(tap.abs() < 1e-8, "tap {j} = {tap}");
            }
        }
    }

    #[test]
    fn taps_stay_inside_the_window() {
        let len = 128;
        let order = 31;
        let delay = decomposed(10.4);
        let kernel = delay_kernel(len, delay, order, KernelWindow::Lagrange);
        let center = (len / 2) as i64;
        let half = ((order - 1) / 2) as i64;
        for (j, tap) in kernel.iter().enumerate() {
            let m = j as i64 - center - delay.integer + 1;
            if m < -half || m > half {
                assert_eq!(*tap, 0.0, "tap {j} outside the window is {tap}");
            }
        }
        assert!(kernel.iter().any(|tap| tap.abs() > 1e-3));
    }

    #[test]
    fn integer_delays_are_exact_shifts() {
        // The windowed formula sits on a pole at zero fraction; the kernel
        // must be the limit value, a positive unit tap at the shifted
        // center, not the pole's sign-flipped evaluation.
        let len = 64;
        for integer in [-5i64, 0, 1, 6, 17] {
            for order in [3, 31] {
                let kernel =
                    delay_kernel(len, decomposed(integer as f64), order, KernelWindow::Lagrange);
                let tap = (len as i64 / 2 + integer - 1) as usize;
                for (j, value) in kernel.iter().enumerate() {
                    let expected = if j == tap { 1.0 } else { 0.0 };
                    assert_eq!(*value, expected, "integer {integer} order {order} tap {j}");
                }
            }
        }
    }

    #[test]
    fn window_off_the_grid_yields_zero_kernel() {
        for samples in [1.0e6, 1.0e6 + 0.25, -1.0e6, -1.0e6 - 0.25] {
            let kernel = delay_kernel(64, decomposed(samples), 31, KernelWindow::Lagrange);
            assert!(kernel.iter().all(|tap| *tap == 0.0), "delay {samples}");
        }
    }

    #[test]
    fn order_three_matches_closed_form_lagrange() {
        // On the grid {-1, 0, 1} the interpolation weights at offset f are
        // f(f - 1)/2, 1 - f^2 and f(f + 1)/2.
        let len = 32;
        let f = 0.37;
        let kernel = delay_kernel(len, decomposed(4.0 + f), 3, KernelWindow::Lagrange);
        let base = len / 2 + 4 - 1;
        assert_abs_diff_eq!(kernel[base - 1], f * (f - 1.0) / 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(kernel[base], 1.0 - f * f, epsilon = 1e-9);
        assert_abs_diff_eq!(kernel[base + 1], f * (f + 1.0) / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn in_grid_taps_sum_to_one() {
        for f in [0.1, 0.37, 0.5, 0.93] {
            let kernel = delay_kernel(256, decomposed(20.0 + f), 31, KernelWindow::Lagrange);
            let sum: f64 = kernel.iter().sum();
            assert!((sum - 1.0).abs() < 1e-6, "sum at fraction {f} is {sum}");
        }
    }

    #[test]
    fn blackman_integer_delay_is_a_unit_tap() {
        // Zero fraction takes the exact shift path for either window.
        let len = 64;
        let kernel = delay_kernel(len, decomposed(6.0), 31, KernelWindow::Blackman);
        let peak = len / 2 + 6 - 1;
        assert_eq!(kernel[peak], 1.0);
        for (j, tap) in kernel.iter().enumerate() {
            if j != peak {
                assert_eq!(*tap, 0.0, "tap {j} = {tap}");
            }
        }
    }

    #[test]
    fn blackman_taps_are_finite_and_windowed() {
        let len = 128;
        let order = 31;
        let delay = decomposed(12.7);
        let kernel = delay_kernel(len, delay, order, KernelWindow::Blackman);
        assert!(kernel.iter().all(|tap| tap.is_finite()));
        let center = (len / 2) as i64;
        let half = ((order - 1) / 2) as i64;
        for (j, tap) in kernel.iter().enumerate() {
            let m = j as i64 - center - delay.integer + 1;
            if m < -half || m > half {
                assert_eq!(*tap, 0.0);
            }
        }
    }
}
