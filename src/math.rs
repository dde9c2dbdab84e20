use itertools::izip;
use multiversion::multiversion;
use num_complex::Complex;
use statrs::function::gamma::gamma;
use std::f64::consts::PI;

/// Normalized sinc, `sin(pi x) / (pi x)` with `sinc(0) = 1`.
#[inline]
pub(crate) fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        return 1.0;
    }
    let px = PI * x;
    px.sin() / px
}

/// Generalized binomial coefficient `gamma(a + 1) / (gamma(b + 1) * gamma(a - b + 1))`.
///
/// Both arguments may be non-integer and the gamma arguments may be negative;
/// the reflection formula inside `statrs` keeps the result finite away from
/// the poles.
#[inline]
pub(crate) fn generalized_binomial(a: f64, b: f64) -> f64 {
    gamma(a + 1.0) / (gamma(b + 1.0) * gamma(a - b + 1.0))
}

/// Whitened spectral power `sum_k |x_k|^2 / psd_k` over all bins.
///
/// Bins with an infinite PSD contribute zero.
#[multiversion(targets("x86_64+avx+avx2+fma", "arm+neon"))]
pub(crate) fn whitened_power(spectrum: &[Complex<f64>], psd: &[f64]) -> f64 {
    let n = spectrum.len();
    assert!(psd.len() == n);

    izip!(spectrum, psd)
        .map(|(x, p)| (x.re * x.re + x.im * x.im) / p)
        .sum()
}
