//! Shared FFT plans for spectra and linear convolution.

use std::sync::Arc;

use num_complex::Complex;
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};

/// Plans for one signal length: the orthonormal half spectrum of the raw
/// length, and the zero-padded pair used for linear convolution.
pub(crate) struct FftPlans {
    len: usize,
    conv_len: usize,
    forward: Arc<dyn RealToComplex<f64>>,
    conv_forward: Arc<dyn RealToComplex<f64>>,
    conv_inverse: Arc<dyn ComplexToReal<f64>>,
}

impl FftPlans {
    pub(crate) fn new(len: usize) -> Self {
        let conv_len = (2 * len - 1).next_power_of_two();
        let mut planner = RealFftPlanner::new();
        Self {
            len,
            conv_len,
            forward: planner.plan_fft_forward(len),
            conv_forward: planner.plan_fft_forward(conv_len),
            conv_inverse: planner.plan_fft_inverse(conv_len),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Orthonormal half spectrum of `signal`, scaled by `1 / sqrt(len)`.
    pub(crate) fn rfft_ortho(&self, signal: &[f64]) -> Vec<Complex<f64>> {
        assert!(signal.len() == self.len);

        let mut input = signal.to_vec();
        let mut spectrum = self.forward.make_output_vec();
        self.forward
            .process(&mut input, &mut spectrum)
            .expect("buffer lengths match the forward plan");

        let scale = 1.0 / (self.len as f64).sqrt();
        for value in spectrum.iter_mut() {
            *value *= scale;
        }
        spectrum
    }

    /// Linear convolution of `signal` with `kernel`, cropped to the central
    /// `len` samples ("same" mode).
    pub(crate) fn convolve_same(&self, signal: &[f64], kernel: &[f64]) -> Vec<f64> {
        assert!(signal.len() == self.len);
        assert!(kernel.len() == self.len);

        let mut padded_signal = vec![0.0; self.conv_len];
        padded_signal[..self.len].copy_from_slice(signal);
        let mut padded_kernel = vec![0.0; self.conv_len];
        padded_kernel[..self.len].copy_from_slice(kernel);

        let mut product = self.conv_forward.make_output_vec();
        let mut kernel_spectrum = self.conv_forward.make_output_vec();
        self.conv_forward
            .process(&mut padded_signal, &mut product)
            .expect("buffer lengths match the convolution plan");
        self.conv_forward
            .process(&mut padded_kernel, &mut kernel_spectrum)
            .expect("buffer lengths match the convolution plan");

        for (s, k) in product.iter_mut().zip(&kernel_spectrum) {
            *s = *s * *k;
        }
        // The inverse transform requires exactly real DC and Nyquist bins.
        product[0].im = 0.0;
        if self.conv_len % 2 == 0 {
            let last = product.len() - 1;
            product[last].im = 0.0;
        }

        let mut full = vec![0.0; self.conv_len];
        self.conv_inverse
            .process(&mut product, &mut full)
            .expect("buffer lengths match the convolution plan");

        let scale = 1.0 / self.conv_len as f64;
        let start = (self.len - 1) / 2;
        full[start..start + self.len]
            .iter()
            .map(|value| value * scale)
            .collect()
    }
}
