//! Velocity smoothing
//!
//! Denoises the raw velocity sequence with a centered, unit-gain moving
//! average before any detection stage runs. Convolution uses zero-padded
//! "same" semantics, so the first and last samples are systematically
//! under-weighted by real data and should be treated as lower-confidence.

use crate::error::AnalysisError;

/// Zero-padded convolution returning the centered `signal.len()` slice of
/// the full convolution (numpy `mode='same'`). Requires
/// `signal.len() >= kernel.len()`.
pub(crate) fn convolve_same(signal: &[f64], kernel: &[f64]) -> Vec<f64> {
    let n = signal.len();
    let w = kernel.len();
    let offset = (w - 1) / 2;
    let mut out = vec![0.0; n];
    for (i, slot) in out.iter_mut().enumerate() {
        let k = i + offset;
        // full[k] = sum over j of signal[j] * kernel[k - j]
        let j_lo = k.saturating_sub(w - 1);
        let j_hi = k.min(n - 1);
        let mut acc = 0.0;
        for j in j_lo..=j_hi {
            acc += signal[j] * kernel[k - j];
        }
        *slot = acc;
    }
    out
}

/// Build the tapered averaging kernel: `width` taps with the outer
/// `edge_taper` taps zeroed at each end, normalized to unit gain.
fn averaging_kernel(width: usize, edge_taper: usize) -> Vec<f64> {
    let support = width - 2 * edge_taper;
    let weight = 1.0 / support as f64;
    let mut kernel = vec![0.0; width];
    for tap in kernel.iter_mut().take(width - edge_taper).skip(edge_taper) {
        *tap = weight;
    }
    kernel
}

/// Smooth a velocity sequence with a centered tapered moving average.
///
/// Output has the same length as the input. Fails with
/// `InvalidConfiguration` when the kernel is as wide as the signal or the
/// taper consumes the whole kernel.
pub fn smooth(
    velocity: &[f64],
    kernel_width: usize,
    edge_taper: usize,
) -> Result<Vec<f64>, AnalysisError> {
    if kernel_width <= 2 * edge_taper {
        return Err(AnalysisError::InvalidConfiguration(format!(
            "kernel_width {kernel_width} leaves no support after tapering {edge_taper} samples per edge"
        )));
    }
    if kernel_width >= velocity.len() {
        return Err(AnalysisError::InvalidConfiguration(format!(
            "kernel_width {} must be narrower than the signal ({} samples)",
            kernel_width,
            velocity.len()
        )));
    }
    let kernel = averaging_kernel(kernel_width, edge_taper);
    Ok(convolve_same(velocity, &kernel))
}
