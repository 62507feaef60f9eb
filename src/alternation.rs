//! Alternation detection
//!
//! Locates work/rest transitions by convolving the smoothed velocity
//! against a step-function matched filter. The filter response peaks where
//! the signal drops from fast to slow (decelerations); its rectified form
//! peaks at transitions of either direction. Peak extraction runs either
//! directly on the response (precise index positions) or on its magnitude
//! spectrum (robust to noise, no temporal localization).
//!
//! Zero-padded convolution reacts to the padding itself: within one window
//! of either signal edge the response carries a step artifact that can
//! dwarf every genuine transition peak. The first and last window of the
//! response are therefore excluded from normalization and peak search;
//! they still provide context for peak width measurement.

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::smoothing::convolve_same;
use crate::stats::mean;
use rustfft::{num_complex::Complex, FftPlanner};

/// Which transition directions the finder reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Fast-to-slow transitions only; the filter response is used as-is.
    Decelerations,
    /// Slow-to-fast transitions only; negative excursions of the
    /// mean-centered signal are clipped to zero before convolution.
    Accelerations,
    /// Both directions, via the rectified filter response.
    Full,
}

/// Peak extraction strategy for the filter response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeakMode {
    /// Local maxima of the response itself: precise positions.
    Direct,
    /// Local maxima of the response's magnitude spectrum: noise-robust,
    /// used as a periodicity pre-check.
    Spectral,
}

/// Step-function matched filter: -1 below the window midpoint, +1 above,
/// 0 at exactly the midpoint.
fn matched_filter(window_width: usize) -> Vec<f64> {
    let mid = window_width as f64 / 2.0;
    (0..window_width)
        .map(|i| {
            let v = i as f64 - mid;
            if v > 0.0 {
                1.0
            } else if v < 0.0 {
                -1.0
            } else {
                0.0
            }
        })
        .collect()
}

/// Find alternation points in a smoothed velocity signal.
///
/// Returns strictly increasing sample indices (direct mode) or frequency
/// bin indices (spectral mode), all at least one window away from either
/// signal edge. An empty result means no transitions were detected; it is
/// not an error. Signals long enough for the filter but too short to have
/// any searchable interior yield an empty result as well.
pub fn find_alternations(
    signal: &[f64],
    config: &AnalysisConfig,
    polarity: Polarity,
    mode: PeakMode,
) -> Result<Vec<usize>, AnalysisError> {
    let window = config.alternation_window;
    let n = signal.len();
    if n < window {
        return Err(AnalysisError::InvalidConfiguration(format!(
            "signal of {n} samples is shorter than the alternation window {window}"
        )));
    }
    // No interior left once the edge margins are excluded.
    if n < 2 * window + 3 {
        return Ok(Vec::new());
    }

    let signal_mean = mean(signal);
    let mut centered: Vec<f64> = signal.iter().map(|v| v - signal_mean).collect();
    if polarity == Polarity::Accelerations {
        for v in centered.iter_mut() {
            *v = v.max(0.0);
        }
    }

    let kernel = matched_filter(window);
    let mut response = convolve_same(&centered, &kernel);

    // Normalize by the peak magnitude of the interior; the edge margins
    // carry zero-padding artifacts and must not set the scale. An all-zero
    // response (constant signal) is left as-is to avoid dividing by zero.
    let max_abs = response[window..n - window]
        .iter()
        .fold(0.0f64, |acc, v| acc.max(v.abs()));
    if max_abs > 0.0 {
        for v in response.iter_mut() {
            *v /= max_abs;
        }
    }
    if polarity == Polarity::Full {
        for v in response.iter_mut() {
            *v = v.abs();
        }
    }

    let peaks = match mode {
        PeakMode::Direct => {
            // Rectified responses carry peaks of both directions, so they
            // arrive at twice the rate and are half as wide.
            let min_width = if polarity == Polarity::Full {
                (config.direct_peak_min_width / 2).max(1)
            } else {
                config.direct_peak_min_width
            };
            // Widths are measured on the full response so peaks near the
            // margin keep their real neighborhood; only the positions are
            // restricted to the interior.
            direct_peaks(&response, config.direct_peak_height, min_width)
                .into_iter()
                .filter(|&p| p >= window && p < n - window)
                .collect()
        }
        PeakMode::Spectral => {
            let spectrum = magnitude_spectrum(&response[window..n - window]);
            direct_peaks(&spectrum, config.spectral_peak_height, 1)
        }
    };
    Ok(peaks)
}

/// Classify a signal as periodic: true iff the spectral alternation search
/// finds at least two peaks. A single peak is indistinguishable from
/// generic noise; two or more establish a repeating pattern. Signals
/// shorter than the alternation window are treated as non-periodic.
///
/// The check runs in acceleration polarity: clipping the negative
/// excursions keeps a warmup/cooldown level shift from dominating the
/// response normalization and masking the repetition band.
pub fn is_periodic(signal: &[f64], config: &AnalysisConfig) -> bool {
    if signal.len() < config.alternation_window {
        return false;
    }
    find_alternations(signal, config, Polarity::Accelerations, PeakMode::Spectral)
        .map(|peaks| peaks.len() >= 2)
        .unwrap_or(false)
}

/// Local maxima above `height` whose width at half prominence is at least
/// `min_width` samples. Plateaus count once, at their center.
fn direct_peaks(values: &[f64], height: f64, min_width: usize) -> Vec<usize> {
    let n = values.len();
    let mut peaks = Vec::new();
    if n < 3 {
        return peaks;
    }
    let mut i = 1;
    while i < n - 1 {
        if values[i] > values[i - 1] {
            // Extend over a possible plateau.
            let mut j = i;
            while j + 1 < n && values[j + 1] == values[j] {
                j += 1;
            }
            if j + 1 < n && values[j + 1] < values[i] {
                let peak = (i + j) / 2;
                if values[peak] >= height && peak_width(values, peak) >= min_width {
                    peaks.push(peak);
                }
            }
            i = j + 1;
        } else {
            i += 1;
        }
    }
    peaks
}

/// Number of contiguous samples around `peak` above half its prominence.
///
/// Bases are the lowest values between the peak and the nearest strictly
/// higher sample (or the signal edge) on each side; the evaluation height
/// sits halfway between the peak and the higher of the two bases. Matches
/// the convention of scipy's peak width measurement.
fn peak_width(values: &[f64], peak: usize) -> usize {
    let peak_value = values[peak];

    let mut left_base = peak_value;
    let mut i = peak;
    while i > 0 && values[i - 1] <= peak_value {
        i -= 1;
        left_base = left_base.min(values[i]);
    }
    let mut right_base = peak_value;
    let mut i = peak;
    while i + 1 < values.len() && values[i + 1] <= peak_value {
        i += 1;
        right_base = right_base.min(values[i]);
    }

    let half = (peak_value + left_base.max(right_base)) / 2.0;
    let mut left = peak;
    while left > 0 && values[left - 1] > half {
        left -= 1;
    }
    let mut right = peak;
    while right + 1 < values.len() && values[right + 1] > half {
        right += 1;
    }
    right - left + 1
}

/// Centered magnitude spectrum of a real signal, normalized by length.
fn magnitude_spectrum(signal: &[f64]) -> Vec<f64> {
    let n = signal.len();
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);
    let mut buffer: Vec<Complex<f64>> = signal.iter().map(|&v| Complex::new(v, 0.0)).collect();
    fft.process(&mut buffer);

    let mut magnitudes: Vec<f64> = buffer.iter().map(|c| c.norm() / n as f64).collect();
    // Center the zero-frequency bin so the spectrum is symmetric.
    magnitudes.rotate_right(n / 2);
    magnitudes
}
