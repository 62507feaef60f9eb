//! Analysis configuration
//!
//! All tuning knobs for the pipeline live here instead of as free-floating
//! module constants. Every entry point takes a reference to this struct;
//! the defaults reproduce the behavior of the canonical analysis.

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};

/// Configuration for activity analysis.
///
/// Thresholds assume roughly uniform per-sample spacing (about one sample
/// per second for typical activity streams).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Width of the velocity smoothing kernel in samples.
    pub kernel_width: usize,

    /// Number of taps zeroed at each end of the smoothing kernel.
    /// Tapering keeps the strongest weights away from the kernel edges.
    pub edge_taper: usize,

    /// Width of the matched-filter window used for alternation detection.
    pub alternation_window: usize,

    /// Minimum height (of the max-normalized response) for a direct-mode peak.
    pub direct_peak_height: f64,

    /// Minimum peak width in samples at half prominence, direct mode.
    /// Rectified (both-polarity) responses use half this floor since their
    /// peaks arrive at twice the rate.
    pub direct_peak_min_width: usize,

    /// Minimum magnitude for a frequency-domain peak, spectral mode.
    pub spectral_peak_height: f64,

    /// Penalty per change point for PELT segmentation.
    /// Higher values yield fewer, longer segments.
    pub segment_penalty: f64,

    /// Width of the coarse envelope used as segmentation input.
    /// Must exceed the repetition period so change points land on workout
    /// block boundaries rather than on individual work/rest plateaus.
    pub envelope_width: usize,

    /// Minimum number of alternation pairs for a segment to count as an
    /// interval block.
    pub min_segment_pairs: usize,

    /// Maximum spread in meters between consecutive repetition distances
    /// for the repetitions to be considered part of the same block.
    pub distance_tolerance_m: f64,

    /// Guard term for the speed-to-pace division.
    pub pace_epsilon: f64,

    /// Decimal places for distance and pace fields of a summary.
    pub decimals: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            kernel_width: 50,
            edge_taper: 5,
            alternation_window: 100,
            direct_peak_height: 0.5,
            direct_peak_min_width: 20,
            spectral_peak_height: 0.075,
            segment_penalty: 10.0,
            envelope_width: 200,
            min_segment_pairs: 2,
            distance_tolerance_m: 100.0,
            pace_epsilon: 0.001,
            decimals: 3,
        }
    }
}

impl AnalysisConfig {
    /// Check internal consistency of the configuration.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.kernel_width <= 2 * self.edge_taper {
            return Err(AnalysisError::InvalidConfiguration(format!(
                "kernel_width {} leaves no support after tapering {} samples per edge",
                self.kernel_width, self.edge_taper
            )));
        }
        if self.envelope_width <= 2 * self.edge_taper {
            return Err(AnalysisError::InvalidConfiguration(format!(
                "envelope_width {} leaves no support after tapering {} samples per edge",
                self.envelope_width, self.edge_taper
            )));
        }
        if self.alternation_window < 2 {
            return Err(AnalysisError::InvalidConfiguration(format!(
                "alternation_window {} is too narrow for a matched filter",
                self.alternation_window
            )));
        }
        if !(self.direct_peak_height > 0.0 && self.direct_peak_height <= 1.0) {
            return Err(AnalysisError::InvalidConfiguration(format!(
                "direct_peak_height {} outside (0, 1]",
                self.direct_peak_height
            )));
        }
        if self.spectral_peak_height <= 0.0 {
            return Err(AnalysisError::InvalidConfiguration(
                "spectral_peak_height must be positive".to_string(),
            ));
        }
        if self.segment_penalty <= 0.0 {
            return Err(AnalysisError::InvalidConfiguration(
                "segment_penalty must be positive".to_string(),
            ));
        }
        if self.distance_tolerance_m <= 0.0 {
            return Err(AnalysisError::InvalidConfiguration(
                "distance_tolerance_m must be positive".to_string(),
            ));
        }
        if self.pace_epsilon <= 0.0 {
            return Err(AnalysisError::InvalidConfiguration(
                "pace_epsilon must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
