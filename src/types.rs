//! Core types for the Paceline pipeline
//!
//! This module defines the data that flows through each stage of the
//! pipeline: the raw activity stream, the index structures produced by
//! alternation detection and change-point segmentation, and the final
//! activity summary.

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};

/// One activity's raw telemetry: three equal-length, time-aligned sequences.
///
/// `distance` is cumulative meters and must be non-decreasing, `velocity`
/// is meters per second (may be noisy), `heartrate` is beats per minute.
/// Constructed once per analysis call and not mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityStream {
    pub distance: Vec<f64>,
    pub velocity: Vec<f64>,
    pub heartrate: Vec<f64>,
}

impl ActivityStream {
    /// Build a stream, checking the cross-sequence invariants.
    pub fn new(
        distance: Vec<f64>,
        velocity: Vec<f64>,
        heartrate: Vec<f64>,
    ) -> Result<Self, AnalysisError> {
        let stream = Self {
            distance,
            velocity,
            heartrate,
        };
        stream.validate()?;
        Ok(stream)
    }

    /// Number of samples in the stream.
    pub fn len(&self) -> usize {
        self.distance.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distance.is_empty()
    }

    /// Check equal lengths, non-empty sequences, and monotonic distance.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.distance.is_empty() {
            return Err(AnalysisError::InvalidInput(
                "activity stream has no samples".to_string(),
            ));
        }
        if self.velocity.len() != self.distance.len()
            || self.heartrate.len() != self.distance.len()
        {
            return Err(AnalysisError::InvalidInput(format!(
                "sequence lengths differ: distance {}, velocity {}, heartrate {}",
                self.distance.len(),
                self.velocity.len(),
                self.heartrate.len()
            )));
        }
        if self.distance.windows(2).any(|w| w[1] < w[0]) {
            return Err(AnalysisError::InvalidInput(
                "distance sequence is not non-decreasing".to_string(),
            ));
        }
        Ok(())
    }
}

/// A half-open index interval `[start, end)` into the smoothed velocity,
/// marking one full work repetition between two alternation points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternationPair {
    pub start: usize,
    pub end: usize,
}

impl AlternationPair {
    /// Shift both bounds by `offset` (segment-local to activity-global indices).
    pub fn offset(self, offset: usize) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
        }
    }
}

/// Index bounds `[start, end)` of one change-point segment over the full
/// activity. Each segment is analyzed as an independent sub-activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// The final summary of one activity.
///
/// Exactly one variant per activity. Distance and pace fields are rounded
/// to three decimals and heart-rate dispersion to whole BPM before the
/// record is handed to callers. Serializes as `{"type": ..., "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ActivitySummary {
    /// A steady effort, summarized by whole-activity statistics.
    Base {
        distance_m: f64,
        pace_min_per_km: f64,
        pace_stddev: f64,
        heartrate_bpm: f64,
        heartrate_stddev: f64,
    },
    /// A structured workout, summarized per work repetition.
    Interval {
        repetitions: usize,
        rep_distance_m: f64,
        rep_pace_min_per_km: f64,
        rep_pace_stddev: f64,
        rep_heartrate_bpm: f64,
        rep_heartrate_stddev: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn stream_accepts_consistent_sequences() {
        let stream = ActivityStream::new(
            vec![0.0, 3.0, 6.0],
            vec![3.0, 3.0, 3.0],
            vec![150.0, 151.0, 150.0],
        );
        assert!(stream.is_ok());
        assert_eq!(stream.unwrap().len(), 3);
    }

    #[test]
    fn stream_rejects_mismatched_lengths() {
        let result = ActivityStream::new(vec![0.0, 3.0], vec![3.0], vec![150.0, 151.0]);
        assert!(matches!(result, Err(AnalysisError::InvalidInput(_))));
    }

    #[test]
    fn stream_rejects_empty_sequences() {
        let result = ActivityStream::new(vec![], vec![], vec![]);
        assert!(matches!(result, Err(AnalysisError::InvalidInput(_))));
    }

    #[test]
    fn stream_rejects_decreasing_distance() {
        let result = ActivityStream::new(
            vec![0.0, 5.0, 4.0],
            vec![3.0, 3.0, 3.0],
            vec![150.0, 150.0, 150.0],
        );
        assert!(matches!(result, Err(AnalysisError::InvalidInput(_))));
    }

    #[test]
    fn summary_serializes_with_type_and_data_envelope() {
        let summary = ActivitySummary::Base {
            distance_m: 5000.0,
            pace_min_per_km: 5.525,
            pace_stddev: 0.12,
            heartrate_bpm: 150.0,
            heartrate_stddev: 4.0,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["type"], "base");
        assert_eq!(json["data"]["pace_min_per_km"], 5.525);

        let roundtrip: ActivitySummary = serde_json::from_value(json).unwrap();
        assert_eq!(roundtrip, summary);
    }

    #[test]
    fn pair_offset_shifts_both_bounds() {
        let pair = AlternationPair { start: 10, end: 40 };
        assert_eq!(pair.offset(100), AlternationPair { start: 110, end: 140 });
    }
}
