//! Pipeline orchestration
//!
//! This module provides the public API for Paceline. It wires the stages
//! together: smoothing, change-point segmentation into workout blocks, a
//! per-block spectral periodicity check, alternation pairing, and summary
//! extraction. Periodicity is judged per block rather than over the whole
//! activity: a long warmup or cooldown dilutes the spectral signature of
//! an embedded interval block well below the detection threshold. Pure
//! computation over in-memory arrays; safe to invoke repeatedly and across
//! activities in parallel.

use crate::alternation::is_periodic;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::extract::{extract_base_data, extract_interval_data};
use crate::segmentation::{pair_alternations, pelt_segments};
use crate::smoothing::smooth;
use crate::types::{ActivityStream, ActivitySummary, Segment};

/// Summarize one activity with the default configuration.
///
/// Deterministic: identical input arrays yield bit-identical summaries.
pub fn summarize(stream: &ActivityStream) -> Result<ActivitySummary, AnalysisError> {
    ActivityAnalyzer::default().summarize(stream)
}

/// Reusable analyzer carrying one configuration.
///
/// Holds no per-activity state, so a single instance can serve a whole
/// batch of activities.
#[derive(Debug, Clone, Default)]
pub struct ActivityAnalyzer {
    config: AnalysisConfig,
}

impl ActivityAnalyzer {
    /// Create an analyzer with a specific configuration.
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Classify and summarize one activity.
    ///
    /// Streams too short for the smoothing kernel are summarized as base
    /// efforts directly; there is no structure to detect in them.
    pub fn summarize(&self, stream: &ActivityStream) -> Result<ActivitySummary, AnalysisError> {
        self.config.validate()?;
        stream.validate()?;

        if stream.len() <= self.config.kernel_width {
            tracing::debug!(
                samples = stream.len(),
                "stream shorter than the smoothing kernel; summarizing as base"
            );
            return extract_base_data(
                &stream.velocity,
                &stream.distance,
                &stream.heartrate,
                &self.config,
            );
        }

        let smoothed = smooth(
            &stream.velocity,
            self.config.kernel_width,
            self.config.edge_taper,
        )?;

        if let Some(summary) = self.best_interval_block(stream, &smoothed) {
            return Ok(summary);
        }
        tracing::debug!("no interval block found; summarizing as base");

        extract_base_data(
            &stream.velocity,
            &stream.distance,
            &stream.heartrate,
            &self.config,
        )
    }

    /// Summarize a batch of activities. One activity's failure is reported
    /// in its slot and logged; it never aborts the rest of the batch.
    pub fn summarize_all(
        &self,
        streams: &[ActivityStream],
    ) -> Vec<Result<ActivitySummary, AnalysisError>> {
        streams
            .iter()
            .enumerate()
            .map(|(index, stream)| {
                let result = self.summarize(stream);
                if let Err(err) = &result {
                    tracing::warn!(activity = index, %err, "activity analysis failed; continuing batch");
                }
                result
            })
            .collect()
    }

    /// Partition the activity into blocks and summarize the dominant
    /// interval block, if any.
    ///
    /// Each change-point segment is treated as an independent sub-activity:
    /// non-periodic segments, segments shorter than the alternation window,
    /// and segments that fail pairing, extraction, or distance consistency
    /// are skipped. When several blocks qualify, the one with the most
    /// repetitions wins (the summary contract is one record per activity).
    fn best_interval_block(
        &self,
        stream: &ActivityStream,
        smoothed: &[f64],
    ) -> Option<ActivitySummary> {
        let mut best: Option<(usize, ActivitySummary)> = None;

        for segment in self.segment_blocks(smoothed) {
            let window = &smoothed[segment.start..segment.end];
            if window.len() < self.config.alternation_window {
                continue;
            }
            if !is_periodic(window, &self.config) {
                continue;
            }
            let pairs = match pair_alternations(window, &self.config) {
                Ok(pairs) => pairs,
                Err(err) => {
                    tracing::debug!(
                        segment_start = segment.start,
                        segment_end = segment.end,
                        %err,
                        "skipping segment"
                    );
                    continue;
                }
            };
            if pairs.len() < self.config.min_segment_pairs {
                continue;
            }
            let pairs: Vec<_> = pairs.into_iter().map(|p| p.offset(segment.start)).collect();
            let summary = match extract_interval_data(
                &pairs,
                &stream.distance,
                &stream.velocity,
                &stream.heartrate,
                &stream.velocity,
                &self.config,
            ) {
                Ok(summary) => summary,
                Err(err) => {
                    tracing::debug!(
                        segment_start = segment.start,
                        segment_end = segment.end,
                        %err,
                        "segment extraction failed; skipped"
                    );
                    continue;
                }
            };
            match summary {
                ActivitySummary::Interval { repetitions, .. } => {
                    if best.as_ref().map(|(reps, _)| repetitions > *reps).unwrap_or(true) {
                        best = Some((repetitions, summary));
                    }
                }
                ActivitySummary::Base { .. } => {
                    tracing::debug!(
                        segment_start = segment.start,
                        segment_end = segment.end,
                        "segment failed distance consistency; skipped"
                    );
                }
            }
        }
        best.map(|(_, summary)| summary)
    }

    /// Change-point segmentation of the smoothed velocity.
    ///
    /// PELT runs on a coarse envelope rather than on the smoothed signal
    /// itself: the envelope flattens individual work/rest plateaus, so
    /// change points land on boundaries between blocks of different
    /// character instead of on every repetition.
    fn segment_blocks(&self, smoothed: &[f64]) -> Vec<Segment> {
        let whole = Segment {
            start: 0,
            end: smoothed.len(),
        };
        if smoothed.len() <= self.config.envelope_width {
            return vec![whole];
        }
        let Ok(envelope) = smooth(smoothed, self.config.envelope_width, self.config.edge_taper)
        else {
            return vec![whole];
        };
        pelt_segments(&envelope, self.config.segment_penalty, 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cumulative_distance(velocity: &[f64]) -> Vec<f64> {
        let mut distance = Vec::with_capacity(velocity.len());
        let mut total = 0.0;
        for &v in velocity {
            distance.push(total);
            total += v;
        }
        distance
    }

    fn stream(velocity: Vec<f64>, heartrate: Vec<f64>) -> ActivityStream {
        let distance = cumulative_distance(&velocity);
        ActivityStream::new(distance, velocity, heartrate).unwrap()
    }

    /// 50 work/rest cycles: 30 samples at 3 m/s, 30 samples at 6 m/s,
    /// heart rate climbing linearly 140 -> 170 BPM.
    fn interval_stream() -> ActivityStream {
        let mut velocity = Vec::with_capacity(3000);
        for _ in 0..50 {
            velocity.extend(std::iter::repeat(3.0).take(30));
            velocity.extend(std::iter::repeat(6.0).take(30));
        }
        let heartrate: Vec<f64> = (0..3000)
            .map(|i| 140.0 + 30.0 * i as f64 / 2999.0)
            .collect();
        stream(velocity, heartrate)
    }

    #[test]
    fn constant_stream_summarizes_as_base() {
        let s = stream(vec![3.0; 1000], vec![150.0; 1000]);
        let summary = summarize(&s).unwrap();
        assert_eq!(
            summary,
            ActivitySummary::Base {
                distance_m: 2997.0,
                pace_min_per_km: 5.525,
                pace_stddev: 0.0,
                heartrate_bpm: 150.0,
                heartrate_stddev: 0.0,
            }
        );
    }

    #[test]
    fn interval_stream_summarizes_as_interval() {
        let summary = summarize(&interval_stream()).unwrap();
        match summary {
            ActivitySummary::Interval {
                repetitions,
                rep_pace_min_per_km,
                rep_heartrate_bpm,
                rep_heartrate_stddev,
                ..
            } => {
                assert!(
                    (25..=50).contains(&repetitions),
                    "repetitions {repetitions} out of range"
                );
                // Work phase at 6 m/s is about 2.77 min/km.
                assert!(
                    (2.5..=3.2).contains(&rep_pace_min_per_km),
                    "rep pace {rep_pace_min_per_km}"
                );
                assert!((140.0..=170.0).contains(&rep_heartrate_bpm));
                assert!(rep_heartrate_stddev > 0.0, "climbing heart rate must disperse");
            }
            other => panic!("expected interval summary, got {other:?}"),
        }
    }

    #[test]
    fn warmup_before_interval_block_is_skipped() {
        let mut velocity = vec![3.0; 1200];
        for _ in 0..40 {
            velocity.extend(std::iter::repeat(6.0).take(30));
            velocity.extend(std::iter::repeat(3.0).take(30));
        }
        let mut heartrate = vec![140.0; 1200];
        heartrate.extend(vec![160.0; 2400]);
        let summary = summarize(&stream(velocity, heartrate)).unwrap();
        match summary {
            ActivitySummary::Interval {
                repetitions,
                rep_pace_min_per_km,
                rep_heartrate_bpm,
                ..
            } => {
                assert!(repetitions >= 10, "repetitions {repetitions}");
                assert!(
                    (2.5..=3.2).contains(&rep_pace_min_per_km),
                    "rep pace {rep_pace_min_per_km}"
                );
                assert!(rep_heartrate_bpm > 150.0, "work reps happen in the block");
            }
            other => panic!("expected interval summary, got {other:?}"),
        }
    }

    #[test]
    fn summaries_are_deterministic() {
        let s = interval_stream();
        let first = summarize(&s).unwrap();
        let second = summarize(&s).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn single_sample_stream_is_a_degenerate_base() {
        let s = ActivityStream::new(vec![0.0], vec![3.0], vec![150.0]).unwrap();
        let summary = summarize(&s).unwrap();
        assert_eq!(
            summary,
            ActivitySummary::Base {
                distance_m: 0.0,
                pace_min_per_km: 5.525,
                pace_stddev: 0.0,
                heartrate_bpm: 150.0,
                heartrate_stddev: 0.0,
            }
        );
    }

    #[test]
    fn mismatched_stream_is_rejected() {
        let s = ActivityStream {
            distance: vec![0.0, 1.0],
            velocity: vec![3.0],
            heartrate: vec![150.0, 151.0],
        };
        assert!(matches!(
            summarize(&s),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn batch_isolates_failures() {
        let good = stream(vec![3.0; 500], vec![150.0; 500]);
        let bad = ActivityStream {
            distance: vec![],
            velocity: vec![],
            heartrate: vec![],
        };
        let analyzer = ActivityAnalyzer::default();
        let results = analyzer.summarize_all(&[good.clone(), bad, good]);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }

    #[test]
    fn interval_pairs_cover_the_work_phase() {
        // Repetition summaries must describe the fast half of each cycle,
        // not the recovery half: rep pace near 6 m/s, never near 3 m/s.
        let summary = summarize(&interval_stream()).unwrap();
        match summary {
            ActivitySummary::Interval {
                rep_distance_m,
                rep_pace_min_per_km,
                ..
            } => {
                assert!(rep_pace_min_per_km < 3.5, "rep pace {rep_pace_min_per_km}");
                // One work phase is 30 samples at 6 m/s.
                assert!(
                    (120.0..=260.0).contains(&rep_distance_m),
                    "rep distance {rep_distance_m}"
                );
            }
            other => panic!("expected interval summary, got {other:?}"),
        }
    }

    #[test]
    fn zero_pair_floor_does_not_abort_the_activity() {
        // min_segment_pairs of zero lets empty pair sets reach the
        // extractor; the failure must skip the segment, not the activity.
        let config = AnalysisConfig {
            min_segment_pairs: 0,
            ..Default::default()
        };
        let analyzer = ActivityAnalyzer::new(config);
        let summary = analyzer.summarize(&interval_stream()).unwrap();
        assert!(matches!(summary, ActivitySummary::Interval { .. }));
        let base = analyzer
            .summarize(&stream(vec![3.0; 1000], vec![150.0; 1000]))
            .unwrap();
        assert!(matches!(base, ActivitySummary::Base { .. }));
    }

    #[test]
    fn custom_penalty_is_carried_by_the_analyzer() {
        let config = AnalysisConfig {
            segment_penalty: 50.0,
            ..Default::default()
        };
        let analyzer = ActivityAnalyzer::new(config);
        assert_eq!(analyzer.config().segment_penalty, 50.0);
        let summary = analyzer.summarize(&interval_stream()).unwrap();
        assert!(matches!(summary, ActivitySummary::Interval { .. }));
    }
}
