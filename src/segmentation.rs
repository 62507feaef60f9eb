//! Interval segmentation
//!
//! Two strategies with the same downstream shape:
//!
//! - **Direct pairing**: classify every alternation as acceleration or
//!   deceleration, drop leading alternations until the sequence starts on
//!   an acceleration (a valid interval block begins with a speed-up), and
//!   fold the remainder into consecutive `[start, end)` repetition pairs.
//! - **Change-point segmentation**: penalized partitioning (PELT, L2 cost)
//!   of a signal into pieces with internally consistent statistics, so
//!   activities containing several distinct blocks can be analyzed piece
//!   by piece.

use crate::alternation::{find_alternations, PeakMode, Polarity};
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::types::{AlternationPair, Segment};
use std::collections::BTreeSet;

/// Pair up alternations of a periodic signal into work repetitions.
///
/// Decelerations come from the deceleration-polarity search; accelerations
/// are the remaining alternations of the full search (ordered set
/// difference). Alternations before the first acceleration are leading
/// noise and are dropped, which pins the in-interval/out-of-interval phase
/// convention. Requires the caller to have confirmed periodicity; a signal
/// without acceleration transitions is an error.
pub fn pair_alternations(
    signal: &[f64],
    config: &AnalysisConfig,
) -> Result<Vec<AlternationPair>, AnalysisError> {
    let decelerations =
        find_alternations(signal, config, Polarity::Decelerations, PeakMode::Direct)?;
    let alternations = find_alternations(signal, config, Polarity::Full, PeakMode::Direct)?;

    let deceleration_set: BTreeSet<usize> = decelerations.into_iter().collect();
    let first_acceleration = alternations
        .iter()
        .position(|i| !deceleration_set.contains(i))
        .ok_or_else(|| {
            AnalysisError::DegenerateSignal(
                "no acceleration transitions found; periodicity was not established".to_string(),
            )
        })?;

    let trimmed = &alternations[first_acceleration..];
    let pair_count = trimmed.len() / 2;
    Ok(trimmed[..pair_count * 2]
        .chunks_exact(2)
        .map(|bounds| AlternationPair {
            start: bounds[0],
            end: bounds[1],
        })
        .collect())
}

/// Partition a signal into statistically homogeneous segments with PELT
/// (pruned exact linear time) under an L2 piecewise-constant-mean cost.
///
/// `penalty` is charged per change point: higher values yield fewer,
/// longer segments. Segments are contiguous, non-empty, and cover
/// `[0, signal.len())`.
pub fn pelt_segments(signal: &[f64], penalty: f64, min_size: usize) -> Vec<Segment> {
    let n = signal.len();
    if n == 0 {
        return Vec::new();
    }
    let min_size = min_size.max(1);
    if n <= min_size {
        return vec![Segment { start: 0, end: n }];
    }

    let mut sums = vec![0.0; n + 1];
    let mut squares = vec![0.0; n + 1];
    for (i, &v) in signal.iter().enumerate() {
        sums[i + 1] = sums[i] + v;
        squares[i + 1] = squares[i] + v * v;
    }
    // Sum of squared deviations from the segment mean over [s, e).
    let cost = |s: usize, e: usize| -> f64 {
        let len = (e - s) as f64;
        let sum = sums[e] - sums[s];
        squares[e] - squares[s] - sum * sum / len
    };

    let mut best_cost = vec![f64::INFINITY; n + 1];
    best_cost[0] = -penalty;
    let mut previous = vec![0usize; n + 1];
    let mut candidates: Vec<usize> = vec![0];

    for t in 1..=n {
        let mut best = f64::INFINITY;
        let mut best_start = 0;
        for &s in &candidates {
            if t - s < min_size {
                continue;
            }
            let candidate = best_cost[s] + cost(s, t) + penalty;
            if candidate < best {
                best = candidate;
                best_start = s;
            }
        }
        if best.is_finite() {
            best_cost[t] = best;
            previous[t] = best_start;
            // PELT pruning: starts that can no longer win are discarded.
            candidates.retain(|&s| t - s < min_size || best_cost[s] + cost(s, t) <= best_cost[t]);
        }
        candidates.push(t);
    }

    let mut bounds = vec![n];
    let mut t = n;
    while t > 0 {
        t = previous[t];
        bounds.push(t);
    }
    bounds.reverse();
    bounds
        .windows(2)
        .map(|w| Segment {
            start: w[0],
            end: w[1],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn square_wave(cycles: usize, low_len: usize, high_len: usize, low: f64, high: f64) -> Vec<f64> {
        let mut signal = Vec::with_capacity(cycles * (low_len + high_len));
        for _ in 0..cycles {
            signal.extend(std::iter::repeat(low).take(low_len));
            signal.extend(std::iter::repeat(high).take(high_len));
        }
        signal
    }

    #[test]
    fn pairing_starts_on_an_acceleration() {
        let signal = square_wave(10, 100, 100, 3.0, 6.0);
        let config = AnalysisConfig::default();
        let pairs = pair_alternations(&signal, &config).unwrap();
        assert!(
            (8..=10).contains(&pairs.len()),
            "unexpected pair count {}",
            pairs.len()
        );
        for pair in &pairs {
            assert!(pair.start < pair.end);
            // Each pair should span roughly one work phase (100 samples).
            let span = pair.end - pair.start;
            assert!((60..=140).contains(&span), "pair span {span}");
        }
    }

    #[test]
    fn pairing_fails_without_accelerations() {
        let signal = vec![3.0; 1000];
        let config = AnalysisConfig::default();
        assert!(matches!(
            pair_alternations(&signal, &config),
            Err(AnalysisError::DegenerateSignal(_))
        ));
    }

    #[test]
    fn constant_signal_is_a_single_segment() {
        let signal = vec![4.2; 1000];
        let segments = pelt_segments(&signal, 10.0, 2);
        assert_eq!(segments, vec![Segment { start: 0, end: 1000 }]);
    }

    #[test]
    fn clean_step_splits_at_the_step() {
        let mut signal = vec![3.0; 500];
        signal.extend(vec![6.0; 500]);
        let segments = pelt_segments(&signal, 10.0, 2);
        assert_eq!(
            segments,
            vec![
                Segment { start: 0, end: 500 },
                Segment { start: 500, end: 1000 }
            ]
        );
    }

    #[test]
    fn segments_tile_the_signal() {
        let mut signal = Vec::new();
        for block in 0..5 {
            signal.extend(vec![block as f64; 200]);
        }
        let segments = pelt_segments(&signal, 5.0, 2);
        assert_eq!(segments.first().unwrap().start, 0);
        assert_eq!(segments.last().unwrap().end, signal.len());
        for pair in segments.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn higher_penalty_never_adds_segments() {
        let mut signal = Vec::new();
        for block in 0..3 {
            signal.extend(vec![(block % 2) as f64; 200]);
        }
        let low = pelt_segments(&signal, 1.0, 2);
        let high = pelt_segments(&signal, 1000.0, 2);
        assert!(high.len() <= low.len());
        assert_eq!(high, vec![Segment { start: 0, end: 600 }]);
    }

    #[test]
    fn empty_signal_yields_no_segments() {
        assert_eq!(pelt_segments(&[], 10.0, 2), Vec::<Segment>::new());
    }
}
