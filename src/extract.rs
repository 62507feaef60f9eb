//! Summary extraction
//!
//! Turns detected structure into the two canonical summary shapes. The
//! interval extractor filters noise pairs via a distance-consistency
//! check, computes per-repetition medians, and aggregates dispersion
//! across repetitions; the base extractor computes whole-activity
//! statistics. Both apply the speed-to-pace conversion and the fixed
//! rounding policy, so callers see one contract regardless of path.

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::stats::{mean, median, round_to, std_dev};
use crate::types::{ActivitySummary, AlternationPair};

/// Convert meters per second to pace in minutes per kilometer.
/// `epsilon` guards the division for stationary signals.
pub fn mps_to_min_per_km(speed: f64, epsilon: f64) -> f64 {
    1.0 / (epsilon + speed * 3.6 / 60.0)
}

/// Summarize a steady effort over whole-activity statistics.
///
/// Pace mean and dispersion are computed over the per-sample converted
/// paces; heart rate is used verbatim; total distance is the maximum of
/// the distance sequence.
pub fn extract_base_data(
    velocity: &[f64],
    distance: &[f64],
    heartrate: &[f64],
    config: &AnalysisConfig,
) -> Result<ActivitySummary, AnalysisError> {
    if velocity.is_empty() || distance.is_empty() || heartrate.is_empty() {
        return Err(AnalysisError::InvalidInput(
            "base extraction needs at least one sample per sequence".to_string(),
        ));
    }
    let paces: Vec<f64> = velocity
        .iter()
        .map(|&v| mps_to_min_per_km(v, config.pace_epsilon))
        .collect();
    let total_distance = distance.iter().fold(f64::NEG_INFINITY, |acc, &d| acc.max(d));

    Ok(ActivitySummary::Base {
        distance_m: round_to(total_distance, config.decimals),
        pace_min_per_km: round_to(mean(&paces), config.decimals),
        pace_stddev: round_to(std_dev(&paces), config.decimals),
        heartrate_bpm: round_to(mean(heartrate), config.decimals),
        heartrate_stddev: round_to(std_dev(heartrate), 0),
    })
}

/// Summarize repetitions bounded by alternation pairs.
///
/// Genuine repetitions cover near-equal distance, so only the longest
/// contiguous run of pairs whose consecutive distance differences stay
/// within `distance_tolerance_m` is kept; a leading or trailing spurious
/// pair is dropped by this rule. When no consistent run exists the
/// activity was misclassified and is reprocessed as a base effort over
/// `fallback_velocity` (logged, never an error).
pub fn extract_interval_data(
    pairs: &[AlternationPair],
    distance: &[f64],
    velocity: &[f64],
    heartrate: &[f64],
    fallback_velocity: &[f64],
    config: &AnalysisConfig,
) -> Result<ActivitySummary, AnalysisError> {
    if pairs.is_empty() {
        return Err(AnalysisError::InvalidInput(
            "interval extraction needs at least one alternation pair".to_string(),
        ));
    }
    let limit = distance.len().min(velocity.len()).min(heartrate.len());
    if pairs.iter().any(|p| p.start >= p.end || p.end >= limit) {
        return Err(AnalysisError::InvalidInput(
            "alternation pair out of stream bounds".to_string(),
        ));
    }

    let pair_distances: Vec<f64> = pairs
        .iter()
        .map(|p| distance[p.end] - distance[p.start])
        .collect();
    let consistent: Vec<usize> = pair_distances
        .windows(2)
        .enumerate()
        .filter(|(_, w)| (w[1] - w[0]).abs() < config.distance_tolerance_m)
        .map(|(i, _)| i)
        .collect();

    let Some((run_first, run_last)) = longest_run(&consistent) else {
        tracing::warn!(
            pairs = pairs.len(),
            "repetition distances are inconsistent; reinterpreting activity as base effort"
        );
        return extract_base_data(fallback_velocity, distance, heartrate, config);
    };
    // A run over difference indices [first, last] retains pairs [first, last + 1].
    let retained = &pairs[run_first..run_last + 2];
    let retained_distances = &pair_distances[run_first..run_last + 2];

    let mut rep_paces = Vec::with_capacity(retained.len());
    let mut rep_heartrates = Vec::with_capacity(retained.len());
    for pair in retained {
        let paces: Vec<f64> = velocity[pair.start..pair.end]
            .iter()
            .map(|&v| mps_to_min_per_km(v, config.pace_epsilon))
            .collect();
        // Medians shrug off start/stop transients within a repetition.
        rep_paces.push(median(&paces));
        rep_heartrates.push(median(&heartrate[pair.start..pair.end]));
    }

    Ok(ActivitySummary::Interval {
        repetitions: retained.len(),
        rep_distance_m: round_to(mean(retained_distances), config.decimals),
        rep_pace_min_per_km: round_to(mean(&rep_paces), config.decimals),
        rep_pace_stddev: round_to(std_dev(&rep_paces), config.decimals),
        rep_heartrate_bpm: round_to(mean(&rep_heartrates), config.decimals),
        rep_heartrate_stddev: round_to(std_dev(&rep_heartrates), 0),
    })
}

/// Bounds (inclusive) of the longest run of consecutive indices.
/// Ties go to the earliest run.
fn longest_run(indices: &[usize]) -> Option<(usize, usize)> {
    let first = *indices.first()?;
    let mut best = (first, first);
    let mut current = (first, first);
    for &i in &indices[1..] {
        if i == current.1 + 1 {
            current.1 = i;
        } else {
            current = (i, i);
        }
        if current.1 - current.0 > best.1 - best.0 {
            best = current;
        }
    }
    Some(best)
}
