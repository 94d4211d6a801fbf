//! Path accuracy scoring for gesture strokes.
//!
//! Two scoring policies exist because the duel variants tolerate deviation
//! differently. Both are pure and deterministic.

use serde::{Deserialize, Serialize};

use super::{distance_point_to_path, Point};
use crate::error::RulesError;

/// Highest possible accuracy.
pub const MAX_ACCURACY: f64 = 100.0;

/// Distance bands for [`ScoringStrategy::NearestSegment`], as
/// `(distance below, points awarded)`.
const NEAREST_SEGMENT_BANDS: [(f64, f64); 3] = [(10.0, 1.0), (20.0, 0.5), (30.0, 0.25)];

/// Average deviation (in arena units) that maps to zero accuracy.
const DEVIATION_SCALE: f64 = 100.0;

/// How a player path is compared against a reference path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ScoringStrategy {
    /// Each player point earns credit by its distance to the closest reference segment.
    NearestSegment,
    /// Both paths are resampled by index and compared pairwise.
    ResampledDeviation { samples: usize },
}

impl ScoringStrategy {
    /// Sample count used by the generic duel.
    pub const DEFAULT_SAMPLES: usize = 100;

    /// Resampled scoring with the default sample count.
    pub const fn resampled() -> Self {
        Self::ResampledDeviation {
            samples: Self::DEFAULT_SAMPLES,
        }
    }
}

/// Score how closely `player` traces `reference`, in `[0, 100]`.
///
/// An empty player path scores 0. A reference with fewer than two points is
/// rejected, as it cannot describe a gesture.
pub fn score_path_accuracy(
    player: &[Point],
    reference: &[Point],
    strategy: ScoringStrategy,
) -> Result<f64, RulesError> {
    if reference.len() < 2 {
        return Err(RulesError::DegenerateReferencePath {
            points: reference.len(),
        });
    }
    if player.is_empty() {
        return Ok(0.0);
    }

    let accuracy = match strategy {
        ScoringStrategy::NearestSegment => nearest_segment_accuracy(player, reference),
        ScoringStrategy::ResampledDeviation { samples } => {
            resampled_accuracy(player, reference, samples)
        }
    };
    Ok(accuracy.clamp(0.0, MAX_ACCURACY))
}

fn nearest_segment_accuracy(player: &[Point], reference: &[Point]) -> f64 {
    let total: f64 = player
        .iter()
        .filter_map(|p| distance_point_to_path(*p, reference))
        .map(|distance| {
            NEAREST_SEGMENT_BANDS
                .iter()
                .find(|(limit, _)| distance < *limit)
                .map_or(0.0, |(_, points)| *points)
        })
        .sum();

    MAX_ACCURACY * total / player.len() as f64
}

fn resampled_accuracy(player: &[Point], reference: &[Point], samples: usize) -> f64 {
    let samples = samples.max(2);
    let player = resample_by_index(player, samples);
    let reference = resample_by_index(reference, samples);

    let total: f64 = player
        .iter()
        .zip(&reference)
        .map(|(a, b)| a.distance_to(*b))
        .sum();
    let average_deviation = total / samples as f64;

    MAX_ACCURACY - (average_deviation / DEVIATION_SCALE) * MAX_ACCURACY
}

/// Resample a path to `samples` points spaced uniformly by index.
///
/// Sample `i` sits at fractional index `i * (len - 1) / (samples - 1)` and is
/// interpolated between its neighbouring points. Spacing follows the index,
/// not arc length, so dense stretches of the input stay dense.
pub fn resample_by_index(path: &[Point], samples: usize) -> Vec<Point> {
    let (first, last) = match (path.first(), path.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Vec::new(),
    };
    if samples == 0 {
        return Vec::new();
    }
    if samples == 1 || path.len() == 1 {
        return vec![first; samples];
    }

    let span = (path.len() - 1) as f64;
    (0..samples)
        .map(|i| {
            let position = i as f64 * span / (samples - 1) as f64;
            let index = position.floor() as usize;
            match (path.get(index), path.get(index + 1)) {
                (Some(a), Some(b)) => a.lerp(*b, position - index as f64),
                (Some(a), None) => *a,
                _ => last,
            }
        })
        .collect()
}
