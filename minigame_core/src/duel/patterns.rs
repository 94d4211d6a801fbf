//! Reference gestures for the duel.

use minigame_rules::{Arena, PatternSource, Point, RandomWalkConfig};
use rand::seq::SliceRandom;
use rand::Rng;
use std::f64::consts::TAU;

/// A hand-authored gesture in unit coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GesturePattern {
    pub name: &'static str,
    /// Waypoints in `[0, 1]`, scaled onto the padded arena when drawn.
    pub points: &'static [(f64, f64)],
}

/// The fixed catalog used by the standard and final duels.
pub const PATTERN_CATALOG: &[GesturePattern] = &[
    GesturePattern {
        name: "slash",
        points: &[(0.1, 0.1), (0.9, 0.9)],
    },
    GesturePattern {
        name: "chevron",
        points: &[(0.1, 0.2), (0.5, 0.8), (0.9, 0.2)],
    },
    GesturePattern {
        name: "zigzag",
        points: &[(0.1, 0.2), (0.4, 0.8), (0.6, 0.2), (0.9, 0.8)],
    },
    GesturePattern {
        name: "hook",
        points: &[(0.2, 0.1), (0.2, 0.8), (0.8, 0.8), (0.8, 0.4)],
    },
    GesturePattern {
        name: "bolt",
        points: &[(0.7, 0.1), (0.3, 0.5), (0.7, 0.5), (0.3, 0.9)],
    },
];

impl GesturePattern {
    /// Scale onto the arena, keeping `padding` from every border.
    pub fn scaled(&self, arena: &Arena, padding: f64) -> Vec<Point> {
        let width = (arena.width - 2.0 * padding).max(0.0);
        let height = (arena.height - 2.0 * padding).max(0.0);
        self.points
            .iter()
            .map(|(x, y)| {
                arena.clamp_padded(
                    Point::new(padding + x * width, padding + y * height),
                    padding,
                )
            })
            .collect()
    }
}

/// Produce the next reference gesture for a duel turn.
pub fn next_reference<R: Rng + ?Sized>(
    source: PatternSource,
    arena: &Arena,
    walk: &RandomWalkConfig,
    rng: &mut R,
) -> Vec<Point> {
    match source {
        PatternSource::Catalog => PATTERN_CATALOG
            .choose(rng)
            .map(|pattern| pattern.scaled(arena, walk.padding))
            .unwrap_or_else(|| random_walk(arena, walk, rng)),
        PatternSource::RandomWalk => random_walk(arena, walk, rng),
    }
}

/// A random-walk stroke of `segments` legs inside the padded arena.
///
/// Always returns at least two points.
pub fn random_walk<R: Rng + ?Sized>(
    arena: &Arena,
    walk: &RandomWalkConfig,
    rng: &mut R,
) -> Vec<Point> {
    let segments = walk.segments.max(1);
    let (step_min, step_max) = ordered(walk.step_min, walk.step_max);

    let mut current = arena.random_point(rng, walk.padding);
    let mut points = Vec::with_capacity(segments + 1);
    points.push(current);

    for _ in 0..segments {
        let heading = rng.gen_range(0.0..TAU);
        let length = if step_max > step_min {
            rng.gen_range(step_min..=step_max)
        } else {
            step_min
        };
        let next = Point::new(
            current.x + heading.cos() * length,
            current.y + heading.sin() * length,
        );
        current = arena.clamp_padded(next, walk.padding);
        points.push(current);
    }

    points
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
