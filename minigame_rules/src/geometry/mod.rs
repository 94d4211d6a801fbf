//! Plane geometry for the minigame arenas.
//!
//! Positions live in an abstract [`Arena`] of configurable size. Paths are plain
//! slices of [`Point`]s; their order is meaningful (stroke order for gestures,
//! traversal order for patrols).

mod scoring;

pub use scoring::*;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A 2D coordinate inside an arena.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Linear interpolation towards `other`; `t = 0` is `self`, `t = 1` is `other`.
    pub fn lerp(self, other: Point, t: f64) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    /// Move up to `step` units towards `target` without overshooting it.
    pub fn step_towards(self, target: Point, step: f64) -> Point {
        let distance = self.distance_to(target);
        if distance <= step || distance == 0.0 {
            return target;
        }
        self.lerp(target, step / distance)
    }
}

/// An ordered sequence of points.
pub type Path = Vec<Point>;

/// Bounded coordinate space all positions are clamped to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Arena {
    pub width: f64,
    pub height: f64,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

impl Arena {
    /// Create an arena of the given size.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Clamp a point into the arena.
    pub fn clamp(&self, point: Point) -> Point {
        self.clamp_padded(point, 0.0)
    }

    /// Clamp a point into the arena shrunk by `padding` on every side.
    ///
    /// A padding larger than half the arena collapses onto the centre line.
    pub fn clamp_padded(&self, point: Point, padding: f64) -> Point {
        let (min_x, max_x) = padded_range(self.width, padding);
        let (min_y, max_y) = padded_range(self.height, padding);
        Point::new(point.x.clamp(min_x, max_x), point.y.clamp(min_y, max_y))
    }

    /// Whether the point lies inside the arena (borders included).
    pub fn contains(&self, point: Point) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }

    /// Pick a uniformly random point inside the padded arena.
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R, padding: f64) -> Point {
        let (min_x, max_x) = padded_range(self.width, padding);
        let (min_y, max_y) = padded_range(self.height, padding);
        Point::new(sample_range(rng, min_x, max_x), sample_range(rng, min_y, max_y))
    }
}

fn padded_range(extent: f64, padding: f64) -> (f64, f64) {
    let padding = padding.max(0.0).min(extent / 2.0);
    (padding, extent - padding)
}

fn sample_range<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    if max > min {
        rng.gen_range(min..=max)
    } else {
        min
    }
}

/// Distance from `p` to the segment `a`-`b`.
///
/// Projects `p` onto the line through `a` and `b`, clamps the projection to the
/// segment and measures to the clamped point. A zero-length segment falls back
/// to the distance from `p` to `a`.
pub fn distance_point_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx * dx + dy * dy;
    if length_sq == 0.0 {
        return p.distance_to(a);
    }

    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / length_sq).clamp(0.0, 1.0);
    p.distance_to(Point::new(a.x + t * dx, a.y + t * dy))
}

/// Smallest distance from `p` to any segment of `path`.
///
/// Returns `None` for paths with fewer than two points.
pub fn distance_point_to_path(p: Point, path: &[Point]) -> Option<f64> {
    path.windows(2)
        .map(|segment| distance_point_to_segment(p, segment[0], segment[1]))
        .min_by(f64::total_cmp)
}
