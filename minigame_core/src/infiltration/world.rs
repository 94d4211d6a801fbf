//! World generation for the infiltration minigame.

use minigame_rules::{Arena, DataPoint, Difficulty, EntityId, Guard, InfiltrationTuning, Point};
use rand::Rng;
use std::f64::consts::TAU;

/// Attempts at placing a guard away from the player before accepting any spot.
const GUARD_PLACEMENT_ATTEMPTS: usize = 16;

/// Everything that moves or can be picked up in an infiltration session.
#[derive(Debug, Clone)]
pub struct InfiltrationWorld {
    pub arena: Arena,
    pub player: Point,
    pub guards: Vec<Guard>,
    pub data_points: Vec<DataPoint>,
}

impl InfiltrationWorld {
    /// Generate `difficulty + 2` guards and `difficulty * 4 + 3` data points.
    pub fn generate<R: Rng + ?Sized>(
        difficulty: Difficulty,
        arena: Arena,
        tuning: &InfiltrationTuning,
        rng: &mut R,
    ) -> Self {
        let player = arena.clamp_padded(
            Point::new(tuning.padding, arena.height - tuning.padding),
            tuning.padding,
        );
        let keep_clear = tuning.capture_radius * 4.0;

        let guards = (0..tuning.guard_count(difficulty))
            .filter_map(|_| {
                let start = spawn_away_from(player, keep_clear, &arena, tuning.padding, rng);
                let path = patrol_path(start, &arena, tuning, rng);
                Guard::new(EntityId::from_rng(rng), path)
            })
            .collect();

        let (value_min, value_max) = ordered(tuning.data_value_min, tuning.data_value_max);
        let data_points = (0..tuning.data_point_count(difficulty))
            .map(|_| {
                let id = EntityId::from_rng(rng);
                let position = arena.random_point(rng, tuning.padding);
                DataPoint::new(id, position, rng.gen_range(value_min..=value_max))
            })
            .collect();

        Self {
            arena,
            player,
            guards,
            data_points,
        }
    }
}

/// A patrol of 3 to 5 waypoints whose heading turns by at most
/// `patrol_max_turn` between legs, clamped to the padded arena.
pub fn patrol_path<R: Rng + ?Sized>(
    start: Point,
    arena: &Arena,
    tuning: &InfiltrationTuning,
    rng: &mut R,
) -> Vec<Point> {
    let (points_min, points_max) = ordered(
        tuning.patrol_points_min.max(2),
        tuning.patrol_points_max.max(2),
    );
    let count = rng.gen_range(points_min..=points_max);
    let max_turn = tuning.patrol_max_turn.abs();

    let mut heading = rng.gen_range(0.0..TAU);
    let mut current = arena.clamp_padded(start, tuning.padding);
    let mut path = Vec::with_capacity(count);
    path.push(current);

    while path.len() < count {
        if max_turn > 0.0 {
            heading += rng.gen_range(-max_turn..=max_turn);
        }
        let length = sample(rng, tuning.patrol_step_min, tuning.patrol_step_max);
        let next = Point::new(
            current.x + heading.cos() * length,
            current.y + heading.sin() * length,
        );
        current = arena.clamp_padded(next, tuning.padding);
        path.push(current);
    }

    path
}

fn spawn_away_from<R: Rng + ?Sized>(
    avoid: Point,
    clearance: f64,
    arena: &Arena,
    padding: f64,
    rng: &mut R,
) -> Point {
    let mut candidate = arena.random_point(rng, padding);
    for _ in 1..GUARD_PLACEMENT_ATTEMPTS {
        if candidate.distance_to(avoid) >= clearance {
            break;
        }
        candidate = arena.random_point(rng, padding);
    }
    candidate
}

fn sample<R: Rng + ?Sized>(rng: &mut R, a: f64, b: f64) -> f64 {
    let (min, max) = if a <= b { (a, b) } else { (b, a) };
    if max > min {
        rng.gen_range(min..=max)
    } else {
        min
    }
}

fn ordered<T: PartialOrd>(a: T, b: T) -> (T, T) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
