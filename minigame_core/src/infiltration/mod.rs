//! Stealth infiltration: steer past patrolling guards and collect enough data
//! before the countdown ends.
//!
//! Each frame runs, in order: player movement, guard movement, data pickup,
//! then the terminal checks (capture before extraction).

mod world;

pub use world::*;

use minigame_rules::{
    DataPoint, Difficulty, Guard, InfiltrationTuning, MinigameKind, MinigameResult,
    MinigameTuning, Point, TimeLimit,
};
use rand::Rng;
use serde::Serialize;
use std::f64::consts::FRAC_1_SQRT_2;
use tracing::{debug, info};

use crate::events::{Direction, InfiltrationInput};
use crate::session::Minigame;

/// Frame rate the per-frame speeds in [`InfiltrationTuning`] were balanced for.
const REFERENCE_FRAME_RATE: f64 = 60.0;

/// Movement keys currently held; any combination is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HeldDirections {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl HeldDirections {
    pub fn set(&mut self, direction: Direction, held: bool) {
        match direction {
            Direction::Up => self.up = held,
            Direction::Down => self.down = held,
            Direction::Left => self.left = held,
            Direction::Right => self.right = held,
        }
    }

    /// Velocity for one frame. Diagonals are scaled by `1/√2` so every
    /// direction moves at `speed`; opposite keys cancel out.
    pub fn velocity(&self, speed: f64) -> (f64, f64) {
        let dx = f64::from(i8::from(self.right) - i8::from(self.left));
        let dy = f64::from(i8::from(self.down) - i8::from(self.up));
        let scale = if dx != 0.0 && dy != 0.0 {
            speed * FRAC_1_SQRT_2
        } else {
            speed
        };
        (dx * scale, dy * scale)
    }
}

/// Lifecycle of an infiltration session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InfiltrationState {
    Running,
    /// Score target reached.
    Extracted,
    /// A guard caught the player in the open.
    Captured,
    TimedOut,
}

/// A running infiltration session.
#[derive(Debug, Clone)]
pub struct InfiltrationEngine {
    world: InfiltrationWorld,
    tuning: InfiltrationTuning,
    guard_speed: f64,
    held: HeldDirections,
    hidden: bool,
    score: u32,
    time_remaining: u32,
    state: InfiltrationState,
}

impl InfiltrationEngine {
    /// Generate a world for `difficulty` and start the countdown.
    pub fn new<R: Rng + ?Sized>(
        difficulty: Difficulty,
        time_limit: TimeLimit,
        tuning: &MinigameTuning,
        rng: &mut R,
    ) -> Self {
        let world =
            InfiltrationWorld::generate(difficulty, tuning.arena, &tuning.infiltration, rng);
        debug!(
            guards = world.guards.len(),
            data_points = world.data_points.len(),
            "infiltration world generated"
        );
        Self::from_world(
            world,
            tuning.infiltration,
            tuning.infiltration.guard_speed(difficulty),
            time_limit,
        )
    }

    /// Run over a prepared world.
    pub fn from_world(
        world: InfiltrationWorld,
        tuning: InfiltrationTuning,
        guard_speed: f64,
        time_limit: TimeLimit,
    ) -> Self {
        Self {
            world,
            tuning,
            guard_speed,
            held: HeldDirections::default(),
            hidden: false,
            score: 0,
            time_remaining: time_limit.seconds(),
            state: InfiltrationState::Running,
        }
    }

    pub fn world(&self) -> &InfiltrationWorld {
        &self.world
    }

    pub fn player(&self) -> Point {
        self.world.player
    }

    pub fn guards(&self) -> &[Guard] {
        &self.world.guards
    }

    pub fn data_points(&self) -> &[DataPoint] {
        &self.world.data_points
    }

    pub fn held(&self) -> HeldDirections {
        self.held
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn target_score(&self) -> u32 {
        self.tuning.target_score
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn state(&self) -> InfiltrationState {
        self.state
    }

    fn move_player(&mut self, scale: f64) {
        let (dx, dy) = self.held.velocity(self.tuning.player_speed * scale);
        let moved = Point::new(self.world.player.x + dx, self.world.player.y + dy);
        self.world.player = self.world.arena.clamp(moved);
    }

    fn move_guards(&mut self, scale: f64) {
        let speed = self.guard_speed * scale;
        for guard in &mut self.world.guards {
            guard.advance(speed);
        }
    }

    fn collect_data(&mut self) {
        let player = self.world.player;
        for data in &mut self.world.data_points {
            if data.collected || player.distance_to(data.position) >= self.tuning.pickup_radius {
                continue;
            }
            if let Some(value) = data.collect() {
                self.score = self.score.saturating_add(value);
                debug!(data_id = %data.id, value, score = self.score, "data collected");
            }
        }
    }

    fn spotted_by_guard(&self) -> bool {
        !self.hidden
            && self.world.guards.iter().any(|guard| {
                self.world.player.distance_to(guard.position) < self.tuning.capture_radius
            })
    }

    fn check_terminal(&mut self) {
        if self.spotted_by_guard() {
            self.state = InfiltrationState::Captured;
            info!(score = self.score, "infiltration failed: captured");
        } else if self.score >= self.tuning.target_score {
            self.state = InfiltrationState::Extracted;
            info!(
                score = self.score,
                time_remaining = self.time_remaining,
                "infiltration succeeded"
            );
        }
    }
}

impl Minigame for InfiltrationEngine {
    type Input = InfiltrationInput;

    fn kind(&self) -> MinigameKind {
        MinigameKind::StealthInfiltration
    }

    fn apply_input(&mut self, input: InfiltrationInput) {
        if self.state != InfiltrationState::Running {
            debug!(?input, "infiltration input after completion ignored");
            return;
        }

        match input {
            InfiltrationInput::KeyDown(direction) => self.held.set(direction, true),
            InfiltrationInput::KeyUp(direction) => self.held.set(direction, false),
            InfiltrationInput::ToggleHide => {
                self.hidden = !self.hidden;
                debug!(hidden = self.hidden, "hide toggled");
            }
        }
    }

    fn on_frame(&mut self, dt: f64) {
        if self.state != InfiltrationState::Running {
            return;
        }

        // Speeds are per frame at the reference rate.
        let scale = if dt.is_finite() {
            (dt * REFERENCE_FRAME_RATE).max(0.0)
        } else {
            0.0
        };
        self.move_player(scale);
        self.move_guards(scale);
        self.collect_data();
        self.check_terminal();
    }

    fn on_countdown(&mut self) {
        if self.state != InfiltrationState::Running {
            return;
        }

        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining == 0 {
            self.state = InfiltrationState::TimedOut;
            info!(
                score = self.score,
                target = self.tuning.target_score,
                "infiltration timed out"
            );
        }
    }

    fn outcome(&self) -> Option<MinigameResult> {
        match self.state {
            InfiltrationState::Running => None,
            InfiltrationState::Extracted => Some(MinigameResult::success()),
            InfiltrationState::Captured | InfiltrationState::TimedOut => {
                Some(MinigameResult::failure())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minigame_rules::{Arena, EntityId};

    fn seconds(value: i64) -> TimeLimit {
        TimeLimit::new(value).unwrap()
    }

    fn guard(path: Vec<Point>) -> Guard {
        Guard::new(EntityId::nil(), path).unwrap()
    }

    /// Player at the left edge, six data points worth 17 along the path to the
    /// right, and a guard pacing far away in the top-right corner.
    fn corridor_world() -> InfiltrationWorld {
        let data_points = (0..6)
            .map(|i| {
                DataPoint::new(
                    EntityId::nil(),
                    Point::new(100.0 + f64::from(i) * 50.0, 300.0),
                    17,
                )
            })
            .collect();
        InfiltrationWorld {
            arena: Arena::default(),
            player: Point::new(50.0, 300.0),
            guards: vec![guard(vec![Point::new(700.0, 50.0), Point::new(760.0, 50.0)])],
            data_points,
        }
    }

    fn engine(world: InfiltrationWorld, limit: i64) -> InfiltrationEngine {
        InfiltrationEngine::from_world(world, InfiltrationTuning::default(), 1.25, seconds(limit))
    }

    #[test]
    fn test_diagonal_speed_matches_axis_speed() {
        let mut held = HeldDirections::default();
        held.set(Direction::Right, true);
        let (ax, ay) = held.velocity(3.0);
        held.set(Direction::Up, true);
        let (dx, dy) = held.velocity(3.0);
        assert_eq!((ax, ay), (3.0, 0.0));
        assert!((dx.hypot(dy) - 3.0).abs() < 1e-9);
        assert!(dx > 0.0 && dy < 0.0);

        held.set(Direction::Left, true);
        let (cx, cy) = held.velocity(3.0);
        assert_eq!((cx, cy), (0.0, -3.0));
    }

    #[test]
    fn test_movement_follows_frame_length() {
        let one_second = |frame_rate: u32| {
            let mut world = corridor_world();
            world.data_points.clear();
            world.player = Point::new(400.0, 500.0);
            let mut engine = engine(world, 60);
            engine.apply_input(InfiltrationInput::KeyDown(Direction::Right));
            for _ in 0..frame_rate {
                engine.on_frame(1.0 / f64::from(frame_rate));
            }
            engine.player()
        };

        assert!((one_second(60).x - 580.0).abs() < 1e-6);
        assert!((one_second(30).x - 580.0).abs() < 1e-6);
        assert!((one_second(120).x - 580.0).abs() < 1e-6);
    }

    #[test]
    fn test_player_clamped_to_arena() {
        let mut world = corridor_world();
        world.player = Point::new(1.0, 1.0);
        let mut engine = engine(world, 60);
        engine.apply_input(InfiltrationInput::KeyDown(Direction::Left));
        engine.apply_input(InfiltrationInput::KeyDown(Direction::Up));
        for _ in 0..10 {
            engine.on_frame(1.0 / 60.0);
        }
        assert_eq!(engine.player(), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_collecting_six_points_extracts() {
        let mut engine = engine(corridor_world(), 60);
        engine.apply_input(InfiltrationInput::KeyDown(Direction::Right));
        for _ in 0..200 {
            engine.on_frame(1.0 / 60.0);
            if engine.outcome().is_some() {
                break;
            }
        }
        assert_eq!(engine.score(), 102);
        assert_eq!(engine.state(), InfiltrationState::Extracted);
        assert_eq!(engine.outcome(), Some(MinigameResult::success()));
    }

    #[test]
    fn test_data_never_double_counted() {
        let mut world = corridor_world();
        world.player = Point::new(100.0, 300.0);
        let mut engine = engine(world, 60);
        for _ in 0..30 {
            engine.on_frame(1.0 / 60.0);
        }
        assert_eq!(engine.score(), 17);
        assert_eq!(engine.data_points().iter().filter(|d| d.collected).count(), 1);
    }

    #[test]
    fn test_guard_contact_captures() {
        let mut world = corridor_world();
        world.guards = vec![guard(vec![Point::new(60.0, 300.0), Point::new(60.0, 320.0)])];
        let mut engine = engine(world, 60);
        engine.on_frame(1.0 / 60.0);
        assert_eq!(engine.state(), InfiltrationState::Captured);
        assert_eq!(engine.outcome(), Some(MinigameResult::failure()));

        let position = engine.player();
        engine.apply_input(InfiltrationInput::KeyDown(Direction::Right));
        engine.on_frame(1.0 / 60.0);
        assert_eq!(engine.player(), position);
    }

    #[test]
    fn test_hidden_player_is_never_captured() {
        let mut world = corridor_world();
        world.guards = vec![guard(vec![Point::new(20.0, 300.0), Point::new(90.0, 300.0)])];
        let mut engine = engine(world, 60);
        engine.apply_input(InfiltrationInput::ToggleHide);
        assert!(engine.is_hidden());
        for _ in 0..300 {
            engine.on_frame(1.0 / 60.0);
        }
        assert_eq!(engine.state(), InfiltrationState::Running);

        engine.apply_input(InfiltrationInput::ToggleHide);
        for _ in 0..300 {
            engine.on_frame(1.0 / 60.0);
            if engine.outcome().is_some() {
                break;
            }
        }
        assert_eq!(engine.state(), InfiltrationState::Captured);
    }

    #[test]
    fn test_countdown_expiry_fails() {
        let mut engine = engine(corridor_world(), 2);
        engine.on_countdown();
        assert!(engine.outcome().is_none());
        engine.on_countdown();
        assert_eq!(engine.state(), InfiltrationState::TimedOut);

        engine.on_countdown();
        assert_eq!(engine.time_remaining(), 0);
        assert_eq!(engine.outcome(), Some(MinigameResult::failure()));
    }

    #[test]
    fn test_generated_session_starts_running() {
        use rand::SeedableRng;
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(4);
        let difficulty = Difficulty::new(1).unwrap();
        let engine =
            InfiltrationEngine::new(difficulty, seconds(60), &MinigameTuning::default(), &mut rng);
        assert_eq!(engine.guards().len(), 3);
        assert_eq!(engine.data_points().len(), 7);
        assert_eq!(engine.target_score(), 100);
        assert_eq!(engine.state(), InfiltrationState::Running);
    }
}
