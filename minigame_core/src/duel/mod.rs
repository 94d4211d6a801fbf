//! Gesture duel: a turn-based fight decided by how well the player traces
//! reference gestures.
//!
//! Turn cycle:
//! 1. **PlayerTurn**: a reference gesture is on screen; the player draws a stroke
//! 2. **Scoring**: the stroke is scored and damages the opponent
//! 3. **OpponentTurn**: after a short pause the opponent strikes back
//! 4. Back to **PlayerTurn**, unless a health pool reached 0 (**GameOver**)

mod patterns;

pub use patterns::*;

use minigame_rules::{
    score_path_accuracy, Arena, Combatant, DamageTier, Difficulty, DuelProfile, MinigameKind,
    MinigameResult, MinigameTuning, Point, RandomWalkConfig, StatusEffectType,
};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::events::DuelInput;
use crate::session::Minigame;

/// How a duel ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DuelOutcome {
    Victory,
    Defeat,
}

/// Where the duel is in its turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DuelPhase {
    PlayerTurn,
    Scoring,
    OpponentTurn,
    GameOver(DuelOutcome),
}

/// Which side a hit lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DuelSide {
    Player,
    Opponent,
}

/// One health mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Hit {
    pub target: DuelSide,
    pub amount: u32,
}

/// The scored result of the last player stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrokeReport {
    pub accuracy: f64,
    pub tier: DamageTier,
    pub damage: u32,
}

/// A running gesture duel.
#[derive(Debug, Clone)]
pub struct DuelEngine {
    kind: MinigameKind,
    profile: DuelProfile,
    difficulty: Difficulty,
    arena: Arena,
    random_walk: RandomWalkConfig,
    turn_delay: f64,
    rng: ChaCha8Rng,

    phase: DuelPhase,
    player: Combatant,
    opponent: Combatant,
    reference: Vec<Point>,
    stroke: Vec<Point>,
    drawing: bool,
    delay_remaining: f64,
    last_stroke: Option<StrokeReport>,
    round: u32,
}

impl DuelEngine {
    /// Start the duel matching `kind`, using its profile from `tuning`.
    pub fn new(
        kind: MinigameKind,
        difficulty: Difficulty,
        tuning: &MinigameTuning,
        rng: ChaCha8Rng,
    ) -> Self {
        let profile = match kind {
            MinigameKind::FinalGestureDuel => tuning.duel.final_showdown,
            _ => tuning.duel.standard,
        };
        Self::with_profile(kind, profile, difficulty, tuning, rng)
    }

    /// Start a duel with an explicit profile, e.g. [`DuelProfile::generic`].
    pub fn with_profile(
        kind: MinigameKind,
        profile: DuelProfile,
        difficulty: Difficulty,
        tuning: &MinigameTuning,
        rng: ChaCha8Rng,
    ) -> Self {
        let mut engine = Self {
            kind,
            profile,
            difficulty,
            arena: tuning.arena,
            random_walk: tuning.duel.random_walk,
            turn_delay: tuning.duel.turn_delay_secs.max(0.0),
            rng,
            phase: DuelPhase::PlayerTurn,
            player: Combatant::new("Player", profile.player_max_health),
            opponent: Combatant::new("Opponent", profile.opponent_max_health),
            reference: Vec::new(),
            stroke: Vec::new(),
            drawing: false,
            delay_remaining: 0.0,
            last_stroke: None,
            round: 0,
        };
        engine.enter_player_turn();
        engine
    }

    pub fn phase(&self) -> DuelPhase {
        self.phase
    }

    pub fn player(&self) -> &Combatant {
        &self.player
    }

    pub fn opponent(&self) -> &Combatant {
        &self.opponent
    }

    /// The gesture the player must trace this turn.
    pub fn reference(&self) -> &[Point] {
        &self.reference
    }

    /// The stroke recorded so far this turn.
    pub fn stroke(&self) -> &[Point] {
        &self.stroke
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn last_stroke(&self) -> Option<StrokeReport> {
        self.last_stroke
    }

    /// Number of player turns started so far.
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn profile(&self) -> &DuelProfile {
        &self.profile
    }

    /// Record a complete stroke at once, as if drawn with the pointer.
    pub fn submit_stroke(&mut self, path: &[Point]) {
        let mut points = path.iter().copied();
        let Some(first) = points.next() else {
            return;
        };
        self.apply_input(DuelInput::PointerDown(first));
        for point in points {
            self.apply_input(DuelInput::PointerMove(point));
        }
        self.apply_input(DuelInput::PointerUp);
    }

    /// Replace the current reference gesture, e.g. with a scripted one.
    pub fn set_reference(&mut self, reference: Vec<Point>) {
        self.reference = reference;
    }

    fn enter_player_turn(&mut self) {
        self.round += 1;
        self.reference = next_reference(
            self.profile.pattern_source,
            &self.arena,
            &self.random_walk,
            &mut self.rng,
        );
        self.stroke.clear();
        self.drawing = false;
        self.phase = DuelPhase::PlayerTurn;
        debug!(
            round = self.round,
            reference_points = self.reference.len(),
            "duel player turn"
        );
    }

    fn resolve_stroke(&mut self) {
        let scored = score_path_accuracy(&self.stroke, &self.reference, self.profile.scoring);
        let accuracy = match scored {
            Ok(accuracy) => accuracy,
            Err(err) => {
                error!(%err, "duel reference gesture cannot be scored");
                0.0
            }
        };
        let tier = self.profile.tiers.classify(accuracy);
        let damage = self.profile.tiers.damage(tier, self.difficulty);
        self.last_stroke = Some(StrokeReport {
            accuracy,
            tier,
            damage,
        });
        debug!(accuracy, ?tier, damage, "duel stroke scored");

        if tier == DamageTier::Exceptional && self.profile.weakens_on_exceptional {
            self.opponent
                .status_effects
                .apply(StatusEffectType::Weakened);
        }

        let outcome = self.apply_damage_batch(&[Hit {
            target: DuelSide::Opponent,
            amount: damage,
        }]);
        match outcome {
            Some(outcome) => self.finish(outcome),
            None => {
                self.delay_remaining = self.turn_delay;
                self.phase = DuelPhase::OpponentTurn;
            }
        }
    }

    fn opponent_attack(&mut self) {
        let weakened = self
            .opponent
            .status_effects
            .consume(StatusEffectType::Weakened);
        let damage = if weakened {
            self.profile.weakened_damage(self.difficulty)
        } else {
            self.profile.opponent_damage(self.difficulty)
        };
        debug!(damage, weakened, "duel opponent attacks");

        let outcome = self.apply_damage_batch(&[Hit {
            target: DuelSide::Player,
            amount: damage,
        }]);
        match outcome {
            Some(outcome) => self.finish(outcome),
            None => self.enter_player_turn(),
        }
    }

    /// Apply hits in order and report a terminal outcome, if any.
    ///
    /// Health is checked after every hit. The first hit that brings a pool to
    /// 0 decides, and the rest of the batch is not applied. Defeat therefore
    /// wins a shared batch only when the player's pool empties first.
    fn apply_damage_batch(&mut self, hits: &[Hit]) -> Option<DuelOutcome> {
        for hit in hits {
            let (combatant, lethal_outcome) = match hit.target {
                DuelSide::Player => (&mut self.player, DuelOutcome::Defeat),
                DuelSide::Opponent => (&mut self.opponent, DuelOutcome::Victory),
            };
            combatant.health.apply_damage(hit.amount);
            if !combatant.is_alive() {
                return Some(lethal_outcome);
            }
        }
        None
    }

    fn finish(&mut self, outcome: DuelOutcome) {
        self.drawing = false;
        self.phase = DuelPhase::GameOver(outcome);
        info!(
            ?outcome,
            player_health = self.player.health.current(),
            player_max_health = self.player.health.max(),
            opponent_health = self.opponent.health.current(),
            opponent_max_health = self.opponent.health.max(),
            rounds = self.round,
            "duel finished"
        );
    }
}

impl Minigame for DuelEngine {
    type Input = DuelInput;

    fn kind(&self) -> MinigameKind {
        self.kind
    }

    fn apply_input(&mut self, input: DuelInput) {
        if self.phase != DuelPhase::PlayerTurn {
            debug!(?input, phase = ?self.phase, "duel input outside player turn ignored");
            return;
        }

        match input {
            DuelInput::PointerDown(point) => {
                self.stroke.clear();
                self.stroke.push(point);
                self.drawing = true;
            }
            DuelInput::PointerMove(point) => {
                if self.drawing {
                    self.stroke.push(point);
                }
            }
            DuelInput::PointerUp => {
                if self.drawing {
                    self.drawing = false;
                    self.phase = DuelPhase::Scoring;
                }
            }
        }
    }

    fn on_frame(&mut self, dt: f64) {
        match self.phase {
            DuelPhase::Scoring => self.resolve_stroke(),
            DuelPhase::OpponentTurn => {
                self.delay_remaining -= dt;
                if self.delay_remaining <= 0.0 {
                    self.opponent_attack();
                }
            }
            DuelPhase::PlayerTurn | DuelPhase::GameOver(_) => {}
        }
    }

    /// Duels are turn based; the countdown never decides them.
    fn on_countdown(&mut self) {}

    fn outcome(&self) -> Option<MinigameResult> {
        match self.phase {
            DuelPhase::GameOver(DuelOutcome::Victory) => Some(MinigameResult::success()),
            DuelPhase::GameOver(DuelOutcome::Defeat) => Some(MinigameResult::failure()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minigame_rules::CombatantHealth;
    use rand::SeedableRng;

    fn difficulty(level: i64) -> Difficulty {
        Difficulty::new(level).unwrap()
    }

    fn tuning_without_delay() -> MinigameTuning {
        let mut tuning = MinigameTuning::default();
        tuning.duel.turn_delay_secs = 0.0;
        tuning
    }

    fn duel(kind: MinigameKind) -> DuelEngine {
        DuelEngine::new(
            kind,
            difficulty(1),
            &tuning_without_delay(),
            ChaCha8Rng::seed_from_u64(3),
        )
    }

    fn two_segment_reference() -> Vec<Point> {
        vec![
            Point::new(100.0, 100.0),
            Point::new(300.0, 100.0),
            Point::new(300.0, 300.0),
        ]
    }

    /// 18 points on the first segment and 2 at distance 15 from the second: 95%.
    fn ninety_five_percent_stroke() -> Vec<Point> {
        let mut stroke: Vec<Point> = (0..18)
            .map(|i| Point::new(100.0 + f64::from(i) * 10.0, 102.0))
            .collect();
        stroke.push(Point::new(315.0, 215.0));
        stroke.push(Point::new(315.0, 250.0));
        stroke
    }

    fn far_stroke() -> Vec<Point> {
        vec![Point::new(700.0, 550.0), Point::new(760.0, 580.0)]
    }

    #[test]
    fn test_duel_starts_in_player_turn_with_reference() {
        let engine = duel(MinigameKind::GestureDuel);
        assert_eq!(engine.phase(), DuelPhase::PlayerTurn);
        assert!(engine.reference().len() >= 2);
        assert!(engine.stroke().is_empty());
        assert_eq!(engine.round(), 1);
        assert_eq!(engine.opponent().health.current(), 50);
        assert!(engine.outcome().is_none());
    }

    #[test]
    fn test_exceptional_stroke_damages_and_weakens() {
        let mut engine = duel(MinigameKind::GestureDuel);
        engine.set_reference(two_segment_reference());

        engine.submit_stroke(&ninety_five_percent_stroke());
        assert_eq!(engine.phase(), DuelPhase::Scoring);
        engine.on_frame(1.0 / 60.0);

        let report = engine.last_stroke();
        assert_eq!(report.map(|r| r.tier), Some(DamageTier::Exceptional));
        assert_eq!(report.map(|r| r.damage), Some(45));
        assert_eq!(engine.opponent().health.current(), 5);
        assert!(engine.opponent().has_status(StatusEffectType::Weakened));
        assert_eq!(engine.phase(), DuelPhase::OpponentTurn);
    }

    #[test]
    fn test_weakened_reduces_only_one_attack() {
        let mut engine = duel(MinigameKind::GestureDuel);
        let full = engine.profile().opponent_damage(difficulty(1));
        let reduced = engine.profile().weakened_damage(difficulty(1));
        assert!(reduced < full);

        engine.set_reference(two_segment_reference());
        engine.submit_stroke(&ninety_five_percent_stroke());
        engine.on_frame(0.0);
        engine.on_frame(0.0);
        assert_eq!(engine.player().health.current(), 100 - reduced);
        assert!(!engine.opponent().has_status(StatusEffectType::Weakened));
        assert_eq!(engine.phase(), DuelPhase::PlayerTurn);

        engine.set_reference(two_segment_reference());
        engine.submit_stroke(&far_stroke());
        engine.on_frame(0.0);
        assert_eq!(engine.last_stroke().map(|r| r.tier), Some(DamageTier::Miss));
        engine.on_frame(0.0);
        assert_eq!(engine.player().health.current(), 100 - reduced - full);
    }

    #[test]
    fn test_opponent_waits_for_turn_delay() {
        let mut tuning = MinigameTuning::default();
        tuning.duel.turn_delay_secs = 0.5;
        let mut engine = DuelEngine::new(
            MinigameKind::GestureDuel,
            difficulty(1),
            &tuning,
            ChaCha8Rng::seed_from_u64(5),
        );
        engine.set_reference(two_segment_reference());
        engine.submit_stroke(&far_stroke());
        engine.on_frame(0.125);
        for _ in 0..3 {
            engine.on_frame(0.125);
        }
        assert_eq!(engine.phase(), DuelPhase::OpponentTurn);
        assert_eq!(engine.player().health.current(), 100);
        engine.on_frame(0.125);
        assert_eq!(engine.phase(), DuelPhase::PlayerTurn);
        assert!(engine.player().health.current() < 100);
    }

    #[test]
    fn test_victory_when_opponent_depleted() {
        let mut engine = duel(MinigameKind::GestureDuel);
        for _ in 0..2 {
            engine.set_reference(two_segment_reference());
            engine.submit_stroke(&ninety_five_percent_stroke());
            engine.on_frame(0.0);
            engine.on_frame(0.0);
        }
        assert_eq!(engine.phase(), DuelPhase::GameOver(DuelOutcome::Victory));
        assert_eq!(engine.opponent().health.current(), 0);
        assert_eq!(engine.outcome(), Some(MinigameResult::success()));
    }

    #[test]
    fn test_defeat_and_health_never_negative() {
        let mut engine = duel(MinigameKind::FinalGestureDuel);
        for _ in 0..50 {
            if engine.outcome().is_some() {
                break;
            }
            engine.set_reference(two_segment_reference());
            engine.submit_stroke(&far_stroke());
            engine.on_frame(0.0);
            engine.on_frame(0.0);
        }
        assert_eq!(engine.phase(), DuelPhase::GameOver(DuelOutcome::Defeat));
        assert_eq!(engine.player().health.current(), 0);
        assert_eq!(engine.outcome(), Some(MinigameResult::failure()));
    }

    #[test]
    fn test_input_ignored_after_game_over() {
        let mut engine = duel(MinigameKind::GestureDuel);
        engine.opponent.health = CombatantHealth::new(1, 50);
        engine.set_reference(two_segment_reference());
        engine.submit_stroke(&ninety_five_percent_stroke());
        engine.on_frame(0.0);
        assert_eq!(engine.phase(), DuelPhase::GameOver(DuelOutcome::Victory));

        engine.apply_input(DuelInput::PointerDown(Point::new(1.0, 1.0)));
        engine.on_frame(0.0);
        assert!(!engine.is_drawing());
        assert_eq!(engine.player().health.current(), 100);
    }

    #[test]
    fn test_move_without_press_is_not_recorded() {
        let mut engine = duel(MinigameKind::GestureDuel);
        engine.apply_input(DuelInput::PointerMove(Point::new(5.0, 5.0)));
        engine.apply_input(DuelInput::PointerUp);
        assert!(engine.stroke().is_empty());
        assert_eq!(engine.phase(), DuelPhase::PlayerTurn);
    }

    #[test]
    fn test_first_depleted_pool_decides_batch() {
        let mut engine = duel(MinigameKind::GestureDuel);
        engine.player.health = CombatantHealth::new(10, 100);
        engine.opponent.health = CombatantHealth::new(10, 50);
        let outcome = engine.apply_damage_batch(&[
            Hit {
                target: DuelSide::Opponent,
                amount: 10,
            },
            Hit {
                target: DuelSide::Player,
                amount: 10,
            },
        ]);
        assert_eq!(outcome, Some(DuelOutcome::Victory));
        assert_eq!(engine.player().health.current(), 10);

        engine.player.health = CombatantHealth::new(10, 100);
        engine.opponent.health = CombatantHealth::new(10, 50);
        let outcome = engine.apply_damage_batch(&[
            Hit {
                target: DuelSide::Player,
                amount: 10,
            },
            Hit {
                target: DuelSide::Opponent,
                amount: 10,
            },
        ]);
        assert_eq!(outcome, Some(DuelOutcome::Defeat));
        assert_eq!(engine.opponent().health.current(), 10);

        engine.player.health = CombatantHealth::new(30, 100);
        engine.opponent.health = CombatantHealth::new(30, 50);
        let outcome = engine.apply_damage_batch(&[
            Hit {
                target: DuelSide::Player,
                amount: 10,
            },
            Hit {
                target: DuelSide::Opponent,
                amount: 10,
            },
        ]);
        assert_eq!(outcome, None);
    }

    #[test]
    fn test_generic_profile_uses_random_walk_and_resampling() {
        let tuning = tuning_without_delay();
        let mut engine = DuelEngine::with_profile(
            MinigameKind::GestureDuel,
            DuelProfile::generic(),
            difficulty(2),
            &tuning,
            ChaCha8Rng::seed_from_u64(11),
        );
        assert_eq!(engine.reference().len(), tuning.duel.random_walk.segments + 1);

        let reference = engine.reference().to_vec();
        engine.submit_stroke(&reference);
        engine.on_frame(0.0);
        let report = engine.last_stroke();
        assert_eq!(report.map(|r| r.accuracy), Some(100.0));
        // Generic duels never weaken.
        assert!(!engine.opponent().has_status(StatusEffectType::Weakened));
    }
}
