//! Tuning for every minigame, loadable from TOML.
//!
//! Each section defaults to the shipped balance, so a document only needs the
//! keys it overrides:
//!
//! ```toml
//! [infiltration]
//! target_score = 120
//! capture_radius = 20.0
//!
//! [duel.final_showdown]
//! opponent_max_health = 120
//! ```
//!
//! Loaded documents are validated; values that would stall the scheduler or
//! break arena geometry are rejected as [`RulesError::InvalidConfig`].

use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_3;
use std::time::Duration;

use crate::error::RulesError;
use crate::geometry::{Arena, ScoringStrategy};
use crate::mechanics::{DamageScale, DamageTiers, Difficulty, MinigameRequest};

/// All tuning knobs, grouped per minigame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinigameTuning {
    /// Highest difficulty a session may be started with.
    pub max_difficulty: u32,
    pub arena: Arena,
    pub scheduler: SchedulerConfig,
    pub duel: DuelTuning,
    pub repair: RepairTuning,
    pub infiltration: InfiltrationTuning,
}

impl Default for MinigameTuning {
    fn default() -> Self {
        Self {
            max_difficulty: 10,
            arena: Arena::default(),
            scheduler: SchedulerConfig::default(),
            duel: DuelTuning::default(),
            repair: RepairTuning::default(),
            infiltration: InfiltrationTuning::default(),
        }
    }
}

impl MinigameTuning {
    /// Parse and validate a TOML document; absent keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, RulesError> {
        let tuning: Self = toml::from_str(source)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values no session can run with.
    pub fn validate(&self) -> Result<(), RulesError> {
        if !(Difficulty::MIN.level()..=Difficulty::MAX.level()).contains(&self.max_difficulty) {
            return Err(RulesError::invalid_config(format!(
                "max_difficulty must be between {} and {}, got {}",
                Difficulty::MIN.level(),
                Difficulty::MAX.level(),
                self.max_difficulty
            )));
        }
        positive("arena.width", self.arena.width)?;
        positive("arena.height", self.arena.height)?;
        self.scheduler.validate()?;
        self.duel.validate()?;
        self.repair.validate()?;
        self.infiltration.validate()
    }

    /// Check a validated request against the limits of this tuning.
    pub fn admit(&self, request: &MinigameRequest) -> Result<(), RulesError> {
        let level = request.difficulty.level();
        if level > self.max_difficulty {
            return Err(RulesError::InvalidDifficulty(i64::from(level)));
        }
        Ok(())
    }
}

fn finite(name: &str, value: f64) -> Result<(), RulesError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(RulesError::invalid_config(format!(
            "{name} must be a finite number, got {value}"
        )))
    }
}

fn non_negative(name: &str, value: f64) -> Result<(), RulesError> {
    finite(name, value)?;
    if value < 0.0 {
        return Err(RulesError::invalid_config(format!(
            "{name} must not be negative, got {value}"
        )));
    }
    Ok(())
}

fn positive(name: &str, value: f64) -> Result<(), RulesError> {
    finite(name, value)?;
    if value <= 0.0 {
        return Err(RulesError::invalid_config(format!(
            "{name} must be positive, got {value}"
        )));
    }
    Ok(())
}

fn at_least_one(name: &str, value: u64) -> Result<(), RulesError> {
    if value == 0 {
        return Err(RulesError::invalid_config(format!("{name} must be at least 1")));
    }
    Ok(())
}

/// Tick rates driving every session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Simulation steps per second.
    pub frame_rate_hz: u32,
    /// Seconds between countdown ticks.
    pub countdown_interval_secs: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            frame_rate_hz: 60,
            countdown_interval_secs: 1,
        }
    }
}

impl SchedulerConfig {
    /// Length of one frame, or `None` when the rate cannot be represented.
    pub fn frame_interval(&self) -> Option<Duration> {
        if self.frame_rate_hz == 0 {
            return None;
        }
        Some(Duration::from_secs(1) / self.frame_rate_hz).filter(|interval| !interval.is_zero())
    }

    pub fn countdown_interval(&self) -> Option<Duration> {
        match self.countdown_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(u64::from(secs))),
        }
    }

    pub fn validate(&self) -> Result<(), RulesError> {
        if self.frame_interval().is_none() {
            return Err(RulesError::invalid_config(format!(
                "frame_rate_hz must be between 1 and 1000000000, got {}",
                self.frame_rate_hz
            )));
        }
        if self.countdown_interval().is_none() {
            return Err(RulesError::invalid_config(
                "countdown_interval_secs must be positive",
            ));
        }
        Ok(())
    }
}

/// Where a duel takes its reference gestures from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternSource {
    /// The small set of hand-authored patterns.
    Catalog,
    /// Procedural random-walk strokes.
    RandomWalk,
}

/// Balance for one duel variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuelProfile {
    pub pattern_source: PatternSource,
    pub scoring: ScoringStrategy,
    pub player_max_health: u32,
    pub opponent_max_health: u32,
    pub tiers: DamageTiers,
    pub opponent_attack: DamageScale,
    /// Whether an exceptional stroke leaves the opponent weakened.
    pub weakens_on_exceptional: bool,
    /// Multiplier applied to a weakened opponent's attack.
    pub weakened_factor: f64,
}

impl DuelProfile {
    /// The light duel launched by ordinary scene choices.
    pub fn standard() -> Self {
        Self {
            pattern_source: PatternSource::Catalog,
            scoring: ScoringStrategy::NearestSegment,
            player_max_health: 100,
            opponent_max_health: 50,
            tiers: DamageTiers::default(),
            opponent_attack: DamageScale::new(10, 5),
            weakens_on_exceptional: true,
            weakened_factor: 0.5,
        }
    }

    /// The escalated duel that closes the story.
    pub fn final_showdown() -> Self {
        Self {
            opponent_max_health: 100,
            opponent_attack: DamageScale::new(15, 6),
            ..Self::standard()
        }
    }

    /// Procedurally generated strokes scored by resampled deviation.
    pub fn generic() -> Self {
        Self {
            pattern_source: PatternSource::RandomWalk,
            scoring: ScoringStrategy::resampled(),
            weakens_on_exceptional: false,
            ..Self::standard()
        }
    }

    /// Damage the opponent deals, before weakening.
    pub fn opponent_damage(&self, difficulty: Difficulty) -> u32 {
        self.opponent_attack.at(difficulty)
    }

    /// Damage the opponent deals while weakened, rounded down.
    pub fn weakened_damage(&self, difficulty: Difficulty) -> u32 {
        let reduced = f64::from(self.opponent_damage(difficulty)) * self.weakened_factor;
        reduced.max(0.0).floor() as u32
    }

    fn validate(&self, name: &str) -> Result<(), RulesError> {
        at_least_one(
            &format!("duel.{name}.player_max_health"),
            u64::from(self.player_max_health),
        )?;
        at_least_one(
            &format!("duel.{name}.opponent_max_health"),
            u64::from(self.opponent_max_health),
        )?;
        non_negative(&format!("duel.{name}.weakened_factor"), self.weakened_factor)?;
        for (tier, rule) in [
            ("exceptional", self.tiers.exceptional),
            ("strong", self.tiers.strong),
            ("normal", self.tiers.normal),
        ] {
            finite(&format!("duel.{name}.tiers.{tier}.threshold"), rule.threshold)?;
        }
        Ok(())
    }
}

impl Default for DuelProfile {
    fn default() -> Self {
        Self::standard()
    }
}

/// A duel profile as written in a tuning document. Absent keys fall back to
/// the profile being overridden, not to the standard one.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct DuelProfileOverrides {
    pattern_source: Option<PatternSource>,
    scoring: Option<ScoringStrategy>,
    player_max_health: Option<u32>,
    opponent_max_health: Option<u32>,
    tiers: Option<DamageTiers>,
    opponent_attack: Option<DamageScale>,
    weakens_on_exceptional: Option<bool>,
    weakened_factor: Option<f64>,
}

impl DuelProfileOverrides {
    fn apply(self, base: DuelProfile) -> DuelProfile {
        DuelProfile {
            pattern_source: self.pattern_source.unwrap_or(base.pattern_source),
            scoring: self.scoring.unwrap_or(base.scoring),
            player_max_health: self.player_max_health.unwrap_or(base.player_max_health),
            opponent_max_health: self.opponent_max_health.unwrap_or(base.opponent_max_health),
            tiers: self.tiers.unwrap_or(base.tiers),
            opponent_attack: self.opponent_attack.unwrap_or(base.opponent_attack),
            weakens_on_exceptional: self
                .weakens_on_exceptional
                .unwrap_or(base.weakens_on_exceptional),
            weakened_factor: self.weakened_factor.unwrap_or(base.weakened_factor),
        }
    }
}

/// Parameters for random-walk gesture generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomWalkConfig {
    pub segments: usize,
    pub step_min: f64,
    pub step_max: f64,
    /// Distance kept from the arena border.
    pub padding: f64,
}

impl Default for RandomWalkConfig {
    fn default() -> Self {
        Self {
            segments: 3,
            step_min: 80.0,
            step_max: 160.0,
            padding: 50.0,
        }
    }
}

impl RandomWalkConfig {
    fn validate(&self) -> Result<(), RulesError> {
        non_negative("duel.random_walk.step_min", self.step_min)?;
        non_negative("duel.random_walk.step_max", self.step_max)?;
        non_negative("duel.random_walk.padding", self.padding)?;
        at_least_one("duel.random_walk.segments", self.segments as u64)
    }
}

/// Gesture duel tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "DuelTuningDocument")]
pub struct DuelTuning {
    pub standard: DuelProfile,
    pub final_showdown: DuelProfile,
    pub generic: DuelProfile,
    /// Pause between the player's hit and the opponent's answer, in seconds.
    pub turn_delay_secs: f64,
    pub random_walk: RandomWalkConfig,
}

impl Default for DuelTuning {
    fn default() -> Self {
        Self {
            standard: DuelProfile::standard(),
            final_showdown: DuelProfile::final_showdown(),
            generic: DuelProfile::generic(),
            turn_delay_secs: 1.0,
            random_walk: RandomWalkConfig::default(),
        }
    }
}

impl DuelTuning {
    fn validate(&self) -> Result<(), RulesError> {
        self.standard.validate("standard")?;
        self.final_showdown.validate("final_showdown")?;
        self.generic.validate("generic")?;
        non_negative("duel.turn_delay_secs", self.turn_delay_secs)?;
        self.random_walk.validate()
    }
}

/// Duel tuning as written in a tuning document. Each profile overrides its
/// own defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DuelTuningDocument {
    standard: DuelProfileOverrides,
    final_showdown: DuelProfileOverrides,
    generic: DuelProfileOverrides,
    turn_delay_secs: Option<f64>,
    random_walk: Option<RandomWalkConfig>,
}

impl From<DuelTuningDocument> for DuelTuning {
    fn from(document: DuelTuningDocument) -> Self {
        let defaults = DuelTuning::default();
        Self {
            standard: document.standard.apply(defaults.standard),
            final_showdown: document.final_showdown.apply(defaults.final_showdown),
            generic: document.generic.apply(defaults.generic),
            turn_delay_secs: document.turn_delay_secs.unwrap_or(defaults.turn_delay_secs),
            random_walk: document.random_walk.unwrap_or(defaults.random_walk),
        }
    }
}

/// Repair puzzle tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairTuning {
    pub base_parts: u32,
    pub max_parts: u32,
    pub max_tools_per_part: u32,
    pub padding: f64,
}

impl Default for RepairTuning {
    fn default() -> Self {
        Self {
            base_parts: 3,
            max_parts: 6,
            max_tools_per_part: 2,
            padding: 60.0,
        }
    }
}

impl RepairTuning {
    fn validate(&self) -> Result<(), RulesError> {
        at_least_one("repair.max_parts", u64::from(self.max_parts))?;
        at_least_one("repair.max_tools_per_part", u64::from(self.max_tools_per_part))?;
        non_negative("repair.padding", self.padding)
    }

    /// `min(base + difficulty, max)` parts.
    pub fn part_count(&self, difficulty: Difficulty) -> usize {
        self.base_parts
            .saturating_add(difficulty.level())
            .min(self.max_parts) as usize
    }

    /// `min(1 + floor(difficulty / 2), max)` tools per part.
    pub fn tools_per_part(&self, difficulty: Difficulty) -> usize {
        (1 + difficulty.level() / 2).min(self.max_tools_per_part) as usize
    }
}

/// Stealth infiltration tuning. Distances in arena units.
///
/// Speeds are arena units per frame and were balanced for the default 60 Hz
/// frame rate; the engine scales them by the actual frame length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfiltrationTuning {
    pub player_speed: f64,
    pub guard_base_speed: f64,
    pub guard_speed_per_difficulty: f64,
    pub pickup_radius: f64,
    pub capture_radius: f64,
    pub target_score: u32,
    pub data_value_min: u32,
    pub data_value_max: u32,
    pub patrol_points_min: usize,
    pub patrol_points_max: usize,
    pub patrol_step_min: f64,
    pub patrol_step_max: f64,
    /// Largest heading change between two patrol legs, in radians.
    pub patrol_max_turn: f64,
    pub padding: f64,
}

impl Default for InfiltrationTuning {
    fn default() -> Self {
        Self {
            player_speed: 3.0,
            guard_base_speed: 1.0,
            guard_speed_per_difficulty: 0.25,
            pickup_radius: 20.0,
            capture_radius: 25.0,
            target_score: 100,
            data_value_min: 10,
            data_value_max: 25,
            patrol_points_min: 3,
            patrol_points_max: 5,
            patrol_step_min: 60.0,
            patrol_step_max: 140.0,
            patrol_max_turn: FRAC_PI_3,
            padding: 30.0,
        }
    }
}

impl InfiltrationTuning {
    fn validate(&self) -> Result<(), RulesError> {
        for (name, value) in [
            ("infiltration.player_speed", self.player_speed),
            ("infiltration.guard_base_speed", self.guard_base_speed),
            ("infiltration.guard_speed_per_difficulty", self.guard_speed_per_difficulty),
            ("infiltration.pickup_radius", self.pickup_radius),
            ("infiltration.capture_radius", self.capture_radius),
            ("infiltration.patrol_step_min", self.patrol_step_min),
            ("infiltration.patrol_step_max", self.patrol_step_max),
            ("infiltration.patrol_max_turn", self.patrol_max_turn),
            ("infiltration.padding", self.padding),
        ] {
            non_negative(name, value)?;
        }
        Ok(())
    }

    /// `difficulty + 2` guards.
    pub fn guard_count(&self, difficulty: Difficulty) -> usize {
        difficulty.level() as usize + 2
    }

    /// `difficulty * 4 + 3` data points.
    pub fn data_point_count(&self, difficulty: Difficulty) -> usize {
        difficulty.level() as usize * 4 + 3
    }

    pub fn guard_speed(&self, difficulty: Difficulty) -> f64 {
        self.guard_base_speed + f64::from(difficulty.level()) * self.guard_speed_per_difficulty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn difficulty(level: i64) -> Difficulty {
        Difficulty::new(level).unwrap()
    }

    #[test]
    fn test_repair_counts() {
        let tuning = RepairTuning::default();
        assert_eq!(tuning.part_count(difficulty(1)), 4);
        assert_eq!(tuning.part_count(difficulty(5)), 6);
        assert_eq!(tuning.tools_per_part(difficulty(1)), 1);
        assert_eq!(tuning.tools_per_part(difficulty(2)), 2);
        assert_eq!(tuning.tools_per_part(difficulty(9)), 2);
    }

    #[test]
    fn test_infiltration_counts() {
        let tuning = InfiltrationTuning::default();
        assert_eq!(tuning.guard_count(difficulty(1)), 3);
        assert_eq!(tuning.data_point_count(difficulty(1)), 7);
        assert_eq!(tuning.data_point_count(difficulty(3)), 15);
        assert!((tuning.guard_speed(difficulty(2)) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_weakened_damage_halves() {
        let profile = DuelProfile::standard();
        assert_eq!(profile.opponent_damage(difficulty(1)), 15);
        assert_eq!(profile.weakened_damage(difficulty(1)), 7);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let tuning = MinigameTuning::from_toml_str(
            r#"
            [arena]
            width = 1024.0
            height = 768.0

            [infiltration]
            target_score = 120
            "#,
        );
        let tuning = match tuning {
            Ok(tuning) => tuning,
            Err(err) => panic!("valid tuning rejected: {err}"),
        };
        assert_eq!(tuning.arena, Arena::new(1024.0, 768.0));
        assert_eq!(tuning.infiltration.target_score, 120);
        assert_eq!(tuning.infiltration.capture_radius, 25.0);
        assert_eq!(tuning.repair, RepairTuning::default());
        assert_eq!(tuning.duel.final_showdown, DuelProfile::final_showdown());
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(MinigameTuning::from_toml_str(""), Ok(MinigameTuning::default()));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = MinigameTuning::from_toml_str("[repair]\nbase_parts = \"many\"");
        assert!(matches!(result, Err(RulesError::InvalidConfig(_))));
    }

    #[test]
    fn test_partial_duel_profile_overrides_keep_own_defaults() {
        let tuning = MinigameTuning::from_toml_str(
            r#"
            [duel.standard]
            opponent_max_health = 80

            [duel.final_showdown]
            player_max_health = 120
            "#,
        )
        .unwrap();

        assert_eq!(tuning.duel.standard.opponent_max_health, 80);
        assert_eq!(tuning.duel.standard.player_max_health, 100);
        assert_eq!(tuning.duel.standard.pattern_source, PatternSource::Catalog);

        let final_showdown = tuning.duel.final_showdown;
        assert_eq!(final_showdown.player_max_health, 120);
        assert_eq!(final_showdown.opponent_max_health, 100);
        assert_eq!(final_showdown.opponent_attack, DamageScale::new(15, 6));

        assert_eq!(tuning.duel.generic, DuelProfile::generic());
        assert_eq!(tuning.duel.turn_delay_secs, 1.0);
    }

    #[test]
    fn test_duel_scalars_override_without_touching_profiles() {
        let tuning = MinigameTuning::from_toml_str("[duel]\nturn_delay_secs = 0.5").unwrap();
        assert_eq!(tuning.duel.turn_delay_secs, 0.5);
        assert_eq!(tuning.duel.final_showdown, DuelProfile::final_showdown());
        assert_eq!(tuning.duel.random_walk, RandomWalkConfig::default());
    }

    #[test]
    fn test_unusable_values_rejected() {
        let documents = [
            "[arena]\nwidth = nan",
            "[arena]\nheight = inf",
            "[arena]\nwidth = 0.0",
            "[scheduler]\nframe_rate_hz = 2000000000",
            "[scheduler]\nframe_rate_hz = 0",
            "[scheduler]\ncountdown_interval_secs = 0",
            "[infiltration]\nplayer_speed = nan",
            "[infiltration]\ncapture_radius = -1.0",
            "[infiltration]\npatrol_step_max = inf",
            "[duel]\nturn_delay_secs = nan",
            "[duel.random_walk]\nstep_min = -inf",
            "[duel.generic]\nweakened_factor = nan",
            "[duel.standard]\nopponent_max_health = 0",
            "[repair]\nmax_tools_per_part = 0",
            "max_difficulty = 0",
            "max_difficulty = 101",
        ];
        for document in documents {
            let result = MinigameTuning::from_toml_str(document);
            assert!(
                matches!(result, Err(RulesError::InvalidConfig(_))),
                "{document:?} gave {result:?}"
            );
        }
    }

    #[test]
    fn test_admit_checks_max_difficulty() {
        let tuning = MinigameTuning::default();
        let easy = MinigameRequest::new(10, 60, crate::MinigameKind::RepairPuzzle).unwrap();
        let hard = MinigameRequest::new(11, 60, crate::MinigameKind::RepairPuzzle).unwrap();
        assert_eq!(tuning.admit(&easy), Ok(()));
        assert_eq!(tuning.admit(&hard), Err(RulesError::InvalidDifficulty(11)));
    }

    #[test]
    fn test_default_tuning_is_valid() {
        assert_eq!(MinigameTuning::default().validate(), Ok(()));
    }
}
