//! Game mechanics shared by the minigames: difficulty, time limits, minigame
//! kinds, damage tiers and the result reported back to the story layer.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::RulesError;

/// Status effects that can be applied to duel combatants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusEffectType {
    /// Reduces the next attack made by the carrier; consumed by that attack.
    Weakened,
}

/// Difficulty level between 1 and [`Difficulty::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Difficulty(u32);

impl Difficulty {
    /// The easiest difficulty.
    pub const MIN: Difficulty = Difficulty(1);

    /// The hardest difficulty any tuning may allow. World sizes grow linearly
    /// with the level, so it is capped.
    pub const MAX: Difficulty = Difficulty(100);

    /// Validate a raw difficulty.
    pub fn new(level: i64) -> Result<Self, RulesError> {
        match u32::try_from(level) {
            Ok(level) if (Self::MIN.0..=Self::MAX.0).contains(&level) => Ok(Self(level)),
            _ => Err(RulesError::InvalidDifficulty(level)),
        }
    }

    pub fn level(self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for Difficulty {
    type Error = RulesError;

    fn try_from(level: i64) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

impl From<Difficulty> for u32 {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.0
    }
}

/// Session time limit in whole seconds, always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct TimeLimit(u32);

impl TimeLimit {
    /// Validate a raw time limit in seconds.
    pub fn new(seconds: i64) -> Result<Self, RulesError> {
        match u32::try_from(seconds) {
            Ok(seconds) if seconds > 0 => Ok(Self(seconds)),
            _ => Err(RulesError::InvalidTimeLimit(seconds)),
        }
    }

    pub fn seconds(self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for TimeLimit {
    type Error = RulesError;

    fn try_from(seconds: i64) -> Result<Self, Self::Error> {
        Self::new(seconds)
    }
}

impl From<TimeLimit> for u32 {
    fn from(limit: TimeLimit) -> Self {
        limit.0
    }
}

/// The minigames a scene choice can launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MinigameKind {
    GestureDuel,
    FinalGestureDuel,
    RepairPuzzle,
    StealthInfiltration,
}

impl MinigameKind {
    pub const ALL: [MinigameKind; 4] = [
        MinigameKind::GestureDuel,
        MinigameKind::FinalGestureDuel,
        MinigameKind::RepairPuzzle,
        MinigameKind::StealthInfiltration,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MinigameKind::GestureDuel => "GestureDuel",
            MinigameKind::FinalGestureDuel => "FinalGestureDuel",
            MinigameKind::RepairPuzzle => "RepairPuzzle",
            MinigameKind::StealthInfiltration => "StealthInfiltration",
        }
    }
}

impl std::fmt::Display for MinigameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MinigameKind {
    type Err = RulesError;

    /// Accepts the canonical names and their snake_case forms, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().to_lowercase() == normalized)
            .ok_or_else(|| RulesError::UnknownMinigame(s.to_string()))
    }
}

/// Raw request payload attached to a scene choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinigameRequestPayload {
    pub difficulty: i64,
    pub time_limit: i64,
    pub engine_type: String,
}

/// A validated request to run one minigame session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinigameRequest {
    pub difficulty: Difficulty,
    pub time_limit: TimeLimit,
    pub kind: MinigameKind,
}

impl MinigameRequest {
    /// Validate raw parameters. Nothing is created on error.
    pub fn new(difficulty: i64, time_limit: i64, kind: MinigameKind) -> Result<Self, RulesError> {
        Ok(Self {
            difficulty: Difficulty::new(difficulty)?,
            time_limit: TimeLimit::new(time_limit)?,
            kind,
        })
    }

    /// Validate a raw payload, including its engine type name.
    pub fn from_payload(payload: &MinigameRequestPayload) -> Result<Self, RulesError> {
        let kind = payload.engine_type.parse()?;
        Self::new(payload.difficulty, payload.time_limit, kind)
    }

    /// Decode and validate a JSON payload such as
    /// `{"difficulty": 1, "timeLimit": 60, "engineType": "RepairPuzzle"}`.
    pub fn from_json(json: &str) -> Result<Self, RulesError> {
        let payload: MinigameRequestPayload = serde_json::from_str(json)?;
        Self::from_payload(&payload)
    }
}

/// The single value a session reports back to the story layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MinigameResult {
    pub success: bool,
}

impl MinigameResult {
    pub const fn success() -> Self {
        Self { success: true }
    }

    pub const fn failure() -> Self {
        Self { success: false }
    }
}

/// Quality of a duel stroke, derived from its accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageTier {
    Exceptional,
    Strong,
    Normal,
    Miss,
}

/// Damage that grows with difficulty: `base + difficulty * per_difficulty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageScale {
    pub base: u32,
    pub per_difficulty: u32,
}

impl DamageScale {
    pub const fn new(base: u32, per_difficulty: u32) -> Self {
        Self {
            base,
            per_difficulty,
        }
    }

    /// Damage at the given difficulty.
    pub fn at(&self, difficulty: Difficulty) -> u32 {
        self.base
            .saturating_add(difficulty.level().saturating_mul(self.per_difficulty))
    }
}

/// A tier reached when accuracy is strictly above `threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierRule {
    pub threshold: f64,
    pub damage: DamageScale,
}

/// Accuracy to damage mapping for player strokes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageTiers {
    pub exceptional: TierRule,
    pub strong: TierRule,
    pub normal: TierRule,
}

impl Default for DamageTiers {
    fn default() -> Self {
        Self {
            exceptional: TierRule {
                threshold: 90.0,
                damage: DamageScale::new(40, 5),
            },
            strong: TierRule {
                threshold: 80.0,
                damage: DamageScale::new(25, 5),
            },
            normal: TierRule {
                threshold: 60.0,
                damage: DamageScale::new(15, 3),
            },
        }
    }
}

impl DamageTiers {
    /// Classify an accuracy percentage.
    pub fn classify(&self, accuracy: f64) -> DamageTier {
        if accuracy > self.exceptional.threshold {
            DamageTier::Exceptional
        } else if accuracy > self.strong.threshold {
            DamageTier::Strong
        } else if accuracy > self.normal.threshold {
            DamageTier::Normal
        } else {
            DamageTier::Miss
        }
    }

    /// Damage dealt by a tier at the given difficulty.
    pub fn damage(&self, tier: DamageTier, difficulty: Difficulty) -> u32 {
        match tier {
            DamageTier::Exceptional => self.exceptional.damage.at(difficulty),
            DamageTier::Strong => self.strong.damage.at(difficulty),
            DamageTier::Normal => self.normal.damage.at(difficulty),
            DamageTier::Miss => 0,
        }
    }
}
