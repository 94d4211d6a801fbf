//! Duel combatants and their health pools.

use serde::{Deserialize, Serialize};

use crate::mechanics::StatusEffectType;

/// Health clamped to `[0, max]`; reaching 0 is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantHealth {
    current: u32,
    max: u32,
}

impl CombatantHealth {
    /// A full health pool.
    pub fn full(max: u32) -> Self {
        Self { current: max, max }
    }

    /// A pool with explicit current health, clamped to `max`.
    pub fn new(current: u32, max: u32) -> Self {
        Self {
            current: current.min(max),
            max,
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    /// Subtract damage, saturating at 0. Returns the damage actually taken.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        let taken = amount.min(self.current);
        self.current -= taken;
        taken
    }

    pub fn is_depleted(&self) -> bool {
        self.current == 0
    }
}

/// Status effects currently carried by a combatant.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StatusEffectComponent {
    pub active_effects: Vec<StatusEffectType>,
}

impl StatusEffectComponent {
    /// Apply an effect. Effects do not stack.
    pub fn apply(&mut self, effect: StatusEffectType) {
        if !self.has(effect) {
            self.active_effects.push(effect);
        }
    }

    pub fn has(&self, effect: StatusEffectType) -> bool {
        self.active_effects.contains(&effect)
    }

    /// Remove an effect, returning whether it was active.
    pub fn consume(&mut self, effect: StatusEffectType) -> bool {
        let before = self.active_effects.len();
        self.active_effects.retain(|e| *e != effect);
        self.active_effects.len() != before
    }
}

/// One side of a gesture duel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combatant {
    pub name: String,
    pub health: CombatantHealth,
    pub status_effects: StatusEffectComponent,
}

impl Combatant {
    /// Create a combatant at full health.
    pub fn new(name: impl Into<String>, max_health: u32) -> Self {
        Self {
            name: name.into(),
            health: CombatantHealth::full(max_health),
            status_effects: StatusEffectComponent::default(),
        }
    }

    /// Check if the combatant can still fight.
    pub fn is_alive(&self) -> bool {
        !self.health.is_depleted()
    }

    /// Check if the combatant has a specific status effect.
    pub fn has_status(&self, effect: StatusEffectType) -> bool {
        self.status_effects.has(effect)
    }
}
