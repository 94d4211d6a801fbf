//! Repair puzzle: pick the right tool for each broken part before time runs out.

use minigame_rules::{
    Arena, Difficulty, EntityId, MinigameKind, MinigameResult, MinigameTuning, Part,
    RepairAttempt, RepairTuning, TimeLimit, Tool, ToolName,
};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use crate::events::RepairInput;
use crate::session::Minigame;

/// Lifecycle of a repair session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RepairState {
    InProgress,
    Repaired,
    TimedOut,
}

/// A running repair puzzle.
#[derive(Debug, Clone)]
pub struct RepairEngine {
    tools: Vec<Tool>,
    parts: Vec<Part>,
    selected_tool: Option<ToolName>,
    time_remaining: u32,
    state: RepairState,
}

impl RepairEngine {
    /// Generate parts for `difficulty` and start the countdown at `time_limit`.
    pub fn new<R: Rng + ?Sized>(
        difficulty: Difficulty,
        time_limit: TimeLimit,
        tuning: &MinigameTuning,
        rng: &mut R,
    ) -> Self {
        let tools = tool_catalog(rng);
        let parts = generate_parts(difficulty, &tuning.arena, &tuning.repair, rng);
        debug!(parts = parts.len(), "repair puzzle generated");
        Self::from_parts(tools, parts, time_limit)
    }

    /// Start a puzzle over prepared parts.
    pub fn from_parts(tools: Vec<Tool>, parts: Vec<Part>, time_limit: TimeLimit) -> Self {
        let mut engine = Self {
            tools,
            parts,
            selected_tool: None,
            time_remaining: time_limit.seconds(),
            state: RepairState::InProgress,
        };
        engine.check_complete();
        engine
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn selected_tool(&self) -> Option<ToolName> {
        self.selected_tool
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn state(&self) -> RepairState {
        self.state
    }

    pub fn fixed_count(&self) -> usize {
        self.parts.iter().filter(|part| part.fixed).count()
    }

    fn select_part(&mut self, part_id: EntityId) {
        let Some(tool) = self.selected_tool else {
            debug!(%part_id, "part selected without a tool");
            return;
        };
        let Some(part) = self.parts.iter_mut().find(|part| part.id == part_id) else {
            warn!(%part_id, "unknown part selected");
            return;
        };

        match part.apply_tool(tool) {
            RepairAttempt::Fixed => {
                info!(%part_id, %tool, "part repaired");
                self.check_complete();
            }
            RepairAttempt::AlreadyFixed => debug!(%part_id, "part already repaired"),
            RepairAttempt::WrongTool => debug!(%part_id, %tool, "wrong tool for part"),
        }
    }

    fn check_complete(&mut self) {
        if self.state == RepairState::InProgress && self.parts.iter().all(|part| part.fixed) {
            self.state = RepairState::Repaired;
            info!(
                time_remaining = self.time_remaining,
                "repair puzzle complete"
            );
        }
    }
}

impl Minigame for RepairEngine {
    type Input = RepairInput;

    fn kind(&self) -> MinigameKind {
        MinigameKind::RepairPuzzle
    }

    fn apply_input(&mut self, input: RepairInput) {
        if self.state != RepairState::InProgress {
            debug!(?input, "repair input after completion ignored");
            return;
        }

        match input {
            RepairInput::SelectTool(tool) => self.selected_tool = Some(tool),
            RepairInput::SelectPart(part_id) => self.select_part(part_id),
        }
    }

    fn on_frame(&mut self, _dt: f64) {}

    fn on_countdown(&mut self) {
        if self.state != RepairState::InProgress {
            return;
        }

        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining == 0 {
            self.state = RepairState::TimedOut;
            info!(
                fixed = self.fixed_count(),
                total = self.parts.len(),
                "repair puzzle timed out"
            );
        }
    }

    fn outcome(&self) -> Option<MinigameResult> {
        match self.state {
            RepairState::InProgress => None,
            RepairState::Repaired => Some(MinigameResult::success()),
            RepairState::TimedOut => Some(MinigameResult::failure()),
        }
    }
}

/// The fixed tool catalog, one tool per [`ToolName`].
pub fn tool_catalog<R: Rng + ?Sized>(rng: &mut R) -> Vec<Tool> {
    ToolName::ALL
        .iter()
        .map(|name| Tool {
            id: EntityId::from_rng(rng),
            name: *name,
        })
        .collect()
}

/// Generate `min(base + difficulty, max)` parts, each needing a distinct
/// random subset of the catalog.
pub fn generate_parts<R: Rng + ?Sized>(
    difficulty: Difficulty,
    arena: &Arena,
    tuning: &RepairTuning,
    rng: &mut R,
) -> Vec<Part> {
    let tools_per_part = tuning.tools_per_part(difficulty);
    (0..tuning.part_count(difficulty))
        .map(|_| {
            let id = EntityId::from_rng(rng);
            let position = arena.random_point(rng, tuning.padding);
            let required: BTreeSet<ToolName> = ToolName::ALL
                .choose_multiple(rng, tools_per_part)
                .copied()
                .collect();
            Part::new(id, position, required)
        })
        .collect()
}
