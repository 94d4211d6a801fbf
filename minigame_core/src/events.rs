//! Input events delivered by the presentation layer.
//!
//! Inputs are queued by the session host and applied at the start of the next
//! tick, never in the middle of one.

use minigame_rules::{EntityId, Point, ToolName};
use serde::{Deserialize, Serialize};

/// Pointer events for drawing duel strokes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DuelInput {
    /// Pointer pressed; starts a new stroke.
    PointerDown(Point),
    /// Pointer moved while pressed.
    PointerMove(Point),
    /// Pointer released; the stroke is complete.
    PointerUp,
}

/// Selections made in the repair puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepairInput {
    /// Make this tool the single active selection.
    SelectTool(ToolName),
    /// Apply the active tool to a part.
    SelectPart(EntityId),
}

/// Movement keys for the infiltration player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Key state changes and actions in the infiltration minigame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfiltrationInput {
    KeyDown(Direction),
    KeyUp(Direction),
    /// Flip the hidden state.
    ToggleHide,
}

/// Any input a session can receive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MinigameInput {
    Duel(DuelInput),
    Repair(RepairInput),
    Infiltration(InfiltrationInput),
}

impl From<DuelInput> for MinigameInput {
    fn from(input: DuelInput) -> Self {
        MinigameInput::Duel(input)
    }
}

impl From<RepairInput> for MinigameInput {
    fn from(input: RepairInput) -> Self {
        MinigameInput::Repair(input)
    }
}

impl From<InfiltrationInput> for MinigameInput {
    fn from(input: InfiltrationInput) -> Self {
        MinigameInput::Infiltration(input)
    }
}
