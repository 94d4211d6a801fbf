//! Arena entities: patrolling guards, collectible data, repairable parts and tools.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::EntityId;
use crate::geometry::Point;

/// Which way a guard is walking along its patrol path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatrolDirection {
    Forward,
    Backward,
}

impl PatrolDirection {
    /// Index step for this direction: `+1` or `-1`.
    pub fn sign(self) -> isize {
        match self {
            PatrolDirection::Forward => 1,
            PatrolDirection::Backward => -1,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            PatrolDirection::Forward => PatrolDirection::Backward,
            PatrolDirection::Backward => PatrolDirection::Forward,
        }
    }
}

/// A guard ping-ponging along a patrol path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Guard {
    pub id: EntityId,
    pub position: Point,
    pub patrol_path: Vec<Point>,
    /// Index of the waypoint the guard is walking towards.
    pub path_index: usize,
    pub direction: PatrolDirection,
}

impl Guard {
    /// Place a guard on the first waypoint, heading for the second.
    ///
    /// Returns `None` for an empty patrol path.
    pub fn new(id: EntityId, patrol_path: Vec<Point>) -> Option<Self> {
        let start = *patrol_path.first()?;
        let path_index = usize::from(patrol_path.len() > 1);
        Some(Self {
            id,
            position: start,
            patrol_path,
            path_index,
            direction: PatrolDirection::Forward,
        })
    }

    /// The waypoint currently targeted.
    pub fn target(&self) -> Option<Point> {
        self.patrol_path.get(self.path_index).copied()
    }

    /// Advance one tick at `speed` units per tick.
    ///
    /// Within one step of the target the guard snaps onto it and moves on to
    /// the next waypoint; running off either end reverses direction. The path
    /// is never wrapped.
    pub fn advance(&mut self, speed: f64) {
        let Some(target) = self.target() else {
            return;
        };

        if self.position.distance_to(target) <= speed {
            self.position = target;
            self.advance_index();
        } else {
            self.position = self.position.step_towards(target, speed);
        }
    }

    fn advance_index(&mut self) {
        let len = self.patrol_path.len();
        if len < 2 {
            return;
        }

        let next = self.path_index as isize + self.direction.sign();
        if next < 0 || next >= len as isize {
            self.direction = self.direction.reversed();
            self.path_index = (self.path_index as isize + self.direction.sign()) as usize;
        } else {
            self.path_index = next as usize;
        }
    }
}

/// A collectible worth `value` points; collected at most once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPoint {
    pub id: EntityId,
    pub position: Point,
    pub collected: bool,
    pub value: u32,
}

impl DataPoint {
    pub fn new(id: EntityId, position: Point, value: u32) -> Self {
        Self {
            id,
            position,
            collected: false,
            value,
        }
    }

    /// Mark as collected. Returns the value only the first time.
    pub fn collect(&mut self) -> Option<u32> {
        if self.collected {
            return None;
        }
        self.collected = true;
        Some(self.value)
    }
}

/// Names in the fixed repair tool catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ToolName {
    Wrench,
    Screwdriver,
    SolderingIron,
    Multimeter,
    Pliers,
    Hammer,
}

impl ToolName {
    /// Every tool in catalog order.
    pub const ALL: [ToolName; 6] = [
        ToolName::Wrench,
        ToolName::Screwdriver,
        ToolName::SolderingIron,
        ToolName::Multimeter,
        ToolName::Pliers,
        ToolName::Hammer,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ToolName::Wrench => "Wrench",
            ToolName::Screwdriver => "Screwdriver",
            ToolName::SolderingIron => "Soldering Iron",
            ToolName::Multimeter => "Multimeter",
            ToolName::Pliers => "Pliers",
            ToolName::Hammer => "Hammer",
        }
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A tool in the catalog. Not mutated during a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    pub id: EntityId,
    pub name: ToolName,
}

/// Result of applying a tool to a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairAttempt {
    Fixed,
    AlreadyFixed,
    WrongTool,
}

/// A broken part; `fixed` only ever goes from false to true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    pub id: EntityId,
    pub position: Point,
    pub fixed: bool,
    pub required_tools: BTreeSet<ToolName>,
}

impl Part {
    pub fn new(id: EntityId, position: Point, required_tools: BTreeSet<ToolName>) -> Self {
        Self {
            id,
            position,
            fixed: false,
            required_tools,
        }
    }

    /// Apply a tool. Any one of the required tools fixes the part.
    pub fn apply_tool(&mut self, tool: ToolName) -> RepairAttempt {
        if self.fixed {
            RepairAttempt::AlreadyFixed
        } else if self.required_tools.contains(&tool) {
            self.fixed = true;
            RepairAttempt::Fixed
        } else {
            RepairAttempt::WrongTool
        }
    }
}
