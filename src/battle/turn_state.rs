//! Turn state: active pointer, turn counter, per-turn resources and
//! battle outcome

use serde::{Deserialize, Serialize};

use crate::battle::constants::{ATTACK_AP_COST, MOVE_AP_COST};

/// Battle outcome from the player's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BattleOutcome {
    #[default]
    Undecided,
    Victory,
    Defeat,
}

/// Who is issuing a command
///
/// Player commands are only accepted for player-controlled units, AI
/// commands only for the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Controller {
    Player,
    Ai,
}

/// Resources of the active unit, reset whenever the active unit changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TurnResources {
    pub action_points: u32,
    pub max_action_points: u32,
    pub has_moved: bool,
}

impl TurnResources {
    /// Fresh resources for a unit starting its turn
    pub fn fresh(max_action_points: u32) -> Self {
        Self {
            action_points: max_action_points,
            max_action_points,
            has_moved: false,
        }
    }

    /// Reinstate saved resources, clamping AP into [0, max]
    pub fn restored(action_points: i64, max_action_points: u32, has_moved: bool) -> Self {
        let clamped = action_points.clamp(0, max_action_points as i64) as u32;
        Self {
            action_points: clamped,
            max_action_points,
            has_moved,
        }
    }

    pub fn can_move(&self) -> bool {
        !self.has_moved && self.action_points >= MOVE_AP_COST
    }

    pub fn can_attack(&self) -> bool {
        self.action_points >= ATTACK_AP_COST
    }

    /// Spend the move cost and mark the unit as moved
    pub fn spend_move(&mut self) {
        self.action_points = self.action_points.saturating_sub(MOVE_AP_COST);
        self.has_moved = true;
    }

    pub fn spend_attack(&mut self) {
        self.action_points = self.action_points.saturating_sub(ATTACK_AP_COST);
    }
}

/// The scheduler's turn bookkeeping
#[derive(Debug, Clone, Default)]
pub struct TurnState {
    /// Index into the roster's turn order
    pub active_index: Option<usize>,
    /// Increments every time the active index wraps around
    pub turn: u32,
    pub resources: TurnResources,
    pub ended: bool,
    pub outcome: BattleOutcome,
}

impl TurnState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Freeze the state once an outcome is known
    pub fn end(&mut self, outcome: BattleOutcome) {
        self.ended = true;
        self.outcome = outcome;
        self.active_index = None;
        self.turn = 0;
        self.resources = TurnResources::default();
    }
}

/// Reference-counted interaction gate
///
/// While held, end-turn requests are deferred rather than dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct InteractionLock {
    depth: u32,
}

impl InteractionLock {
    pub fn acquire(&mut self) {
        self.depth = self.depth.saturating_add(1);
    }

    /// Returns true when this release opened the gate
    pub fn release(&mut self) -> bool {
        if self.depth == 0 {
            return false;
        }
        self.depth -= 1;
        self.depth == 0
    }

    pub fn is_locked(&self) -> bool {
        self.depth > 0
    }
}
