//! Persisted battle state
//!
//! Snapshots hold plain data only: ids, coordinates and stats. They are
//! written as JSON; resolving them back into live records happens in
//! `session::restore`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::battle::grid::TileCoord;
use crate::battle::units::UnitStats;
use crate::core::error::Result;
use crate::core::types::{DefinitionId, Team, UnitId};

/// Tile coordinate written for units that are not on the board
pub const UNPLACED_TILE: i32 = -1;

/// Which phase of the battle screen the save was made in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseTag {
    Placement,
    Battle,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TurnSnapshot {
    #[serde(default)]
    pub phase: PhaseTag,
    pub turn: u32,
    /// Active unit's instance id
    #[serde(default)]
    pub active_instance_id: Option<UnitId>,
    // Fallback when the instance id no longer matches
    #[serde(default)]
    pub active_definition: Option<DefinitionId>,
    #[serde(default)]
    pub active_team: Option<Team>,
    /// May be out of range in hand-edited or stale saves; clamped on restore
    #[serde(default)]
    pub action_points: i64,
    #[serde(default)]
    pub max_action_points: u32,
    #[serde(default)]
    pub has_moved: bool,
}

/// One unit as it stood when the save was made
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPlacementSnapshot {
    pub definition: DefinitionId,
    pub instance_id: UnitId,
    pub team: Team,
    /// `UNPLACED_TILE` on both axes for units off the board
    pub tile_x: i32,
    pub tile_y: i32,
    #[serde(default)]
    pub dead: bool,
    /// `Facing::to_index`
    #[serde(default)]
    pub facing: u8,
    pub stats: UnitStats,
}

impl UnitPlacementSnapshot {
    pub fn is_unplaced(&self) -> bool {
        self.tile_x == UNPLACED_TILE && self.tile_y == UNPLACED_TILE
    }

    pub fn tile(&self) -> Option<TileCoord> {
        (!self.is_unplaced()).then(|| TileCoord::new(self.tile_x, self.tile_y))
    }
}

/// Complete save of an in-progress battle
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BattleSnapshot {
    pub turn: TurnSnapshot,
    #[serde(default)]
    pub units: Vec<UnitPlacementSnapshot>,
}

impl BattleSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the snapshot to a JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read a snapshot from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}
