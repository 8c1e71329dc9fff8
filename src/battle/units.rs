//! Unit records: one per combatant for the duration of a battle
//!
//! A record carries identity (stable instance id, definition, team),
//! placement (optional tile and facing) and combat stats. Per-turn
//! resources such as action points live on the scheduler, not here.

use serde::{Deserialize, Serialize};

use crate::battle::grid::{Facing, TileCoord};
use crate::core::types::{DefinitionId, Team, UnitId};

/// Combat stats of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    pub life: i32,
    pub max_life: i32,
    pub attack: i32,
    pub defense: i32,
    /// Movement budget in orthogonal steps
    pub speed: i32,
    /// Turn order key (higher acts first)
    pub initiative: i32,
    pub max_action_points: u32,
}

impl Default for UnitStats {
    fn default() -> Self {
        Self {
            life: 10,
            max_life: 10,
            attack: 3,
            defense: 1,
            speed: 3,
            initiative: 10,
            max_action_points: 2,
        }
    }
}

impl UnitStats {
    /// Clamp life into [0, max_life] and floor negative maxima at zero
    pub fn normalized(mut self) -> Self {
        self.max_life = self.max_life.max(0);
        self.life = self.life.clamp(0, self.max_life);
        self
    }
}

/// A combatant in the current battle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitRecord {
    pub id: UnitId,
    pub definition: DefinitionId,
    pub team: Team,

    // Position
    pub tile: Option<TileCoord>,
    pub facing: Facing,

    pub stats: UnitStats,
}

impl UnitRecord {
    pub fn new(id: UnitId, definition: DefinitionId, team: Team, stats: UnitStats) -> Self {
        Self {
            id,
            definition,
            team,
            tile: None,
            facing: Facing::default(),
            stats: stats.normalized(),
        }
    }

    /// Builder-style placement
    pub fn placed_at(mut self, tile: TileCoord) -> Self {
        self.tile = Some(tile);
        self
    }

    pub fn is_alive(&self) -> bool {
        self.stats.life > 0
    }

    pub fn is_placed(&self) -> bool {
        self.tile.is_some()
    }

    /// Alive and on the board: the only units that take turns
    pub fn can_act(&self) -> bool {
        self.is_alive() && self.is_placed()
    }

    pub fn is_player_controlled(&self) -> bool {
        self.team.is_player()
    }

    /// Reduce life by `damage`, flooring at zero. Returns true if this
    /// hit killed the unit.
    pub fn apply_damage(&mut self, damage: i32) -> bool {
        let was_alive = self.is_alive();
        self.stats.life = self.stats.life.saturating_sub(damage.max(0)).max(0);
        was_alive && !self.is_alive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knight() -> UnitRecord {
        UnitRecord::new(
            UnitId::new(),
            DefinitionId::new("knight"),
            Team::Player,
            UnitStats::default(),
        )
    }

    #[test]
    fn test_unplaced_unit_cannot_act() {
        let unit = knight();
        assert!(unit.is_alive());
        assert!(!unit.can_act());

        let unit = unit.placed_at(TileCoord::new(1, 1));
        assert!(unit.can_act());
    }

    #[test]
    fn test_damage_floors_at_zero() {
        let mut unit = knight();
        assert!(!unit.apply_damage(4));
        assert_eq!(unit.stats.life, 6);

        assert!(unit.apply_damage(100));
        assert_eq!(unit.stats.life, 0);
        assert!(!unit.is_alive());

        // Already dead: no second death report
        assert!(!unit.apply_damage(1));
    }

    #[test]
    fn test_new_clamps_life() {
        let stats = UnitStats {
            life: 50,
            max_life: 20,
            ..UnitStats::default()
        };
        let unit = UnitRecord::new(UnitId::new(), "ogre".into(), Team::Enemy, stats);
        assert_eq!(unit.stats.life, 20);
    }
}
