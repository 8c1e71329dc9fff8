//! AI's read-only view of the battle state during its turn

use crate::battle::grid::TileCoord;
use crate::battle::pathfinding::ReachableSet;
use crate::battle::roster::Roster;
use crate::battle::turn_state::TurnResources;
use crate::battle::units::UnitRecord;
use crate::core::types::Team;

/// AI's decision-making context
///
/// Built by the scheduler for the active unit. The reachable set and
/// attackable tiles are the same caches the scheduler validates
/// commands against.
pub struct DecisionContext<'a> {
    pub roster: &'a Roster,
    pub active: &'a UnitRecord,
    pub resources: TurnResources,
    pub reachable: Option<&'a ReachableSet>,
    pub attackable: &'a [TileCoord],
}

impl<'a> DecisionContext<'a> {
    /// Living, placed units opposing the active unit
    pub fn enemies(&self) -> Vec<&'a UnitRecord> {
        let roster: &'a Roster = self.roster;
        roster
            .living(self.active.team.opponent())
            .filter(|u| u.is_placed())
            .collect()
    }

    /// Living units on the active unit's side, itself included
    pub fn allies(&self) -> Vec<&'a UnitRecord> {
        let roster: &'a Roster = self.roster;
        roster.living(self.active.team).collect()
    }

    /// Closest enemy by grid distance; ties go to the lower instance id
    pub fn nearest_enemy(&self) -> Option<&'a UnitRecord> {
        let origin = self.active.tile?;
        self.enemies().into_iter().min_by(|a, b| {
            let da = a.tile.map(|t| t.distance(&origin)).unwrap_or(u32::MAX);
            let db = b.tile.map(|t| t.distance(&origin)).unwrap_or(u32::MAX);
            da.cmp(&db).then_with(|| a.id.cmp(&b.id))
        })
    }

    pub fn team(&self) -> Team {
        self.active.team
    }
}
