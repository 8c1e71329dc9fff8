//! Capture a running battle into a snapshot and rebuild one from it
//!
//! Restoring is fail-soft: entries that reference unknown definitions,
//! sit outside the grid, or reuse an instance id are skipped and reported
//! as `RestoreIssue`s while the rest of the battle is rebuilt.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::battle::grid::{Facing, GridBounds};
use crate::battle::scheduler::{ActiveUnitRef, RestoredTurn, TurnScheduler};
use crate::battle::unit_type::UnitCatalog;
use crate::battle::units::UnitRecord;
use crate::core::types::{DefinitionId, UnitId};
use crate::session::snapshot::{
    BattleSnapshot, PhaseTag, TurnSnapshot, UnitPlacementSnapshot, UNPLACED_TILE,
};

/// A snapshot entry that could not be restored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestoreIssue {
    UnknownDefinition {
        index: usize,
        definition: DefinitionId,
    },
    TileOutOfRange {
        index: usize,
        instance_id: UnitId,
        x: i32,
        y: i32,
    },
    DuplicateInstance {
        index: usize,
        instance_id: UnitId,
    },
}

impl std::fmt::Display for RestoreIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RestoreIssue::UnknownDefinition { index, definition } => {
                write!(f, "entry {}: unknown definition '{}'", index, definition)
            }
            RestoreIssue::TileOutOfRange { index, x, y, .. } => {
                write!(f, "entry {}: tile ({}, {}) is off the grid", index, x, y)
            }
            RestoreIssue::DuplicateInstance { index, instance_id } => {
                write!(f, "entry {}: instance {} already restored", index, instance_id)
            }
        }
    }
}

/// Units rebuilt from a snapshot plus whatever had to be skipped
#[derive(Debug, Clone, Default)]
pub struct RestoreReport {
    pub units: Vec<UnitRecord>,
    pub issues: Vec<RestoreIssue>,
}

impl RestoreReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Snapshot the scheduler's current state
///
/// Every unit is written, including the dead, so a restored battle has
/// the same survivors for XP purposes.
pub fn capture_snapshot(scheduler: &TurnScheduler) -> BattleSnapshot {
    let active = scheduler.active_unit();
    let resources = scheduler.resources();
    let phase = if scheduler.is_ended() {
        PhaseTag::Unknown
    } else {
        PhaseTag::Battle
    };

    let turn = TurnSnapshot {
        phase,
        turn: scheduler.turn(),
        active_instance_id: active.map(|u| u.id),
        active_definition: active.map(|u| u.definition.clone()),
        active_team: active.map(|u| u.team),
        action_points: resources.action_points as i64,
        max_action_points: resources.max_action_points,
        has_moved: resources.has_moved,
    };

    let units = scheduler
        .roster()
        .units()
        .iter()
        .map(|unit| {
            let (tile_x, tile_y) = unit
                .tile
                .map(|t| (t.x, t.y))
                .unwrap_or((UNPLACED_TILE, UNPLACED_TILE));
            UnitPlacementSnapshot {
                definition: unit.definition.clone(),
                instance_id: unit.id,
                team: unit.team,
                tile_x,
                tile_y,
                dead: !unit.is_alive(),
                facing: unit.facing.to_index(),
                stats: unit.stats,
            }
        })
        .collect();

    BattleSnapshot { turn, units }
}

/// Rebuild unit records from a snapshot
///
/// Stats come from the snapshot itself; the catalog is only consulted to
/// make sure the definition still exists.
pub fn restore_units(
    snapshot: &BattleSnapshot,
    catalog: &UnitCatalog,
    bounds: GridBounds,
) -> RestoreReport {
    let mut report = RestoreReport::default();
    let mut seen: AHashSet<UnitId> = AHashSet::new();

    for (index, entry) in snapshot.units.iter().enumerate() {
        if catalog.get(&entry.definition).is_none() {
            warn!(index, definition = %entry.definition, "Skipping saved unit: unknown definition");
            report.issues.push(RestoreIssue::UnknownDefinition {
                index,
                definition: entry.definition.clone(),
            });
            continue;
        }

        let tile = entry.tile();
        if let Some(tile) = tile.filter(|t| !bounds.contains(*t)) {
            warn!(index, x = tile.x, y = tile.y, "Skipping saved unit: tile off the grid");
            report.issues.push(RestoreIssue::TileOutOfRange {
                index,
                instance_id: entry.instance_id,
                x: tile.x,
                y: tile.y,
            });
            continue;
        }

        if !seen.insert(entry.instance_id) {
            warn!(
                index,
                instance_id = %entry.instance_id,
                "Skipping saved unit: duplicate instance id"
            );
            report.issues.push(RestoreIssue::DuplicateInstance {
                index,
                instance_id: entry.instance_id,
            });
            continue;
        }

        let mut stats = entry.stats;
        if entry.dead {
            stats.life = 0;
        }
        let mut record =
            UnitRecord::new(entry.instance_id, entry.definition.clone(), entry.team, stats);
        record.tile = tile;
        record.facing = Facing::from_index(entry.facing);
        report.units.push(record);
    }

    report
}

impl TurnSnapshot {
    /// Turn state for `TurnScheduler::restore_from_save`
    ///
    /// Outside the battle phase there is no active unit to look up.
    pub fn to_restored_turn(&self) -> RestoredTurn {
        let active = if self.phase == PhaseTag::Battle {
            ActiveUnitRef {
                instance_id: self.active_instance_id,
                definition: self.active_definition.clone(),
                team: self.active_team,
            }
        } else {
            ActiveUnitRef {
                instance_id: None,
                definition: None,
                team: None,
            }
        };
        RestoredTurn {
            turn: self.turn,
            active,
            action_points: self.action_points,
            has_moved: self.has_moved,
        }
    }
}

/// Restore a saved battle into `scheduler`, returning the skipped entries
pub fn restore_battle(
    scheduler: &mut TurnScheduler,
    snapshot: &BattleSnapshot,
    catalog: &UnitCatalog,
) -> Vec<RestoreIssue> {
    let report = restore_units(snapshot, catalog, scheduler.bounds());
    let restored = report.units.len();
    scheduler.restore_from_save(report.units, &snapshot.turn.to_restored_turn());
    info!(
        restored,
        skipped = report.issues.len(),
        turn = scheduler.turn(),
        "Battle snapshot restored"
    );
    report.issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::grid::TileCoord;
    use crate::battle::unit_type::UnitDefinition;
    use crate::battle::units::UnitStats;
    use crate::core::types::Team;

    fn catalog() -> UnitCatalog {
        let mut catalog = UnitCatalog::new();
        catalog.insert(UnitDefinition::new("squire", UnitStats::default()));
        catalog
    }

    fn entry(id: u128, definition: &str, x: i32, y: i32) -> UnitPlacementSnapshot {
        UnitPlacementSnapshot {
            definition: definition.into(),
            instance_id: UnitId::from_u128(id),
            team: Team::Player,
            tile_x: x,
            tile_y: y,
            dead: false,
            facing: 1,
            stats: UnitStats::default(),
        }
    }

    #[test]
    fn test_restore_skips_bad_entries() {
        let snapshot = BattleSnapshot {
            turn: TurnSnapshot::default(),
            units: vec![
                entry(1, "squire", 0, 0),
                entry(2, "wyvern", 1, 1),
                entry(3, "squire", 40, 2),
                entry(1, "squire", 2, 2),
                entry(4, "squire", UNPLACED_TILE, UNPLACED_TILE),
            ],
        };
        let report = restore_units(&snapshot, &catalog(), GridBounds::new(8, 8));

        assert_eq!(report.units.len(), 2);
        assert_eq!(report.units[0].facing, Facing::East);
        assert_eq!(report.units[1].tile, None);
        assert_eq!(report.issues.len(), 3);
        assert!(matches!(
            report.issues[0],
            RestoreIssue::UnknownDefinition { index: 1, .. }
        ));
        assert!(matches!(
            report.issues[1],
            RestoreIssue::TileOutOfRange { index: 2, x: 40, .. }
        ));
        assert!(matches!(
            report.issues[2],
            RestoreIssue::DuplicateInstance { index: 3, .. }
        ));
    }

    #[test]
    fn test_dead_flag_zeroes_life() {
        let mut dead = entry(1, "squire", 0, 0);
        dead.dead = true;
        let snapshot = BattleSnapshot {
            turn: TurnSnapshot::default(),
            units: vec![dead],
        };
        let report = restore_units(&snapshot, &catalog(), GridBounds::new(4, 4));
        assert!(report.is_clean());
        assert!(!report.units[0].is_alive());
        assert_eq!(report.units[0].tile, Some(TileCoord::new(0, 0)));
    }

    #[test]
    fn test_placement_phase_has_no_active_unit() {
        let turn = TurnSnapshot {
            phase: PhaseTag::Placement,
            turn: 0,
            active_instance_id: Some(UnitId::from_u128(1)),
            ..TurnSnapshot::default()
        };
        let restored = turn.to_restored_turn();
        assert_eq!(restored.active.instance_id, None);
        assert_eq!(restored.active.definition, None);
    }
}
