//! Battle roster: every unit injected into the battle plus the
//! initiative order of the ones still taking turns
//!
//! Records of dead units stay in storage (save snapshots still list
//! them) but are dropped from the turn order when the roster is
//! compacted.

use crate::battle::grid::TileCoord;
use crate::battle::units::UnitRecord;
use crate::core::types::{Team, UnitId};

/// Result of removing dead units from the turn order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compaction {
    /// Units removed from the order, in the order they were found
    pub removed: Vec<UnitId>,
    /// Active cursor after removal
    ///
    /// Decremented once for every removed entry at or before it, so it
    /// can become -1 when everything up to and including the active unit
    /// was removed. None if there was no active unit.
    pub cursor: Option<isize>,
}

/// Alive-unit counts per side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SideCounts {
    pub player: usize,
    pub enemy: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Roster {
    units: Vec<UnitRecord>,
    order: Vec<UnitId>,
}

impl Roster {
    /// Take ownership of the battle's units and sort them into turn order
    pub fn new(units: Vec<UnitRecord>) -> Self {
        let mut roster = Self {
            units,
            order: Vec::new(),
        };
        roster.rebuild_order();
        roster
    }

    /// Rebuild the turn order from scratch
    ///
    /// Only alive, placed units qualify. Sorted by initiative descending,
    /// ties broken by instance id ascending.
    pub fn rebuild_order(&mut self) {
        let mut eligible: Vec<&UnitRecord> = self.units.iter().filter(|u| u.can_act()).collect();
        eligible.sort_by(|a, b| {
            b.stats
                .initiative
                .cmp(&a.stats.initiative)
                .then_with(|| a.id.cmp(&b.id))
        });
        self.order = eligible.into_iter().map(|u| u.id).collect();
    }

    /// Current turn order
    pub fn order(&self) -> &[UnitId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Every unit record, including dead and unplaced ones
    pub fn units(&self) -> &[UnitRecord] {
        &self.units
    }

    pub fn get(&self, id: UnitId) -> Option<&UnitRecord> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut UnitRecord> {
        self.units.iter_mut().find(|u| u.id == id)
    }

    /// Unit at a position in the turn order
    pub fn at_index(&self, index: usize) -> Option<&UnitRecord> {
        self.order.get(index).and_then(|id| self.get(*id))
    }

    pub fn index_of(&self, id: UnitId) -> Option<usize> {
        self.order.iter().position(|other| *other == id)
    }

    /// Living unit standing on a tile
    pub fn occupant_at(&self, tile: TileCoord) -> Option<&UnitRecord> {
        self.units
            .iter()
            .find(|u| u.is_alive() && u.tile == Some(tile))
    }

    /// Dead units never block a tile
    pub fn is_occupied(&self, tile: TileCoord) -> bool {
        self.occupant_at(tile).is_some()
    }

    pub fn alive_counts(&self) -> SideCounts {
        let mut counts = SideCounts::default();
        for unit in self.units.iter().filter(|u| u.is_alive()) {
            match unit.team {
                Team::Player => counts.player += 1,
                Team::Enemy => counts.enemy += 1,
            }
        }
        counts
    }

    /// Living units on a side, in storage order
    pub fn living(&self, team: Team) -> impl Iterator<Item = &UnitRecord> {
        self.units
            .iter()
            .filter(move |u| u.team == team && u.is_alive())
    }

    /// Drop dead units from the turn order
    pub fn compact(&mut self, active: Option<usize>) -> Compaction {
        let mut cursor = active.map(|index| index as isize);
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.order.len());

        for (index, id) in self.order.iter().enumerate() {
            let alive = self.get(*id).is_some_and(|u| u.is_alive());
            if alive {
                kept.push(*id);
                continue;
            }
            removed.push(*id);
            if let (Some(c), Some(a)) = (cursor.as_mut(), active) {
                if index <= a {
                    *c -= 1;
                }
            }
        }

        self.order = kept;
        Compaction { removed, cursor }
    }
}
