//! Events the scheduler emits for the presentation layer

use serde::{Deserialize, Serialize};

use crate::battle::grid::TileCoord;
use crate::battle::turn_state::BattleOutcome;
use crate::core::types::{Team, UnitId};

/// Log entry for battle events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleEvent {
    pub turn: u32,
    pub kind: BattleEventKind,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BattleEventKind {
    BattleStarted,
    ActiveUnitChanged { unit: UnitId, team: Team },
    NoActiveUnit,
    TurnAdvanced { turn: u32 },
    UnitMoved {
        unit: UnitId,
        from: TileCoord,
        to: TileCoord,
        path: Vec<TileCoord>,
    },
    UnitAttacked {
        attacker: UnitId,
        defender: UnitId,
        damage: i32,
        remaining_life: i32,
    },
    UnitDied { unit: UnitId },
    RosterCompacted { removed: Vec<UnitId> },
    BattleEnded { outcome: BattleOutcome },
}

/// Accumulated events, drained by the host
#[derive(Debug, Clone, Default)]
pub struct BattleEventLog {
    pub events: Vec<BattleEvent>,
}

impl BattleEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: BattleEventKind, description: String, turn: u32) {
        self.events.push(BattleEvent {
            turn,
            kind,
            description,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Take every pending event, leaving the log empty
    pub fn drain(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_empties_log() {
        let mut log = BattleEventLog::new();
        log.push(BattleEventKind::BattleStarted, "Battle has begun!".into(), 1);
        log.push(BattleEventKind::TurnAdvanced { turn: 2 }, "Turn 2".into(), 2);
        assert_eq!(log.len(), 2);

        let events = log.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].turn, 2);
        assert!(log.is_empty());
    }
}
