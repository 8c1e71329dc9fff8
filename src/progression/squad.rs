//! Squad snapshots the progression engine works on

use serde::{Deserialize, Serialize};

use crate::battle::unit_type::UnitDefinition;
use crate::core::types::DefinitionId;

/// Progression state of one squad slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitProgression {
    pub definition: DefinitionId,
    pub level: u32,
    /// XP accumulated into the current level
    pub xp: u32,
    /// XP needed to go from level N to N+1 (index 0 is level 1 -> 2)
    pub xp_thresholds: Vec<u32>,
    pub max_level: u32,
    pub threat_factor: f64,
    /// Survived the battle
    pub alive: bool,
}

impl UnitProgression {
    pub fn from_definition(definition: &UnitDefinition, level: u32, xp: u32) -> Self {
        Self {
            definition: definition.id.clone(),
            level,
            xp,
            xp_thresholds: definition.xp_thresholds.clone(),
            max_level: definition.max_level,
            threat_factor: definition.threat_factor,
            alive: true,
        }
    }

    /// Threshold to leave `level`, if any
    pub fn threshold_for(&self, level: u32) -> Option<u32> {
        let index = level.checked_sub(1)? as usize;
        self.xp_thresholds.get(index).copied().filter(|t| *t > 0)
    }

    pub fn is_max_level(&self) -> bool {
        self.level >= self.max_level.max(1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SquadSnapshot {
    pub units: Vec<UnitProgression>,
}

impl SquadSnapshot {
    pub fn new(units: Vec<UnitProgression>) -> Self {
        Self { units }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn alive_count(&self) -> usize {
        self.units.iter().filter(|u| u.alive).count()
    }

    /// Mean level across the squad, None when empty
    pub fn average_level(&self) -> Option<f64> {
        if self.units.is_empty() {
            return None;
        }
        let sum: f64 = self.units.iter().map(|u| u.level as f64).sum();
        Some(sum / self.units.len() as f64)
    }
}

/// Both sides of a battle plus its difficulty
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleSquads {
    pub player: SquadSnapshot,
    pub enemy: SquadSnapshot,
    pub difficulty: usize,
}
