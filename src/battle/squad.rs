//! Squad setup: turn squad configs into battle participants
//!
//! A `SquadConfig` names which definitions fight on each side and where
//! they start. Spawning resolves those against a `UnitCatalog`, producing
//! the `UnitRecord`s the scheduler takes plus the slot bookkeeping needed
//! to build progression snapshots once the battle is over.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::battle::grid::TileCoord;
use crate::battle::roster::Roster;
use crate::battle::unit_type::UnitCatalog;
use crate::battle::units::UnitRecord;
use crate::core::error::Result;
use crate::core::types::{DefinitionId, Team, UnitId};
use crate::progression::squad::{BattleSquads, SquadSnapshot, UnitProgression};

fn default_level() -> u32 {
    1
}

/// One entry of a squad
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquadMember {
    pub definition: DefinitionId,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub xp: u32,
    /// Starting tile; members without one spawn unplaced
    #[serde(default)]
    pub tile: Option<TileCoord>,
    /// Stable instance id carried over from a previous battle
    #[serde(default)]
    pub instance_id: Option<UnitId>,
}

impl SquadMember {
    pub fn new(definition: impl Into<String>, tile: TileCoord) -> Self {
        Self {
            definition: DefinitionId::new(definition),
            level: default_level(),
            xp: 0,
            tile: Some(tile),
            instance_id: None,
        }
    }

    pub fn at_level(mut self, level: u32, xp: u32) -> Self {
        self.level = level;
        self.xp = xp;
        self
    }
}

/// Both squads of one battle plus its difficulty index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquadConfig {
    #[serde(default)]
    pub player: Vec<SquadMember>,
    #[serde(default)]
    pub enemy: Vec<SquadMember>,
    #[serde(default)]
    pub difficulty: usize,
}

/// A spawned squad member and the progression it started the battle with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquadSlot {
    pub unit: UnitId,
    pub definition: DefinitionId,
    pub level: u32,
    pub xp: u32,
}

/// Everything `TurnScheduler::begin_battle` needs, plus slot bookkeeping
#[derive(Debug, Clone)]
pub struct BattleSetup {
    pub units: Vec<UnitRecord>,
    pub player: Vec<SquadSlot>,
    pub enemy: Vec<SquadSlot>,
    pub difficulty: usize,
}

impl SquadConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Spawn unit records for both squads
    ///
    /// An unknown definition is a wiring error and fails the whole setup.
    pub fn spawn(&self, catalog: &UnitCatalog) -> Result<BattleSetup> {
        let mut units = Vec::with_capacity(self.player.len() + self.enemy.len());
        let player = spawn_side(&self.player, Team::Player, catalog, &mut units)?;
        let enemy = spawn_side(&self.enemy, Team::Enemy, catalog, &mut units)?;

        debug!(
            player = player.len(),
            enemy = enemy.len(),
            difficulty = self.difficulty,
            "Squads spawned"
        );
        Ok(BattleSetup {
            units,
            player,
            enemy,
            difficulty: self.difficulty,
        })
    }
}

fn spawn_side(
    members: &[SquadMember],
    team: Team,
    catalog: &UnitCatalog,
    units: &mut Vec<UnitRecord>,
) -> Result<Vec<SquadSlot>> {
    members
        .iter()
        .map(|member| {
            let definition = catalog.require(&member.definition)?;
            let id = member.instance_id.unwrap_or_default();
            let mut record = UnitRecord::new(id, definition.id.clone(), team, definition.stats);
            record.tile = member.tile;
            units.push(record);
            Ok(SquadSlot {
                unit: id,
                definition: definition.id.clone(),
                level: member.level,
                xp: member.xp,
            })
        })
        .collect()
}

impl BattleSetup {
    /// Progression snapshots reflecting who survived in `roster`
    ///
    /// A slot whose unit is missing from the roster counts as fallen.
    pub fn squads_after(&self, roster: &Roster, catalog: &UnitCatalog) -> Result<BattleSquads> {
        let snapshot = |slots: &[SquadSlot]| -> Result<SquadSnapshot> {
            let units = slots
                .iter()
                .map(|slot| {
                    let definition = catalog.require(&slot.definition)?;
                    let mut progress =
                        UnitProgression::from_definition(definition, slot.level, slot.xp);
                    progress.alive = roster.get(slot.unit).is_some_and(|u| u.is_alive());
                    Ok(progress)
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(SquadSnapshot::new(units))
        };

        Ok(BattleSquads {
            player: snapshot(&self.player)?,
            enemy: snapshot(&self.enemy)?,
            difficulty: self.difficulty,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::unit_type::UnitDefinition;
    use crate::battle::units::UnitStats;
    use crate::core::error::TacticsError;

    fn catalog() -> UnitCatalog {
        let mut catalog = UnitCatalog::new();
        catalog.insert(
            UnitDefinition::new("squire", UnitStats::default()).with_progression(vec![50], 2),
        );
        catalog.insert(UnitDefinition::new("goblin", UnitStats::default()).with_threat_factor(0.5));
        catalog
    }

    #[test]
    fn test_spawn_both_sides() {
        let config = SquadConfig {
            player: vec![
                SquadMember::new("squire", TileCoord::new(0, 0)).at_level(1, 20),
                SquadMember::new("squire", TileCoord::new(1, 0)),
            ],
            enemy: vec![SquadMember::new("goblin", TileCoord::new(5, 5))],
            difficulty: 1,
        };
        let setup = config.spawn(&catalog()).unwrap();
        assert_eq!(setup.units.len(), 3);
        assert_eq!(setup.player.len(), 2);
        assert_eq!(setup.enemy.len(), 1);
        assert_eq!(setup.units[2].team, Team::Enemy);
        assert_eq!(setup.player[0].xp, 20);
        assert_ne!(setup.units[0].id, setup.units[1].id);
    }

    #[test]
    fn test_spawn_keeps_instance_ids() {
        let id = UnitId::from_u128(77);
        let mut member = SquadMember::new("squire", TileCoord::new(0, 0));
        member.instance_id = Some(id);
        let config = SquadConfig {
            player: vec![member],
            ..SquadConfig::default()
        };
        let setup = config.spawn(&catalog()).unwrap();
        assert_eq!(setup.units[0].id, id);
    }

    #[test]
    fn test_spawn_unknown_definition_fails() {
        let config = SquadConfig {
            player: vec![SquadMember::new("dragon", TileCoord::new(0, 0))],
            ..SquadConfig::default()
        };
        assert!(matches!(
            config.spawn(&catalog()),
            Err(TacticsError::UnknownDefinition(_))
        ));
    }

    #[test]
    fn test_squads_after_marks_fallen() {
        let config = SquadConfig {
            player: vec![
                SquadMember::new("squire", TileCoord::new(0, 0)),
                SquadMember::new("squire", TileCoord::new(1, 0)),
            ],
            enemy: vec![SquadMember::new("goblin", TileCoord::new(5, 5))],
            difficulty: 0,
        };
        let catalog = catalog();
        let mut setup = config.spawn(&catalog).unwrap();
        setup.units[1].apply_damage(100);
        let roster = Roster::new(setup.units.clone());

        let squads = setup.squads_after(&roster, &catalog).unwrap();
        assert!(squads.player.units[0].alive);
        assert!(!squads.player.units[1].alive);
        assert_eq!(squads.enemy.units[0].threat_factor, 0.5);
        assert_eq!(squads.player.units[0].xp_thresholds, vec![50]);
    }

    #[test]
    fn test_parse_squad_toml() {
        let config = SquadConfig::from_toml_str(
            r#"
difficulty = 2

[[player]]
definition = "squire"
level = 2
tile = { x = 0, y = 1 }

[[enemy]]
definition = "goblin"
"#,
        )
        .unwrap();
        assert_eq!(config.difficulty, 2);
        assert_eq!(config.player[0].level, 2);
        assert_eq!(config.player[0].tile, Some(TileCoord::new(0, 1)));
        assert_eq!(config.enemy[0].level, 1);
        assert_eq!(config.enemy[0].tile, None);
    }
}
