//! Unit definitions and the catalog they are looked up from
//!
//! A definition is the static template a unit is spawned from: base
//! stats plus the progression data (threat factor, XP thresholds, max
//! level) the progression engine needs after the battle.

use std::path::Path;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::battle::units::UnitStats;
use crate::core::error::{Result, TacticsError};
use crate::core::types::DefinitionId;

/// Static template for a kind of unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitDefinition {
    pub id: DefinitionId,
    #[serde(default)]
    pub name: String,
    pub stats: UnitStats,
    /// Multiplier on the XP this unit is worth when defeated
    #[serde(default = "default_threat_factor")]
    pub threat_factor: f64,
    /// XP needed to go from level N to N+1 (index 0 is level 1 -> 2)
    #[serde(default)]
    pub xp_thresholds: Vec<u32>,
    #[serde(default = "default_max_level")]
    pub max_level: u32,
}

fn default_threat_factor() -> f64 {
    1.0
}

fn default_max_level() -> u32 {
    1
}

impl UnitDefinition {
    pub fn new(id: impl Into<String>, stats: UnitStats) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id: DefinitionId(id),
            stats,
            threat_factor: default_threat_factor(),
            xp_thresholds: Vec::new(),
            max_level: default_max_level(),
        }
    }

    /// Builder-style progression data
    pub fn with_progression(mut self, thresholds: Vec<u32>, max_level: u32) -> Self {
        self.xp_thresholds = thresholds;
        self.max_level = max_level;
        self
    }

    pub fn with_threat_factor(mut self, threat_factor: f64) -> Self {
        self.threat_factor = threat_factor;
        self
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    units: Vec<UnitDefinition>,
}

/// Lookup table of unit definitions by id
#[derive(Debug, Clone, Default)]
pub struct UnitCatalog {
    definitions: AHashMap<DefinitionId, UnitDefinition>,
}

impl UnitCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition, replacing any previous one with the same id
    pub fn insert(&mut self, definition: UnitDefinition) {
        self.definitions.insert(definition.id.clone(), definition);
    }

    pub fn get(&self, id: &DefinitionId) -> Option<&UnitDefinition> {
        self.definitions.get(id)
    }

    /// Like `get`, but unknown ids are an error
    pub fn require(&self, id: &DefinitionId) -> Result<&UnitDefinition> {
        self.get(id)
            .ok_or_else(|| TacticsError::UnknownDefinition(id.clone()))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Parse a catalog from a TOML document with a `[[units]]` array
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)?;
        if file.units.is_empty() {
            return Err(TacticsError::MissingConfiguration("units"));
        }
        let mut catalog = Self::new();
        for definition in file.units {
            if definition.max_level == 0 {
                return Err(TacticsError::InvalidConfig(format!(
                    "unit '{}' has max_level 0",
                    definition.id
                )));
            }
            catalog.insert(definition);
        }
        Ok(catalog)
    }

    /// Load a catalog from a TOML file on disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
