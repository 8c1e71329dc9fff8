//! Battle configuration with documented constants
//!
//! Values that shape pacing of a battle live here. Everything has a
//! default so a battle can be wired up without a config file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, TacticsError};

/// Configuration for a single battle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    // === GRID ===
    /// Number of tile columns on the battle grid
    pub grid_width: i32,

    /// Number of tile rows on the battle grid
    pub grid_height: i32,

    // === PACING ===
    /// Seconds an AI-controlled unit "thinks" before its turn auto-advances
    ///
    /// The AI collaborator gets this window to issue one move and one
    /// attack. If a sequence is still in flight when it elapses, the turn
    /// advances as soon as the sequence completes.
    pub ai_think_delay: f32,

    /// Seconds a move sequence stays in flight
    pub move_duration: f32,

    /// Seconds an attack sequence stays in flight before damage lands
    pub attack_duration: f32,

    // === DETERMINISM ===
    /// Seed for the battle RNG (damage variance)
    pub seed: u64,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            grid_width: 8,
            grid_height: 8,
            ai_think_delay: 0.75,
            move_duration: 0.4,
            attack_duration: 0.5,
            seed: 42,
        }
    }
}

impl BattleConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML; missing keys fall back to defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: BattleConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file on disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.grid_width <= 0 || self.grid_height <= 0 {
            return Err(TacticsError::InvalidConfig(format!(
                "grid must be non-empty, got {}x{}",
                self.grid_width, self.grid_height
            )));
        }

        let durations = [
            ("ai_think_delay", self.ai_think_delay),
            ("move_duration", self.move_duration),
            ("attack_duration", self.attack_duration),
        ];
        for (name, value) in durations {
            if !value.is_finite() || value < 0.0 {
                return Err(TacticsError::InvalidConfig(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}
