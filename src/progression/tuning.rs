//! XP tuning configuration loaded from TOML
//!
//! Curves are indexed by difficulty. An index past the end of a curve
//! uses the curve's last entry.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, TacticsError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XpTuningConfig {
    /// Base XP each defeated-side enemy is worth, per difficulty
    pub base_xp_per_enemy: Vec<f64>,
    /// Turn count the pacing factor compares against, per difficulty
    #[serde(default)]
    pub target_turns: Vec<u32>,
    /// Whether finishing faster or slower than target scales XP
    #[serde(default)]
    pub pacing_enabled: bool,
}

impl Default for XpTuningConfig {
    fn default() -> Self {
        Self {
            base_xp_per_enemy: vec![10.0, 15.0, 22.0],
            target_turns: vec![8, 10, 12],
            pacing_enabled: false,
        }
    }
}

impl XpTuningConfig {
    pub fn base_xp_for(&self, difficulty: usize) -> f64 {
        curve_value(&self.base_xp_per_enemy, difficulty).unwrap_or(0.0)
    }

    /// Target turn count, if one is configured and non-zero
    pub fn target_turns_for(&self, difficulty: usize) -> Option<u32> {
        curve_value(&self.target_turns, difficulty).filter(|turns| *turns > 0)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(bad) = self
            .base_xp_per_enemy
            .iter()
            .find(|value| !value.is_finite() || **value < 0.0)
        {
            return Err(TacticsError::InvalidConfig(format!(
                "base_xp_per_enemy entries must be non-negative, got {}",
                bad
            )));
        }
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let tuning: XpTuningConfig = toml::from_str(content)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a TOML file on disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

fn curve_value<T: Copy>(curve: &[T], difficulty: usize) -> Option<T> {
    curve.get(difficulty).or_else(|| curve.last()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_lookup_clamps_to_last() {
        let tuning = XpTuningConfig::default();
        assert_eq!(tuning.base_xp_for(0), 10.0);
        assert_eq!(tuning.base_xp_for(2), 22.0);
        assert_eq!(tuning.base_xp_for(9), 22.0);
        assert_eq!(tuning.target_turns_for(1), Some(10));
    }

    #[test]
    fn test_missing_curves() {
        let tuning = XpTuningConfig {
            base_xp_per_enemy: Vec::new(),
            target_turns: vec![0],
            pacing_enabled: true,
        };
        assert_eq!(tuning.base_xp_for(0), 0.0);
        assert_eq!(tuning.target_turns_for(0), None);
    }

    #[test]
    fn test_parse_toml() {
        let tuning = XpTuningConfig::from_toml_str(
            "base_xp_per_enemy = [5.0, 8.0]\npacing_enabled = true\n",
        )
        .unwrap();
        assert_eq!(tuning.base_xp_for(1), 8.0);
        assert!(tuning.target_turns.is_empty());
        assert!(tuning.pacing_enabled);
    }

    #[test]
    fn test_rejects_negative_base_xp() {
        assert!(XpTuningConfig::from_toml_str("base_xp_per_enemy = [-1.0]\n").is_err());
    }

    #[test]
    fn test_shipped_default_tuning_loads() {
        let tuning = XpTuningConfig::load(Path::new("data/tuning/default.toml"))
            .expect("Should load default tuning");
        assert!(!tuning.base_xp_per_enemy.is_empty());
    }
}
