//! Threat-weighted XP calculation
//!
//! Each enemy is worth `base * threat * level_factor`. The sum is scaled
//! by outcome, survival and (optionally) pacing, then rounded.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::battle::turn_state::BattleOutcome;
use crate::progression::squad::BattleSquads;
use crate::progression::tuning::XpTuningConfig;

// Level factor: +12% per level the enemy is above the squad average
const LEVEL_FACTOR_STEP: f64 = 0.12;
const LEVEL_FACTOR_MIN: f64 = 0.6;
const LEVEL_FACTOR_MAX: f64 = 1.8;

const VICTORY_FACTOR: f64 = 1.0;
const DEFEAT_FACTOR: f64 = 0.35;

// Survival factor: 0.85 with nobody left, 1.0 with everyone
const SURVIVAL_BASE: f64 = 0.85;
const SURVIVAL_WEIGHT: f64 = 0.15;

const PACING_MIN: f64 = 0.8;
const PACING_MAX: f64 = 1.2;

/// How a battle went, as far as XP is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleSummary {
    pub outcome: BattleOutcome,
    pub alive_count: usize,
    pub total_count: usize,
    pub turns_taken: u32,
}

/// Every factor behind a total, for UI and debugging
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct XpBreakdown {
    pub per_enemy: Vec<f64>,
    pub enemy_sum: f64,
    pub outcome_factor: f64,
    pub survival_factor: f64,
    pub pacing_factor: f64,
    pub total: u32,
}

pub fn level_factor(enemy_level: u32, average_player_level: f64) -> f64 {
    let delta = enemy_level as f64 - average_player_level;
    (1.0 + LEVEL_FACTOR_STEP * delta).clamp(LEVEL_FACTOR_MIN, LEVEL_FACTOR_MAX)
}

pub fn outcome_factor(outcome: BattleOutcome) -> f64 {
    match outcome {
        BattleOutcome::Victory => VICTORY_FACTOR,
        BattleOutcome::Defeat => DEFEAT_FACTOR,
        BattleOutcome::Undecided => 0.0,
    }
}

pub fn survival_factor(alive_count: usize, total_count: usize) -> f64 {
    if total_count == 0 {
        return 1.0;
    }
    let ratio = alive_count.min(total_count) as f64 / total_count as f64;
    SURVIVAL_BASE + SURVIVAL_WEIGHT * ratio
}

/// Turn pacing factor; a zero-turn battle counts as one turn
pub fn pacing_factor(target_turns: u32, actual_turns: u32) -> f64 {
    let actual = actual_turns.max(1) as f64;
    (target_turns as f64 / actual).clamp(PACING_MIN, PACING_MAX)
}

/// Round half away from zero into a non-negative, saturating u32
fn to_xp(value: f64) -> u32 {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    // Float -> int casts saturate at u32::MAX
    value.round() as u32
}

/// Compute the total XP with every factor exposed
///
/// Missing tuning yields zero XP and a warning rather than an error.
pub fn calculate_xp_breakdown(
    tuning: Option<&XpTuningConfig>,
    squads: &BattleSquads,
    summary: &BattleSummary,
) -> XpBreakdown {
    let Some(tuning) = tuning else {
        warn!("No XP tuning configured; awarding zero XP");
        return XpBreakdown::default();
    };

    let base = tuning.base_xp_for(squads.difficulty);
    let average_player_level = squads.player.average_level();

    let per_enemy: Vec<f64> = squads
        .enemy
        .units
        .iter()
        .map(|enemy| {
            // Empty player squads compare enemies against themselves
            let average = average_player_level.unwrap_or(enemy.level as f64);
            base * enemy.threat_factor * level_factor(enemy.level, average)
        })
        .collect();
    let enemy_sum: f64 = per_enemy.iter().sum();

    let outcome_factor = outcome_factor(summary.outcome);
    let survival_factor = survival_factor(summary.alive_count, summary.total_count);
    let pacing_factor = match tuning.target_turns_for(squads.difficulty) {
        Some(target) if tuning.pacing_enabled => pacing_factor(target, summary.turns_taken),
        _ => 1.0,
    };

    let total = to_xp(enemy_sum * outcome_factor * survival_factor * pacing_factor);

    XpBreakdown {
        per_enemy,
        enemy_sum,
        outcome_factor,
        survival_factor,
        pacing_factor,
        total,
    }
}

/// Total XP a battle is worth
pub fn calculate_total_xp(
    tuning: Option<&XpTuningConfig>,
    squads: &BattleSquads,
    summary: &BattleSummary,
) -> u32 {
    calculate_xp_breakdown(tuning, squads, summary).total
}
