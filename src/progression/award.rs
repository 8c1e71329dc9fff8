//! Post-battle award: calculate, split across survivors, level up

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::battle::turn_state::BattleOutcome;
use crate::core::types::DefinitionId;
use crate::progression::calculator::{calculate_xp_breakdown, BattleSummary, XpBreakdown};
use crate::progression::distribution::distribute_evenly;
use crate::progression::leveling::{apply_xp, LevelStep};
use crate::progression::squad::BattleSquads;
use crate::progression::tuning::XpTuningConfig;

/// What one player squad slot received
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitAward {
    pub definition: DefinitionId,
    pub alive: bool,
    pub xp_awarded: u32,
    pub xp_applied: u32,
    pub level_before: u32,
    pub level_after: u32,
    pub xp_before: u32,
    pub xp_after: u32,
    pub reached_max_level: bool,
    pub steps: Vec<LevelStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwardResult {
    pub total_xp: u32,
    pub alive_count: usize,
    pub total_count: usize,
    pub turns_taken: u32,
    pub breakdown: XpBreakdown,
    pub units: Vec<UnitAward>,
}

/// Award XP for a finished battle, updating the player squad in place
///
/// Only surviving player units share the total. Fallen units are still
/// listed with a zero award so the result lines up with the squad.
pub fn award_battle_xp<R: Rng + ?Sized>(
    tuning: Option<&XpTuningConfig>,
    squads: &mut BattleSquads,
    outcome: BattleOutcome,
    turns_taken: u32,
    rng: &mut R,
) -> AwardResult {
    let summary = BattleSummary {
        outcome,
        alive_count: squads.player.alive_count(),
        total_count: squads.player.len(),
        turns_taken,
    };
    let breakdown = calculate_xp_breakdown(tuning, squads, &summary);
    let mut shares = distribute_evenly(breakdown.total, summary.alive_count, rng).into_iter();

    let units: Vec<UnitAward> = squads
        .player
        .units
        .iter_mut()
        .map(|unit| {
            let awarded = if unit.alive {
                shares.next().unwrap_or(0)
            } else {
                0
            };
            let result = apply_xp(unit, awarded);
            UnitAward {
                definition: unit.definition.clone(),
                alive: unit.alive,
                xp_awarded: awarded,
                xp_applied: result.xp_applied,
                level_before: result.level_before,
                level_after: result.level_after,
                xp_before: result.xp_before,
                xp_after: result.xp_after,
                reached_max_level: result.reached_max,
                steps: result.steps,
            }
        })
        .collect();

    let level_ups: u32 = units
        .iter()
        .map(|u| u.level_after.saturating_sub(u.level_before))
        .sum();
    info!(
        total_xp = breakdown.total,
        alive = summary.alive_count,
        total = summary.total_count,
        turns = turns_taken,
        level_ups,
        "Battle XP awarded"
    );

    AwardResult {
        total_xp: breakdown.total,
        alive_count: summary.alive_count,
        total_count: summary.total_count,
        turns_taken,
        breakdown,
        units,
    }
}
