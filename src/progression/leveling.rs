//! Level-threshold application
//!
//! `apply_xp` and `level_steps` both run the same walk over the thresholds,
//! so the step breakdown shown to the player always matches what was applied.

use serde::{Deserialize, Serialize};

use crate::progression::squad::UnitProgression;

/// One threshold visited while applying XP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelStep {
    /// Level the step started at
    pub level: u32,
    pub xp_from: u32,
    pub xp_to: u32,
    pub threshold: u32,
    pub leveled_up: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelingResult {
    pub level_before: u32,
    pub xp_before: u32,
    pub level_after: u32,
    pub xp_after: u32,
    /// XP actually absorbed; anything past the level cap is discarded
    pub xp_applied: u32,
    pub reached_max: bool,
    pub steps: Vec<LevelStep>,
}

fn walk(progress: &UnitProgression, gained: u32) -> LevelingResult {
    let mut level = progress.level;
    let mut xp = progress.xp;
    let mut remaining = gained;
    let mut applied: u32 = 0;
    let mut steps = Vec::new();

    let reached_max = loop {
        if level >= progress.max_level.max(1) {
            break true;
        }
        // No threshold for this level acts as a cap
        let Some(threshold) = progress.threshold_for(level) else {
            break true;
        };
        if remaining == 0 {
            break false;
        }

        let needed = threshold.saturating_sub(xp);
        if remaining >= needed {
            steps.push(LevelStep {
                level,
                xp_from: xp,
                xp_to: threshold,
                threshold,
                leveled_up: true,
            });
            remaining -= needed;
            applied = applied.saturating_add(needed);
            level += 1;
            xp = 0;
        } else {
            steps.push(LevelStep {
                level,
                xp_from: xp,
                xp_to: xp + remaining,
                threshold,
                leveled_up: false,
            });
            xp += remaining;
            applied = applied.saturating_add(remaining);
            break false;
        }
    };

    if reached_max {
        xp = 0;
    }

    LevelingResult {
        level_before: progress.level,
        xp_before: progress.xp,
        level_after: level,
        xp_after: xp,
        xp_applied: applied,
        reached_max,
        steps,
    }
}

/// Apply `gained` XP in place and report what happened
pub fn apply_xp(progress: &mut UnitProgression, gained: u32) -> LevelingResult {
    let result = walk(progress, gained);
    progress.level = result.level_after;
    progress.xp = result.xp_after;
    result
}

/// Preview the steps `apply_xp` would take, without mutating
pub fn level_steps(progress: &UnitProgression, gained: u32) -> Vec<LevelStep> {
    walk(progress, gained).steps
}
