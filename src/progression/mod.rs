//! Progression engine - battle outcome to XP to levels
//!
//! Flow: `calculate_xp_breakdown` prices the battle, `distribute_evenly`
//! splits it across survivors, `apply_xp` walks each unit through its
//! level thresholds. `award_battle_xp` runs all three.

pub mod award;
pub mod calculator;
pub mod distribution;
pub mod leveling;
pub mod squad;
pub mod tuning;

pub use award::{award_battle_xp, AwardResult, UnitAward};
pub use calculator::{calculate_total_xp, calculate_xp_breakdown, BattleSummary, XpBreakdown};
pub use distribution::distribute_evenly;
pub use leveling::{apply_xp, level_steps, LevelStep, LevelingResult};
pub use squad::{BattleSquads, SquadSnapshot, UnitProgression};
pub use tuning::XpTuningConfig;
