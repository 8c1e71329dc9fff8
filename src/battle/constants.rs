//! Battle system constants - all tunable values in one place

// Damage roll: raw damage is attack scaled by a uniform draw in this range
pub const DAMAGE_VARIANCE_MIN: f64 = 0.95;
pub const DAMAGE_VARIANCE_MAX: f64 = 1.05;

// Any hit with positive attack deals at least this much
pub const MIN_DAMAGE: i32 = 1;

// Action points spent per move or attack (moves cost per action, not per tile)
pub const MOVE_AP_COST: u32 = 1;
pub const ATTACK_AP_COST: u32 = 1;
