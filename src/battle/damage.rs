//! Melee damage formula
//!
//! `raw = attack * variance`, mitigated by `attack / (attack + defense)`
//! when defense is positive. Positive attack always deals at least
//! `MIN_DAMAGE`; non-positive attack deals nothing.

use rand::Rng;

use crate::battle::constants::{DAMAGE_VARIANCE_MAX, DAMAGE_VARIANCE_MIN, MIN_DAMAGE};

/// Draw a variance multiplier uniformly from [0.95, 1.05]
pub fn roll_variance<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(DAMAGE_VARIANCE_MIN..=DAMAGE_VARIANCE_MAX)
}

/// Damage for a given variance draw (pure)
pub fn compute_damage(attack: i32, defense: i32, variance: f64) -> i32 {
    if attack <= 0 {
        return 0;
    }

    let attack = attack as f64;
    let raw = attack * variance;
    let mitigated = if defense <= 0 {
        raw
    } else {
        let mitigation = attack / (attack + defense as f64);
        raw * mitigation
    };

    // NaN and huge values saturate through the float -> int cast
    (mitigated.floor() as i32).max(MIN_DAMAGE)
}

/// Roll variance and compute damage in one step
pub fn roll_damage<R: Rng + ?Sized>(attack: i32, defense: i32, rng: &mut R) -> i32 {
    if attack <= 0 {
        return 0;
    }
    compute_damage(attack, defense, roll_variance(rng))
}
