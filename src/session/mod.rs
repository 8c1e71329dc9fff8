//! Session bridge - save and restore of in-progress battles

pub mod restore;
pub mod snapshot;

pub use restore::{capture_snapshot, restore_battle, restore_units, RestoreIssue, RestoreReport};
pub use snapshot::{BattleSnapshot, PhaseTag, TurnSnapshot, UnitPlacementSnapshot, UNPLACED_TILE};
