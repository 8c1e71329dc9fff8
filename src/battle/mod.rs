//! Battle system - turn-based squad combat on a square grid
//!
//! Units act one at a time in initiative order. Each turn the active unit
//! gets one move (any distance within its speed) and melee attacks against
//! orthogonal neighbors, paid for out of its action points.
//!
//! Layering, leaf first:
//! - `damage`: the damage formula
//! - `pathfinding`: movement range under a step budget
//! - `combat`: attack eligibility and resolution
//! - `roster`: initiative order and dead-unit compaction
//! - `scheduler`: the state machine tying it together

pub mod ai;
pub mod animation;
pub mod combat;
pub mod constants;
pub mod damage;
pub mod events;
pub mod grid;
pub mod pathfinding;
pub mod roster;
pub mod scheduler;
pub mod squad;
pub mod turn_state;
pub mod unit_type;
pub mod units;

// Re-exports for convenient access
pub use ai::{BattleAI, DecisionContext, NearestEnemyAi};
pub use animation::{AnimationPort, AnimationState, NullAnimation, RecordingAnimation};
pub use combat::{compute_attackable, resolve_attack, AttackOutcome};
pub use constants::*;
pub use damage::{compute_damage, roll_damage};
pub use events::{BattleEvent, BattleEventKind, BattleEventLog};
pub use grid::{Facing, GridBounds, TileCoord};
pub use pathfinding::{compute_reachable, ReachableSet};
pub use roster::{Compaction, Roster, SideCounts};
pub use scheduler::{ActionSequence, ActiveUnitRef, RestoredTurn, SequenceKind, TurnScheduler};
pub use squad::{BattleSetup, SquadConfig, SquadMember, SquadSlot};
pub use turn_state::{BattleOutcome, InteractionLock, TurnResources};
pub use unit_type::{UnitCatalog, UnitDefinition};
pub use units::{UnitRecord, UnitStats};
