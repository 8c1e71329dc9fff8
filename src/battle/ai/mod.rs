//! AI collaborator seam for non-player turns
//!
//! The scheduler asks the AI for at most one move and at most one attack
//! per turn: the move first, then the attack against the attackable set
//! recomputed after the move lands.

mod commander;
mod decision_context;

pub use commander::NearestEnemyAi;
pub use decision_context::DecisionContext;

use crate::battle::grid::TileCoord;

/// Trait for battle AI implementations
pub trait BattleAI {
    /// Destination for this turn's move, if any
    fn choose_move(&mut self, context: &DecisionContext) -> Option<TileCoord>;

    /// Tile to attack, if any
    fn choose_attack(&mut self, context: &DecisionContext) -> Option<TileCoord>;
}
