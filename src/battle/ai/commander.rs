//! Nearest-enemy commander
//!
//! Attacks the weakest adjacent enemy if there is one; otherwise walks
//! toward the nearest enemy as far as this turn's movement allows.

use crate::battle::ai::decision_context::DecisionContext;
use crate::battle::ai::BattleAI;
use crate::battle::grid::TileCoord;

#[derive(Debug, Clone, Copy, Default)]
pub struct NearestEnemyAi;

impl NearestEnemyAi {
    pub fn new() -> Self {
        Self
    }
}

impl BattleAI for NearestEnemyAi {
    fn choose_move(&mut self, context: &DecisionContext) -> Option<TileCoord> {
        if !context.attackable.is_empty() || !context.resources.can_move() {
            return None;
        }
        let origin = context.active.tile?;
        let target = context.nearest_enemy()?.tile?;
        let reachable = context.reachable?;

        let current = origin.distance(&target);
        // Nearest-first iteration: ties keep the shorter walk
        let best = reachable
            .tiles()
            .iter()
            .copied()
            .min_by_key(|tile| tile.distance(&target))?;

        (best.distance(&target) < current).then_some(best)
    }

    fn choose_attack(&mut self, context: &DecisionContext) -> Option<TileCoord> {
        if !context.resources.can_attack() {
            return None;
        }
        context
            .attackable
            .iter()
            .copied()
            .filter_map(|tile| {
                context
                    .roster
                    .occupant_at(tile)
                    .map(|unit| (tile, unit.stats.life))
            })
            .min_by_key(|(_, life)| *life)
            .map(|(tile, _)| tile)
    }
}
