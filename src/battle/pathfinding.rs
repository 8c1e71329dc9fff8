//! Movement range solver
//!
//! Breadth-first search over the grid under a per-unit step budget.
//! Every orthogonal step costs 1. Occupied tiles block both entry and
//! passage; the origin itself is never a legal destination.

use std::collections::VecDeque;

use ahash::{AHashMap, AHashSet};

use crate::battle::grid::{GridBounds, TileCoord};

/// Tiles reachable from an origin plus the predecessor map behind them
#[derive(Debug, Clone, Default)]
pub struct ReachableSet {
    origin: TileCoord,
    budget: u32,
    /// Reachable tiles in discovery order (nearest first)
    tiles: Vec<TileCoord>,
    lookup: AHashSet<TileCoord>,
    came_from: AHashMap<TileCoord, TileCoord>,
    costs: AHashMap<TileCoord, u32>,
}

impl ReachableSet {
    pub fn origin(&self) -> TileCoord {
        self.origin
    }

    pub fn budget(&self) -> u32 {
        self.budget
    }

    pub fn contains(&self, tile: TileCoord) -> bool {
        self.lookup.contains(&tile)
    }

    /// Reachable tiles, nearest first
    pub fn tiles(&self) -> &[TileCoord] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Steps needed to reach a tile (0 for the origin)
    pub fn cost(&self, tile: TileCoord) -> Option<u32> {
        self.costs.get(&tile).copied()
    }

    /// Path from the origin to `destination`, both inclusive
    ///
    /// Returns None if the destination was never reached.
    pub fn build_path(&self, destination: TileCoord) -> Option<Vec<TileCoord>> {
        if !self.contains(destination) {
            return None;
        }
        Some(reconstruct_path(&self.came_from, destination))
    }
}

/// Compute every tile reachable within `budget` steps of `origin`
///
/// `is_occupied` is consulted at query time for every candidate tile
/// except the origin.
pub fn compute_reachable<F>(
    origin: TileCoord,
    budget: i32,
    bounds: GridBounds,
    is_occupied: F,
) -> ReachableSet
where
    F: Fn(TileCoord) -> bool,
{
    let budget = budget.max(0) as u32;
    let mut result = ReachableSet {
        origin,
        budget,
        ..ReachableSet::default()
    };

    let mut frontier = VecDeque::new();
    result.costs.insert(origin, 0);
    frontier.push_back((origin, 0u32));

    while let Some((current, cost)) = frontier.pop_front() {
        if cost >= budget {
            continue;
        }

        for neighbor in current.neighbors() {
            if !bounds.contains(neighbor) || result.costs.contains_key(&neighbor) {
                continue;
            }
            if is_occupied(neighbor) {
                continue;
            }

            let next_cost = cost + 1;
            result.costs.insert(neighbor, next_cost);
            result.came_from.insert(neighbor, current);
            result.tiles.push(neighbor);
            result.lookup.insert(neighbor);
            frontier.push_back((neighbor, next_cost));
        }
    }

    result
}

/// Reconstruct path from came_from map
fn reconstruct_path(
    came_from: &AHashMap<TileCoord, TileCoord>,
    mut current: TileCoord,
) -> Vec<TileCoord> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(_: TileCoord) -> bool {
        false
    }

    #[test]
    fn test_open_field_diamond() {
        let bounds = GridBounds::new(9, 9);
        let origin = TileCoord::new(4, 4);
        let reach = compute_reachable(origin, 2, bounds, open);

        // Diamond of radius 2 minus the origin: 4 + 8
        assert_eq!(reach.len(), 12);
        assert!(!reach.contains(origin));
        assert_eq!(reach.cost(origin), Some(0));
        assert!(reach.contains(TileCoord::new(6, 4)));
        assert!(!reach.contains(TileCoord::new(6, 5)));
    }

    #[test]
    fn test_zero_budget_reaches_nothing() {
        let reach = compute_reachable(TileCoord::new(1, 1), 0, GridBounds::new(3, 3), open);
        assert!(reach.is_empty());
        assert!(reach.build_path(TileCoord::new(1, 2)).is_none());
    }

    #[test]
    fn test_respects_bounds() {
        let reach = compute_reachable(TileCoord::new(0, 0), 1, GridBounds::new(3, 3), open);
        assert_eq!(reach.len(), 2);
        assert!(!reach.contains(TileCoord::new(-1, 0)));
    }

    #[test]
    fn test_path_around_blocker() {
        let bounds = GridBounds::new(5, 5);
        let origin = TileCoord::new(0, 1);
        let wall = TileCoord::new(1, 1);
        let reach = compute_reachable(origin, 4, bounds, |t| t == wall);

        assert!(!reach.contains(wall));
        let goal = TileCoord::new(2, 1);
        let path = reach.build_path(goal).unwrap();
        assert_eq!(path.first(), Some(&origin));
        assert_eq!(path.last(), Some(&goal));
        assert!(!path.contains(&wall));
        // Detour costs two extra steps
        assert_eq!(path.len() - 1, 4);
        for pair in path.windows(2) {
            assert!(pair[0].is_adjacent(&pair[1]));
        }
    }

    #[test]
    fn test_occupied_tiles_block_passage() {
        let bounds = GridBounds::new(3, 1);
        let origin = TileCoord::new(0, 0);
        let reach = compute_reachable(origin, 5, bounds, |t| t == TileCoord::new(1, 0));
        assert!(reach.is_empty());
    }

    #[test]
    fn test_occupied_origin_is_still_expanded() {
        let bounds = GridBounds::new(3, 3);
        let origin = TileCoord::new(1, 1);
        let reach = compute_reachable(origin, 1, bounds, |t| t == origin);
        assert_eq!(reach.len(), 4);
    }

    #[test]
    fn test_path_to_unreached_tile() {
        let reach = compute_reachable(TileCoord::new(0, 0), 1, GridBounds::new(5, 5), open);
        assert!(reach.build_path(TileCoord::new(3, 3)).is_none());
    }
}
