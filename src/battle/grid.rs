//! Square tile grid for battle maps
//!
//! Tiles are addressed by integer (x, y). Movement and melee reach are
//! orthogonal only, so every tile has at most four neighbors.

use serde::{Deserialize, Serialize};

/// Tile coordinate on the battle grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance (number of orthogonal steps)
    pub fn distance(&self, other: &Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The four orthogonal neighbors, in N/E/S/W order
    pub fn neighbors(&self) -> [TileCoord; 4] {
        [
            self.step(Facing::North),
            self.step(Facing::East),
            self.step(Facing::South),
            self.step(Facing::West),
        ]
    }

    /// Neighbor one step in the given direction
    pub fn step(&self, facing: Facing) -> TileCoord {
        let (dx, dy) = facing.offset();
        TileCoord::new(self.x + dx, self.y + dy)
    }

    pub fn is_adjacent(&self, other: &Self) -> bool {
        self.distance(other) == 1
    }
}

/// Quantized facing direction
///
/// North is toward negative y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Facing {
    North,
    East,
    #[default]
    South,
    West,
}

impl Facing {
    /// Grid offset for one step in this direction
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Facing::North => (0, -1),
            Facing::East => (1, 0),
            Facing::South => (0, 1),
            Facing::West => (-1, 0),
        }
    }

    /// Direction that best points from `from` toward `to`
    ///
    /// The dominant axis wins; ties prefer the horizontal axis. Returns
    /// None when both tiles are the same.
    pub fn toward(from: TileCoord, to: TileCoord) -> Option<Facing> {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        if dx == 0 && dy == 0 {
            return None;
        }
        if dx.abs() >= dy.abs() {
            Some(if dx > 0 { Facing::East } else { Facing::West })
        } else {
            Some(if dy > 0 { Facing::South } else { Facing::North })
        }
    }

    /// Quantized form used by save snapshots
    pub fn to_index(&self) -> u8 {
        match self {
            Facing::North => 0,
            Facing::East => 1,
            Facing::South => 2,
            Facing::West => 3,
        }
    }

    /// Inverse of `to_index`; out-of-range values wrap
    pub fn from_index(index: u8) -> Self {
        match index % 4 {
            0 => Facing::North,
            1 => Facing::East,
            2 => Facing::South,
            _ => Facing::West,
        }
    }
}

/// Bounds of a rectangular grid anchored at (0, 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBounds {
    pub width: i32,
    pub height: i32,
}

impl GridBounds {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, tile: TileCoord) -> bool {
        tile.x >= 0 && tile.y >= 0 && tile.x < self.width && tile.y < self.height
    }

    /// Total number of tiles
    pub fn area(&self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }
}
