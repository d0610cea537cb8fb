//! Grid coordinates and movement vectors

use serde::{Deserialize, Serialize};

/// A cell on the board. Signed so that a step off the edge is representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Position one step along `vel`
    pub fn step(self, vel: Velocity) -> Self {
        Self {
            x: self.x + vel.x,
            y: self.y + vel.y,
        }
    }

    /// Whether the cell lies in `[0, grid_size)` on both axes
    pub fn in_bounds(self, grid_size: i32) -> bool {
        (0..grid_size).contains(&self.x) && (0..grid_size).contains(&self.y)
    }
}

/// Per-tick movement vector. Always one of the four unit vectors or zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Velocity {
    pub x: i32,
    pub y: i32,
}

impl Velocity {
    pub const NONE: Velocity = Velocity { x: 0, y: 0 };
    pub const UP: Velocity = Velocity { x: 0, y: -1 };
    pub const DOWN: Velocity = Velocity { x: 0, y: 1 };
    pub const LEFT: Velocity = Velocity { x: -1, y: 0 };
    pub const RIGHT: Velocity = Velocity { x: 1, y: 0 };

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn opposite(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}
