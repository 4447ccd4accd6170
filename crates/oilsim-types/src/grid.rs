//! Grid geometry shared by boats and oil cells.
//!
//! The ocean is a square of integer coordinates `0..=MAX_GRID` on both
//! axes. `y` grows downward (screen orientation), so "north" means a
//! decreasing `y`. Every coordinate produced anywhere in the simulation is
//! passed through [`clamp_to_grid`].

use serde::{Deserialize, Serialize};

/// Largest valid coordinate on either axis.
pub const MAX_GRID: i32 = 100;

/// Coordinate where boats are launched.
pub const PORT: GridPos = GridPos::new(MAX_GRID, MAX_GRID);

/// Clamp a single coordinate into `[0, MAX_GRID]`.
pub const fn clamp_to_grid(value: i32) -> i32 {
    if value < 0 {
        0
    } else if value > MAX_GRID {
        MAX_GRID
    } else {
        value
    }
}

/// An integer position on the ocean grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridPos {
    /// Horizontal coordinate (grows eastward).
    pub x: i32,
    /// Vertical coordinate (grows southward).
    pub y: i32,
}

impl GridPos {
    /// Create a position without clamping.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Create a position with both coordinates clamped onto the grid.
    pub const fn clamped(x: i32, y: i32) -> Self {
        Self {
            x: clamp_to_grid(x),
            y: clamp_to_grid(y),
        }
    }

    /// Return this position shifted by `(dx, dy)` and clamped onto the grid.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::clamped(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }

    /// Whether both coordinates lie inside `[0, MAX_GRID]`.
    pub const fn is_on_grid(self) -> bool {
        self.x >= 0 && self.x <= MAX_GRID && self.y >= 0 && self.y <= MAX_GRID
    }
}

impl core::fmt::Display for GridPos {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({:3},{:3})", self.x, self.y)
    }
}
