//! Board-grid coordinates and the pixel-to-grid transform.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One cell of the game board, addressed column-first.
///
/// `x` counts columns left to right, `y` counts rows bottom to top (the
/// solver convention; screenshots count rows top to bottom). Both are
/// signed: a pixel outside the playfield maps to out-of-range coordinates
/// rather than panicking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSquare {
    pub x: i32,
    pub y: i32,
}

impl GridSquare {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for GridSquare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Pixel layout of the board inside a screenshot: where the top-left cell
/// begins and how many pixels one cell spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridGeometry {
    /// Pixel column of the board's left edge
    pub origin_x: i64,
    /// Pixel row of the board's top edge
    pub origin_y: i64,
    /// Cell edge length in pixels
    pub square_size: i64,
}

impl Default for GridGeometry {
    fn default() -> Self {
        // Calibrated against the capture setup the screenshots come from.
        Self {
            origin_x: 26,
            origin_y: 115,
            square_size: 34,
        }
    }
}

impl GridGeometry {
    /// Map a pixel position (image row and column) to the board square
    /// under it.
    ///
    /// Screen rows grow downward while board rows grow upward, so the row
    /// index is flipped against `board_height`. Division is mathematical
    /// floor (`div_euclid`), which keeps the mapping uniform for pixels
    /// left of or above the grid origin.
    pub fn to_grid(&self, row: i64, col: i64, board_height: i32) -> GridSquare {
        let x = (col - self.origin_x).div_euclid(self.square_size);
        let screen_y = (row - self.origin_y).div_euclid(self.square_size);
        let y = i64::from(board_height) - screen_y - 1;
        GridSquare::new(x as i32, y as i32)
    }

    /// Pixel center of a board square; inverse of [`Self::to_grid`] for
    /// squares inside the board. Returned as (row, col).
    pub fn square_center(&self, square: GridSquare, board_height: i32) -> (i64, i64) {
        let screen_y = i64::from(board_height) - 1 - i64::from(square.y);
        let row = self.origin_y + screen_y * self.square_size + self.square_size / 2;
        let col = self.origin_x + i64::from(square.x) * self.square_size + self.square_size / 2;
        (row, col)
    }
}
