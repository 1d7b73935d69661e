//! The arena grid
//!
//! A rectangular field of unit cells, each free or blocked. The map answers
//! three questions for the collision engine: which cell contains a point,
//! is a cell free, and does a straight line between two points cross any
//! blocked cell. Cells outside the map count as blocked, so the arena edge
//! behaves like a solid wall.

use glam::{DVec2, IVec2};
use serde::{Deserialize, Serialize};

use crate::consts::CELL_SIZE;

/// Grid of free/blocked cells
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Map {
    width: i32,
    height: i32,
    blocked: Vec<bool>,
}

impl Map {
    /// An all-free map of the given dimensions
    pub fn new(width: i32, height: i32) -> Self {
        assert!(width > 0 && height > 0, "map dimensions must be positive");
        Self {
            width,
            height,
            blocked: vec![false; (width * height) as usize],
        }
    }

    /// Build a map from text rows, top row first: `#` blocks a cell,
    /// anything else leaves it free
    ///
    /// For tests and demos; map *files* are the surrounding game's concern.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len() as i32;
        let width = rows.first().map_or(0, |r| r.len()) as i32;
        let mut map = Self::new(width, height);
        for (row_index, row) in rows.iter().enumerate() {
            let y = height - 1 - row_index as i32;
            for (x, c) in row.chars().take(width as usize).enumerate() {
                if c == '#' {
                    map.set_blocked(IVec2::new(x as i32, y), true);
                }
            }
        }
        map
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    fn index(&self, cell: IVec2) -> usize {
        (cell.y * self.width + cell.x) as usize
    }

    /// Whether the cell lies inside the map rectangle
    #[inline]
    pub fn in_bounds(&self, cell: IVec2) -> bool {
        cell.x >= 0 && cell.x < self.width && cell.y >= 0 && cell.y < self.height
    }

    /// Whether a point lies inside the map rectangle
    pub fn contains_point(&self, point: DVec2) -> bool {
        point.x >= 0.0
            && point.x < self.width as f64 * CELL_SIZE
            && point.y >= 0.0
            && point.y < self.height as f64 * CELL_SIZE
    }

    /// Free means in bounds and not blocked
    pub fn is_free(&self, cell: IVec2) -> bool {
        self.in_bounds(cell) && !self.blocked[self.index(cell)]
    }

    pub fn set_blocked(&mut self, cell: IVec2, blocked: bool) {
        assert!(self.in_bounds(cell), "cell out of bounds");
        let index = self.index(cell);
        self.blocked[index] = blocked;
    }

    /// The cell containing a point
    pub fn cell_at(&self, point: DVec2) -> IVec2 {
        IVec2::new(
            (point.x / CELL_SIZE).floor() as i32,
            (point.y / CELL_SIZE).floor() as i32,
        )
    }

    /// Lower-left corner of a cell
    pub fn cell_min(cell: IVec2) -> DVec2 {
        DVec2::new(cell.x as f64 * CELL_SIZE, cell.y as f64 * CELL_SIZE)
    }

    /// Upper-right corner of a cell
    pub fn cell_max(cell: IVec2) -> DVec2 {
        Self::cell_min(cell) + DVec2::splat(CELL_SIZE)
    }

    pub fn cell_center(cell: IVec2) -> DVec2 {
        Self::cell_min(cell) + DVec2::splat(CELL_SIZE / 2.0)
    }

    /// True when the straight segment between two points crosses no blocked
    /// cell
    ///
    /// Grid traversal in the Amanatides-Woo style: walk cell to cell along
    /// the segment, stepping across whichever border comes first.
    pub fn line_of_sight(&self, from: DVec2, to: DVec2) -> bool {
        let mut cell = self.cell_at(from);
        let target = self.cell_at(to);
        let delta = to - from;

        let step_x: i32 = if delta.x > 0.0 { 1 } else { -1 };
        let step_y: i32 = if delta.y > 0.0 { 1 } else { -1 };

        // Parameter along the segment (0..1) at which the next vertical and
        // horizontal cell borders are crossed.
        let mut t_max_x = if delta.x == 0.0 {
            f64::INFINITY
        } else {
            let next = if delta.x > 0.0 {
                (cell.x + 1) as f64 * CELL_SIZE
            } else {
                cell.x as f64 * CELL_SIZE
            };
            (next - from.x) / delta.x
        };
        let mut t_max_y = if delta.y == 0.0 {
            f64::INFINITY
        } else {
            let next = if delta.y > 0.0 {
                (cell.y + 1) as f64 * CELL_SIZE
            } else {
                cell.y as f64 * CELL_SIZE
            };
            (next - from.y) / delta.y
        };
        let t_delta_x = if delta.x == 0.0 { f64::INFINITY } else { CELL_SIZE / delta.x.abs() };
        let t_delta_y = if delta.y == 0.0 { f64::INFINITY } else { CELL_SIZE / delta.y.abs() };

        // Bounded by the number of cells the segment can possibly cross
        let max_steps = (self.width + self.height + 2) as usize;
        for _ in 0..=max_steps {
            if !self.is_free(cell) {
                return false;
            }
            if cell == target {
                return true;
            }
            if t_max_x < t_max_y {
                cell.x += step_x;
                t_max_x += t_delta_x;
            } else {
                cell.y += step_y;
                t_max_y += t_delta_y;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_orientation() {
        // Top text row is the highest y row
        let map = Map::from_rows(&[
            "#..", //
            "...", //
            "..#",
        ]);
        assert!(!map.is_free(IVec2::new(0, 2)));
        assert!(!map.is_free(IVec2::new(2, 0)));
        assert!(map.is_free(IVec2::new(1, 1)));
    }

    #[test]
    fn test_out_of_bounds_is_blocked() {
        let map = Map::new(4, 4);
        assert!(!map.is_free(IVec2::new(-1, 0)));
        assert!(!map.is_free(IVec2::new(0, 4)));
        assert!(map.is_free(IVec2::new(3, 3)));
    }

    #[test]
    fn test_cell_at_and_corners() {
        let map = Map::new(8, 8);
        let cell = map.cell_at(DVec2::new(3.7, 5.2));
        assert_eq!(cell, IVec2::new(3, 5));
        assert_eq!(Map::cell_min(cell), DVec2::new(3.0, 5.0));
        assert_eq!(Map::cell_max(cell), DVec2::new(4.0, 6.0));
    }

    #[test]
    fn test_line_of_sight_clear_and_blocked() {
        let map = Map::from_rows(&[
            ".....", //
            "..#..", //
            ".....",
        ]);
        // Straight across the free bottom row
        assert!(map.line_of_sight(DVec2::new(0.5, 0.5), DVec2::new(4.5, 0.5)));
        // Through the blocked center cell
        assert!(!map.line_of_sight(DVec2::new(0.5, 1.5), DVec2::new(4.5, 1.5)));
        // Diagonal dodging the block
        assert!(map.line_of_sight(DVec2::new(0.5, 0.5), DVec2::new(4.5, 0.6)));
    }

    #[test]
    fn test_line_of_sight_vertical() {
        let map = Map::from_rows(&[
            ".#.", //
            ".#.", //
            "...",
        ]);
        assert!(!map.line_of_sight(DVec2::new(1.5, 0.5), DVec2::new(1.5, 2.5)));
        assert!(map.line_of_sight(DVec2::new(0.5, 0.5), DVec2::new(0.5, 2.5)));
    }
}
