//! Planned routes
//!
//! A route is the value produced by a successful search: the cells from
//! start to goal and the accumulated cost. Routes hold plain cell
//! addresses, so they outlive the grid they were planned on.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::grid::{Cell, Grid, GridGeometry};

/// An ordered, costed sequence of cells from start to goal (inclusive)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    cells: Vec<Cell>,
    cost: u32,
}

impl Route {
    /// A route that starts and ends in the same cell
    #[must_use]
    pub fn single(cell: Cell) -> Self {
        Self {
            cells: vec![cell],
            cost: 0,
        }
    }

    pub(crate) fn from_parts(cells: Vec<Cell>, cost: u32) -> Self {
        debug_assert!(!cells.is_empty(), "routes always contain the start cell");
        Self { cells, cost }
    }

    /// Cells from start to goal
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of cells, including start and goal
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the route has no cells
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Total cost in world units
    #[must_use]
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// First cell
    #[must_use]
    pub fn start(&self) -> Cell {
        self.cells[0]
    }

    /// Last cell
    #[must_use]
    pub fn goal(&self) -> Cell {
        self.cells[self.cells.len() - 1]
    }

    /// World-space waypoints (cell centers)
    #[must_use]
    pub fn waypoints(&self, geometry: &GridGeometry) -> Vec<Vec2> {
        self.cells.iter().map(|&c| geometry.center_of(c)).collect()
    }

    /// Check that consecutive cells are neighbors on `grid`
    #[must_use]
    pub fn is_contiguous(&self, grid: &Grid) -> bool {
        self.cells
            .windows(2)
            .all(|pair| grid.neighbors(pair[0]).contains(&pair[1]))
    }

    /// Human-readable cell list, e.g. `(0,0) -> (24,0)`
    #[must_use]
    pub fn describe(&self) -> String {
        self.cells
            .iter()
            .map(Cell::to_string)
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_cell_route() {
        let route = Route::single(Cell::new(3, 4));

        assert_eq!(route.len(), 1);
        assert_eq!(route.cost(), 0);
        assert_eq!(route.start(), route.goal());
        assert!(!route.is_empty());
    }

    #[test]
    fn test_waypoints_are_cell_centers() {
        let grid = Grid::new(100.0, 100.0, 10).unwrap();
        let route = Route::from_parts(vec![Cell::new(0, 0), Cell::new(9, 0)], 10);
        let waypoints = route.waypoints(&grid.geometry());

        assert_eq!(waypoints.len(), 2);
        assert!((waypoints[0] - Vec2::new(5.0, 5.0)).length() < 0.001);
        assert!((waypoints[1] - Vec2::new(95.0, 5.0)).length() < 0.001);
    }

    #[test]
    fn test_contiguity_respects_wraparound() {
        let grid = Grid::new(100.0, 100.0, 10).unwrap();
        let wrapped = Route::from_parts(vec![Cell::new(0, 0), Cell::new(9, 0), Cell::new(9, 9)], 20);
        let broken = Route::from_parts(vec![Cell::new(0, 0), Cell::new(5, 5)], 10);

        assert!(wrapped.is_contiguous(&grid));
        assert!(!broken.is_contiguous(&grid));
    }

    #[test]
    fn test_describe() {
        let route = Route::from_parts(vec![Cell::new(0, 0), Cell::new(24, 0)], 40);
        assert_eq!(route.describe(), "(0,0) -> (24,0)");
    }
}
