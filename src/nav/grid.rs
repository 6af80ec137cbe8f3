//! Toroidal navigation grid
//!
//! Discretizes a wraparound 2D arena into square cells. The left edge
//! adjoins the right edge and the top adjoins the bottom, so column and
//! row indices wrap modulo the matrix dimensions for every adjacency and
//! distance query.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A grid cell addressed by column and row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    /// Column index (x axis)
    pub col: usize,
    /// Row index (y axis)
    pub row: usize,
}

impl Cell {
    /// Create a new cell address
    #[must_use]
    pub const fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.col, self.row)
    }
}

/// Neighborhood used for adjacency queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Connectivity {
    /// Orthogonal neighbors only
    #[default]
    Four,
    /// Orthogonal and diagonal neighbors
    Eight,
}

/// How wrapped per-axis deltas are combined into one distance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// Straight-line distance
    #[default]
    Euclidean,
    /// Largest axis delta
    Chebyshev,
    /// Sum of axis deltas
    Manhattan,
}

impl DistanceMetric {
    /// Combine two non-negative axis deltas
    #[must_use]
    pub fn combine(self, dx: f32, dy: f32) -> f32 {
        match self {
            Self::Euclidean => (dx * dx + dy * dy).sqrt(),
            Self::Chebyshev => dx.max(dy),
            Self::Manhattan => dx + dy,
        }
    }
}

/// Errors raised when a grid cannot be constructed
#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    /// Arena width or height is zero, negative, or not finite
    InvalidArena {
        /// Requested arena width
        width: f32,
        /// Requested arena height
        height: f32,
    },
    /// Cell size of zero world units
    ZeroCellSize,
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArena { width, height } => {
                write!(f, "Invalid arena dimensions: {width} x {height}")
            }
            Self::ZeroCellSize => write!(f, "Cell size must be positive"),
        }
    }
}

impl std::error::Error for GridError {}

/// Shortest displacement from `from` to `to` in a wrapping arena
#[must_use]
pub fn toroidal_delta(from: Vec2, to: Vec2, arena: Vec2) -> Vec2 {
    Vec2::new(
        wrap_axis(to.x - from.x, arena.x),
        wrap_axis(to.y - from.y, arena.y),
    )
}

/// Shortest distance between two points in a wrapping arena
#[must_use]
pub fn toroidal_distance(a: Vec2, b: Vec2, arena: Vec2) -> f32 {
    toroidal_delta(a, b, arena).length()
}

fn wrap_axis(delta: f32, extent: f32) -> f32 {
    let d = delta.rem_euclid(extent);
    if d > extent * 0.5 { d - extent } else { d }
}

/// Arena and matrix dimensions of a grid.
///
/// Copied out of a [`Grid`] so routes can be turned into world-space
/// waypoints after the grid itself is rebuilt or dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    /// Arena size in world units
    pub arena: Vec2,
    /// Edge length of one cell in world units
    pub cell_size: u32,
    /// Number of columns
    pub cols: usize,
    /// Number of rows
    pub rows: usize,
}

impl GridGeometry {
    /// Wrap signed indices onto the matrix
    #[must_use]
    pub fn wrap(&self, col: isize, row: isize) -> Cell {
        Cell {
            col: col.rem_euclid(self.cols as isize) as usize,
            row: row.rem_euclid(self.rows as isize) as usize,
        }
    }

    /// Bring an arbitrary cell address into range
    #[must_use]
    pub fn normalize(&self, cell: Cell) -> Cell {
        Cell {
            col: cell.col % self.cols,
            row: cell.row % self.rows,
        }
    }

    /// Cell containing a world position (positions wrap first)
    #[must_use]
    pub fn cell_at(&self, pos: Vec2) -> Cell {
        let size = self.cell_size as f32;
        let x = pos.x.rem_euclid(self.arena.x);
        let y = pos.y.rem_euclid(self.arena.y);
        // rem_euclid can round up to the extent itself for tiny negatives
        Cell {
            col: ((x / size) as usize).min(self.cols - 1),
            row: ((y / size) as usize).min(self.rows - 1),
        }
    }

    /// World-space midpoint of a cell.
    ///
    /// The last column and row may be cut short by the arena edge; their
    /// midpoint is taken over the part that lies inside the arena.
    #[must_use]
    pub fn center_of(&self, cell: Cell) -> Vec2 {
        let cell = self.normalize(cell);
        let size = self.cell_size as f32;
        let mid = |index: usize, extent: f32| {
            let lo = index as f32 * size;
            let hi = (lo + size).min(extent);
            (lo + hi) * 0.5
        };
        Vec2::new(mid(cell.col, self.arena.x), mid(cell.row, self.arena.y))
    }
}

/// A toroidal navigation grid.
///
/// The grid is a pure topology provider: it answers adjacency and
/// distance queries and records which cells are blocked, but leaves
/// blocked-cell filtering to the search.
#[derive(Debug, Clone)]
pub struct Grid {
    geometry: GridGeometry,
    connectivity: Connectivity,
    /// Blocked flags, row-major
    blocked: Vec<bool>,
    start: Option<Cell>,
    goal: Option<Cell>,
}

impl Grid {
    /// Create a grid covering the arena with all cells free
    ///
    /// # Errors
    ///
    /// Returns an error if an arena dimension is not a positive finite
    /// number or the cell size is zero
    pub fn new(arena_width: f32, arena_height: f32, cell_size: u32) -> Result<Self, GridError> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(arena_width) || !valid(arena_height) {
            return Err(GridError::InvalidArena {
                width: arena_width,
                height: arena_height,
            });
        }
        if cell_size == 0 {
            return Err(GridError::ZeroCellSize);
        }

        let size = cell_size as f32;
        let cols = (arena_width / size).ceil().max(1.0) as usize;
        let rows = (arena_height / size).ceil().max(1.0) as usize;

        Ok(Self {
            geometry: GridGeometry {
                arena: Vec2::new(arena_width, arena_height),
                cell_size,
                cols,
                rows,
            },
            connectivity: Connectivity::Four,
            blocked: vec![false; cols * rows],
            start: None,
            goal: None,
        })
    }

    /// Set the neighborhood used by [`Grid::neighbors`]
    #[must_use]
    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// Clear all blocked flags and markers, keeping the dimensions
    pub fn reset(&mut self) {
        self.blocked.fill(false);
        self.start = None;
        self.goal = None;
    }

    /// Whether this grid was built for the given arena and cell size
    #[must_use]
    pub fn matches(&self, arena: Vec2, cell_size: u32) -> bool {
        self.geometry.arena == arena && self.geometry.cell_size == cell_size
    }

    /// Dimensions of this grid
    #[must_use]
    pub fn geometry(&self) -> GridGeometry {
        self.geometry
    }

    /// Number of columns
    #[must_use]
    pub fn cols(&self) -> usize {
        self.geometry.cols
    }

    /// Number of rows
    #[must_use]
    pub fn rows(&self) -> usize {
        self.geometry.rows
    }

    /// Cell edge length in world units
    #[must_use]
    pub fn cell_size(&self) -> u32 {
        self.geometry.cell_size
    }

    /// Arena size in world units
    #[must_use]
    pub fn arena(&self) -> Vec2 {
        self.geometry.arena
    }

    /// Neighborhood in use
    #[must_use]
    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// Bring an arbitrary cell address into range
    #[must_use]
    pub fn normalize(&self, cell: Cell) -> Cell {
        self.geometry.normalize(cell)
    }

    /// Cell containing a world position
    #[must_use]
    pub fn cell_at(&self, pos: Vec2) -> Cell {
        self.geometry.cell_at(pos)
    }

    /// World-space midpoint of a cell
    #[must_use]
    pub fn center_of(&self, cell: Cell) -> Vec2 {
        self.geometry.center_of(cell)
    }

    fn index(&self, cell: Cell) -> usize {
        let cell = self.normalize(cell);
        cell.row * self.geometry.cols + cell.col
    }

    /// Mark a cell as impassable
    pub fn mark_blocked(&mut self, cell: Cell) {
        let index = self.index(cell);
        self.blocked[index] = true;
    }

    /// Mark a cell as passable again
    pub fn unblock(&mut self, cell: Cell) {
        let index = self.index(cell);
        self.blocked[index] = false;
    }

    /// Check if a cell is impassable
    #[must_use]
    pub fn is_blocked(&self, cell: Cell) -> bool {
        self.blocked[self.index(cell)]
    }

    /// Number of blocked cells
    #[must_use]
    pub fn blocked_count(&self) -> usize {
        self.blocked.iter().filter(|&&b| b).count()
    }

    /// All blocked cells in row-major order
    #[must_use]
    pub fn blocked_cells(&self) -> Vec<Cell> {
        let cols = self.geometry.cols;
        self.blocked
            .iter()
            .enumerate()
            .filter(|(_, blocked)| **blocked)
            .map(|(i, _)| Cell::new(i % cols, i / cols))
            .collect()
    }

    /// Record the start cell of the current planning cycle
    pub fn set_start(&mut self, cell: Cell) {
        self.start = Some(self.normalize(cell));
    }

    /// Record the goal cell of the current planning cycle
    pub fn set_goal(&mut self, cell: Cell) {
        self.goal = Some(self.normalize(cell));
    }

    /// Start marker, if set
    #[must_use]
    pub fn start(&self) -> Option<Cell> {
        self.start
    }

    /// Goal marker, if set
    #[must_use]
    pub fn goal(&self) -> Option<Cell> {
        self.goal
    }

    /// Neighbors of a cell, wrapping at the edges.
    ///
    /// Blocked neighbors are included. On grids narrower than three cells
    /// the wrapped offsets can coincide; duplicates and the cell itself
    /// are dropped.
    #[must_use]
    pub fn neighbors(&self, cell: Cell) -> SmallVec<[Cell; 8]> {
        // Orthogonal offsets first so 4- and 8-neighborhoods share an order
        const OFFSETS: [(isize, isize); 8] = [
            (-1, 0),
            (1, 0),
            (0, -1),
            (0, 1),
            (-1, -1),
            (1, -1),
            (-1, 1),
            (1, 1),
        ];

        let cell = self.normalize(cell);
        let offsets = match self.connectivity {
            Connectivity::Four => &OFFSETS[..4],
            Connectivity::Eight => &OFFSETS[..],
        };

        let mut result = SmallVec::new();
        for &(dc, dr) in offsets {
            let next = self
                .geometry
                .wrap(cell.col as isize + dc, cell.row as isize + dr);
            if next != cell && !result.contains(&next) {
                result.push(next);
            }
        }
        result
    }

    /// Per-axis wrapped distance between two cells, in cells
    #[must_use]
    pub fn wrapped_delta(&self, a: Cell, b: Cell) -> (usize, usize) {
        let (a, b) = (self.normalize(a), self.normalize(b));
        let dc = a.col.abs_diff(b.col);
        let dr = a.row.abs_diff(b.row);
        (
            dc.min(self.geometry.cols - dc),
            dr.min(self.geometry.rows - dr),
        )
    }

    /// Toroidal distance between two cells, in cells
    #[must_use]
    pub fn distance(&self, a: Cell, b: Cell, metric: DistanceMetric) -> f32 {
        let (dc, dr) = self.wrapped_delta(a, b);
        metric.combine(dc as f32, dr as f32)
    }

    /// Toroidal distance between two cells, in world units
    #[must_use]
    pub fn heuristic(&self, a: Cell, b: Cell, metric: DistanceMetric) -> f32 {
        self.distance(a, b, metric) * self.geometry.cell_size as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_grid(cols: usize, rows: usize) -> Grid {
        Grid::new(cols as f32 * 10.0, rows as f32 * 10.0, 10).unwrap()
    }

    #[test]
    fn test_dimensions_round_up() {
        let grid = Grid::new(1000.0, 990.0, 40).unwrap();
        assert_eq!(grid.cols(), 25);
        assert_eq!(grid.rows(), 25);

        let grid = Grid::new(1000.0, 1000.0, 30).unwrap();
        assert_eq!(grid.cols(), 34);
    }

    #[test]
    fn test_rejects_degenerate_geometry() {
        assert!(matches!(
            Grid::new(0.0, 100.0, 10),
            Err(GridError::InvalidArena { .. })
        ));
        assert!(Grid::new(100.0, -5.0, 10).is_err());
        assert!(Grid::new(f32::NAN, 100.0, 10).is_err());
        assert_eq!(Grid::new(100.0, 100.0, 0).unwrap_err(), GridError::ZeroCellSize);
    }

    #[test]
    fn test_neighbors_wrap_columns() {
        let grid = make_grid(5, 4);

        let left_edge = grid.neighbors(Cell::new(0, 2));
        assert_eq!(left_edge.len(), 4);
        assert!(left_edge.contains(&Cell::new(4, 2)));
        assert!(left_edge.contains(&Cell::new(1, 2)));

        let right_edge = grid.neighbors(Cell::new(4, 2));
        assert!(right_edge.contains(&Cell::new(0, 2)));
    }

    #[test]
    fn test_neighbors_wrap_rows() {
        let grid = make_grid(5, 4);

        let top = grid.neighbors(Cell::new(2, 0));
        assert!(top.contains(&Cell::new(2, 3)));

        let bottom = grid.neighbors(Cell::new(2, 3));
        assert!(bottom.contains(&Cell::new(2, 0)));
    }

    #[test]
    fn test_eight_connectivity_corner() {
        let grid = make_grid(5, 5).with_connectivity(Connectivity::Eight);
        let neighbors = grid.neighbors(Cell::new(0, 0));

        assert_eq!(neighbors.len(), 8);
        assert!(neighbors.contains(&Cell::new(4, 4)));
        assert!(neighbors.contains(&Cell::new(1, 4)));
        assert!(neighbors.contains(&Cell::new(4, 1)));
    }

    #[test]
    fn test_neighbors_on_narrow_grid_are_unique() {
        let grid = make_grid(1, 3);
        let neighbors = grid.neighbors(Cell::new(0, 0));

        assert_eq!(neighbors.len(), 2);
        assert!(!neighbors.contains(&Cell::new(0, 0)));

        let grid = make_grid(2, 2);
        assert_eq!(grid.neighbors(Cell::new(0, 0)).len(), 2);
    }

    #[test]
    fn test_neighbors_include_blocked_cells() {
        let mut grid = make_grid(5, 5);
        grid.mark_blocked(Cell::new(1, 0));

        assert!(grid.neighbors(Cell::new(0, 0)).contains(&Cell::new(1, 0)));
    }

    #[test]
    fn test_cell_at_wraps_world_position() {
        let grid = Grid::new(1000.0, 1000.0, 40).unwrap();

        assert_eq!(grid.cell_at(Vec2::new(10.0, 10.0)), Cell::new(0, 0));
        assert_eq!(grid.cell_at(Vec2::new(990.0, 990.0)), Cell::new(24, 24));
        assert_eq!(grid.cell_at(Vec2::new(-10.0, 1010.0)), Cell::new(24, 0));
        assert_eq!(grid.cell_at(Vec2::new(2040.0, 45.0)), Cell::new(1, 1));
    }

    #[test]
    fn test_center_of() {
        let grid = Grid::new(1000.0, 1000.0, 40).unwrap();
        let center = grid.center_of(Cell::new(12, 12));

        assert!((center - Vec2::new(500.0, 500.0)).length() < 0.001);
        assert_eq!(grid.cell_at(center), Cell::new(12, 12));
    }

    #[test]
    fn test_center_of_partial_cell_stays_in_arena() {
        let grid = Grid::new(1000.0, 1000.0, 30).unwrap();
        let center = grid.center_of(Cell::new(33, 0));

        assert!((center.x - 995.0).abs() < 0.001);
        assert!((center.y - 15.0).abs() < 0.001);
    }

    #[test]
    fn test_distance_properties() {
        let grid = make_grid(7, 5);
        let cells: Vec<Cell> = (0..5)
            .flat_map(|row| (0..7).map(move |col| Cell::new(col, row)))
            .collect();

        for &a in &cells {
            assert_eq!(grid.distance(a, a, DistanceMetric::Euclidean), 0.0);
            for &b in &cells {
                for metric in [
                    DistanceMetric::Euclidean,
                    DistanceMetric::Chebyshev,
                    DistanceMetric::Manhattan,
                ] {
                    assert_eq!(grid.distance(a, b, metric), grid.distance(b, a, metric));
                }

                let (dc, dr) = grid.wrapped_delta(a, b);
                assert!(dc <= 7 / 2);
                assert!(dr <= 5 / 2);
                assert!(grid.distance(a, b, DistanceMetric::Chebyshev) <= 3.0);
            }
        }
    }

    #[test]
    fn test_distance_uses_wraparound() {
        let grid = Grid::new(1000.0, 1000.0, 40).unwrap();
        let a = Cell::new(0, 0);
        let b = Cell::new(24, 24);

        assert_eq!(grid.wrapped_delta(a, b), (1, 1));
        assert_eq!(grid.distance(a, b, DistanceMetric::Manhattan), 2.0);
        assert_eq!(grid.heuristic(a, b, DistanceMetric::Chebyshev), 40.0);
    }

    #[test]
    fn test_blocked_bookkeeping_and_reset() {
        let mut grid = make_grid(4, 4);
        grid.mark_blocked(Cell::new(3, 1));
        grid.mark_blocked(Cell::new(0, 0));
        grid.set_start(Cell::new(1, 1));

        assert!(grid.is_blocked(Cell::new(3, 1)));
        assert_eq!(grid.blocked_cells(), vec![Cell::new(0, 0), Cell::new(3, 1)]);

        grid.unblock(Cell::new(3, 1));
        assert_eq!(grid.blocked_count(), 1);

        grid.reset();
        assert_eq!(grid.blocked_count(), 0);
        assert!(grid.start().is_none());
    }

    #[test]
    fn test_toroidal_delta() {
        let arena = Vec2::new(1000.0, 1000.0);
        let delta = toroidal_delta(Vec2::new(990.0, 10.0), Vec2::new(10.0, 990.0), arena);

        assert!((delta - Vec2::new(20.0, -20.0)).length() < 0.001);
        assert!((toroidal_distance(Vec2::ZERO, Vec2::new(999.0, 0.0), arena) - 1.0).abs() < 0.01);
    }
}
