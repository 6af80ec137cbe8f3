//! Best-first search over a toroidal grid
//!
//! One engine covers both A* (`cost + heuristic`) and greedy best-first
//! (`heuristic` only); the strategy only changes the frontier priority.
//!
//! Frontier entries with equal priority pop in insertion order, so a
//! given grid, start, and goal always produce the same route.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::grid::{Cell, DistanceMetric, Grid};
use super::route::Route;

/// Default cap on node expansions per search
pub const DEFAULT_MAX_EXPANSIONS: usize = 1000;

/// Frontier ordering rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SearchStrategy {
    /// Order by accumulated cost plus heuristic
    #[default]
    AStar,
    /// Order by heuristic alone
    GreedyBestFirst,
}

impl SearchStrategy {
    /// Frontier priority of a partial route
    #[must_use]
    pub fn priority(self, cost: u32, heuristic: f32) -> f32 {
        match self {
            Self::AStar => cost as f32 + heuristic,
            Self::GreedyBestFirst => heuristic,
        }
    }
}

/// Why a search produced no route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchError {
    /// The expansion budget ran out before the goal was reached
    BudgetExhausted {
        /// Expansions performed
        expansions: usize,
    },
    /// The frontier emptied without reaching the goal
    Unreachable {
        /// Expansions performed
        expansions: usize,
    },
}

impl SearchError {
    /// Expansions performed before giving up
    #[must_use]
    pub fn expansions(&self) -> usize {
        match *self {
            Self::BudgetExhausted { expansions } | Self::Unreachable { expansions } => expansions,
        }
    }
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BudgetExhausted { expansions } => {
                write!(f, "Search budget exhausted after {expansions} expansions")
            }
            Self::Unreachable { expansions } => {
                write!(f, "Goal unreachable after {expansions} expansions")
            }
        }
    }
}

impl std::error::Error for SearchError {}

/// A node of the search tree: the last cell of a partial route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeNode {
    /// Cell reached by this partial route
    pub cell: Cell,
    /// Index of the node this route was extended from
    pub parent: Option<usize>,
    /// Cost of the partial route
    pub cost: u32,
}

/// Everything a search explored, for overlays and analysis
#[derive(Debug, Clone, Default)]
pub struct SearchTree {
    nodes: Vec<TreeNode>,
    expanded: Vec<usize>,
}

impl SearchTree {
    /// Every node created, including ones never expanded
    #[must_use]
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Number of expanded nodes
    #[must_use]
    pub fn expanded_count(&self) -> usize {
        self.expanded.len()
    }

    /// Cells in expansion order
    #[must_use]
    pub fn expanded_cells(&self) -> Vec<Cell> {
        self.expanded.iter().map(|&i| self.nodes[i].cell).collect()
    }

    /// The partial route of every expanded node, in expansion order
    #[must_use]
    pub fn expanded_routes(&self) -> Vec<Route> {
        self.expanded.iter().map(|&i| self.route_to(i)).collect()
    }

    /// Parent-to-child edges of the tree
    #[must_use]
    pub fn edges(&self) -> Vec<(Cell, Cell)> {
        self.nodes
            .iter()
            .filter_map(|node| node.parent.map(|p| (self.nodes[p].cell, node.cell)))
            .collect()
    }

    fn route_to(&self, index: usize) -> Route {
        let mut cells = Vec::new();
        let mut current = Some(index);
        while let Some(i) = current {
            cells.push(self.nodes[i].cell);
            current = self.nodes[i].parent;
        }
        cells.reverse();
        Route::from_parts(cells, self.nodes[index].cost)
    }

    fn on_route(&self, index: usize, cell: Cell) -> bool {
        let mut current = Some(index);
        while let Some(i) = current {
            if self.nodes[i].cell == cell {
                return true;
            }
            current = self.nodes[i].parent;
        }
        false
    }
}

/// Result of a search together with its explored tree
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// The route, or why none was found
    pub result: Result<Route, SearchError>,
    /// Explored nodes
    pub tree: SearchTree,
}

/// Frontier entry for the priority queue
#[derive(Debug, Clone, Copy)]
struct FrontierEntry {
    priority: f32,
    /// Insertion counter; lower pops first among equal priorities
    seq: u64,
    node: usize,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse for min-heap
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Grid search engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchEngine {
    /// Frontier ordering rule
    pub strategy: SearchStrategy,
    /// Distance used for the heuristic
    pub metric: DistanceMetric,
    /// Maximum node expansions before giving up
    pub max_expansions: usize,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self {
            strategy: SearchStrategy::AStar,
            metric: DistanceMetric::Euclidean,
            max_expansions: DEFAULT_MAX_EXPANSIONS,
        }
    }
}

impl SearchEngine {
    /// Create a new search engine
    #[must_use]
    pub fn new(strategy: SearchStrategy, metric: DistanceMetric, max_expansions: usize) -> Self {
        Self {
            strategy,
            metric,
            max_expansions,
        }
    }

    /// Find a route from `start` to `goal`
    ///
    /// # Errors
    ///
    /// Returns a [`SearchError`] if the goal cannot be reached within the
    /// expansion budget. No partial route is ever returned.
    pub fn find(&self, grid: &Grid, start: Cell, goal: Cell) -> Result<Route, SearchError> {
        self.find_with_tree(grid, start, goal).result
    }

    /// Find a route and keep the explored search tree
    #[must_use]
    pub fn find_with_tree(&self, grid: &Grid, start: Cell, goal: Cell) -> SearchOutcome {
        let start = grid.normalize(start);
        let goal = grid.normalize(goal);
        let step_cost = grid.cell_size();
        let heuristic = |cell: Cell| grid.heuristic(cell, goal, self.metric);

        let mut tree = SearchTree {
            nodes: vec![TreeNode {
                cell: start,
                parent: None,
                cost: 0,
            }],
            expanded: Vec::new(),
        };

        if start != goal && grid.is_blocked(goal) {
            log::debug!("Search goal {goal} is blocked");
            return SearchOutcome {
                result: Err(SearchError::Unreachable { expansions: 0 }),
                tree,
            };
        }

        let mut best_cost: FxHashMap<Cell, u32> = FxHashMap::default();
        best_cost.insert(start, 0);

        let mut frontier = BinaryHeap::new();
        let mut seq = 0u64;
        frontier.push(FrontierEntry {
            priority: self.strategy.priority(0, heuristic(start)),
            seq,
            node: 0,
        });

        while let Some(entry) = frontier.pop() {
            let node = tree.nodes[entry.node];

            // A cheaper route to this cell was pushed after this entry
            if best_cost.get(&node.cell).is_some_and(|&best| node.cost > best) {
                continue;
            }

            if tree.expanded.len() >= self.max_expansions {
                return SearchOutcome {
                    result: Err(SearchError::BudgetExhausted {
                        expansions: tree.expanded.len(),
                    }),
                    tree,
                };
            }
            tree.expanded.push(entry.node);

            if node.cell == goal {
                let route = tree.route_to(entry.node);
                debug_assert!(route.is_contiguous(grid));
                return SearchOutcome {
                    result: Ok(route),
                    tree,
                };
            }

            for next in grid.neighbors(node.cell) {
                if grid.is_blocked(next) || tree.on_route(entry.node, next) {
                    continue;
                }

                let cost = node.cost + step_cost;
                if best_cost.get(&next).is_some_and(|&best| cost >= best) {
                    continue;
                }
                best_cost.insert(next, cost);

                tree.nodes.push(TreeNode {
                    cell: next,
                    parent: Some(entry.node),
                    cost,
                });
                seq += 1;
                frontier.push(FrontierEntry {
                    priority: self.strategy.priority(cost, heuristic(next)),
                    seq,
                    node: tree.nodes.len() - 1,
                });
            }
        }

        SearchOutcome {
            result: Err(SearchError::Unreachable {
                expansions: tree.expanded.len(),
            }),
            tree,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::grid::Connectivity;

    fn open_grid(cols: usize, rows: usize) -> Grid {
        Grid::new(cols as f32 * 10.0, rows as f32 * 10.0, 10).unwrap()
    }

    /// Two partial walls at columns 0 and 6, spanning rows 2..=9
    fn walled_grid() -> Grid {
        let mut grid = open_grid(12, 12);
        for row in 2..10 {
            grid.mark_blocked(Cell::new(0, row));
            grid.mark_blocked(Cell::new(6, row));
        }
        grid
    }

    fn assert_valid_route(grid: &Grid, route: &Route) {
        assert!(route.is_contiguous(grid));
        assert_eq!(route.cost(), (route.len() as u32 - 1) * grid.cell_size());
        assert!(route.cells().iter().all(|&c| !grid.is_blocked(c)));
    }

    #[test]
    fn test_direct_path() {
        let grid = open_grid(10, 10);
        let engine = SearchEngine::default();

        let route = engine.find(&grid, Cell::new(1, 1), Cell::new(4, 1)).unwrap();

        assert_eq!(route.len(), 4);
        assert_eq!(route.cost(), 30);
        assert_valid_route(&grid, &route);
    }

    #[test]
    fn test_start_is_goal() {
        let grid = open_grid(5, 5);
        let route = SearchEngine::default()
            .find(&grid, Cell::new(2, 2), Cell::new(2, 2))
            .unwrap();

        assert_eq!(route.len(), 1);
        assert_eq!(route.cost(), 0);
    }

    #[test]
    fn test_path_wraps_across_edge() {
        let grid = open_grid(10, 10);
        let route = SearchEngine::default()
            .find(&grid, Cell::new(0, 5), Cell::new(9, 5))
            .unwrap();

        assert_eq!(route.cells(), &[Cell::new(0, 5), Cell::new(9, 5)]);
        assert_eq!(route.cost(), 10);
    }

    #[test]
    fn test_routes_around_wall() {
        // A full-height wall; on a torus the only way around is the far side
        let mut grid = open_grid(10, 10);
        for row in 0..10 {
            grid.mark_blocked(Cell::new(5, row));
        }

        let route = SearchEngine::default()
            .find(&grid, Cell::new(4, 5), Cell::new(6, 5))
            .unwrap();

        assert_valid_route(&grid, &route);
        assert_eq!(route.len(), 9);
        assert!(route.cells().contains(&Cell::new(0, 5)));
    }

    #[test]
    fn test_no_path() {
        let mut grid = open_grid(6, 6);
        for cell in [
            Cell::new(2, 3),
            Cell::new(4, 3),
            Cell::new(3, 2),
            Cell::new(3, 4),
        ] {
            grid.mark_blocked(cell);
        }

        let err = SearchEngine::default()
            .find(&grid, Cell::new(0, 0), Cell::new(3, 3))
            .unwrap_err();

        assert!(matches!(err, SearchError::Unreachable { .. }));
    }

    #[test]
    fn test_blocked_goal_fails_fast() {
        let mut grid = open_grid(6, 6);
        grid.mark_blocked(Cell::new(3, 3));

        let err = SearchEngine::default()
            .find(&grid, Cell::new(0, 0), Cell::new(3, 3))
            .unwrap_err();

        assert_eq!(err, SearchError::Unreachable { expansions: 0 });
    }

    #[test]
    fn test_budget_of_one_fails_without_partial_route() {
        let grid = open_grid(10, 10);
        let engine = SearchEngine::new(SearchStrategy::AStar, DistanceMetric::Euclidean, 1);

        let outcome = engine.find_with_tree(&grid, Cell::new(0, 0), Cell::new(5, 5));

        assert_eq!(
            outcome.result,
            Err(SearchError::BudgetExhausted { expansions: 1 })
        );
        assert_eq!(outcome.tree.expanded_count(), 1);
    }

    #[test]
    fn test_a_star_is_optimal_with_admissible_heuristic() {
        let grid = walled_grid();
        let engine = SearchEngine::new(SearchStrategy::AStar, DistanceMetric::Manhattan, 5000);

        let route = engine.find(&grid, Cell::new(3, 6), Cell::new(9, 6)).unwrap();

        assert_valid_route(&grid, &route);
        // 4 down to row 10, 6 across, 4 back up
        assert_eq!(route.len(), 15);
    }

    #[test]
    fn test_greedy_finds_valid_route() {
        let grid = walled_grid();
        let engine = SearchEngine::new(
            SearchStrategy::GreedyBestFirst,
            DistanceMetric::Euclidean,
            5000,
        );

        let route = engine.find(&grid, Cell::new(3, 6), Cell::new(9, 6)).unwrap();

        assert_valid_route(&grid, &route);
        assert_eq!(route.goal(), Cell::new(9, 6));
    }

    #[test]
    fn test_eight_connectivity_uses_diagonals() {
        let grid = open_grid(10, 10).with_connectivity(Connectivity::Eight);
        let engine = SearchEngine::new(SearchStrategy::AStar, DistanceMetric::Chebyshev, 1000);

        let route = engine.find(&grid, Cell::new(1, 1), Cell::new(4, 4)).unwrap();

        assert_eq!(route.len(), 4);
        assert_valid_route(&grid, &route);
    }

    #[test]
    fn test_search_is_deterministic() {
        let grid = open_grid(15, 15);
        let engine = SearchEngine::default();

        let first = engine.find(&grid, Cell::new(2, 2), Cell::new(9, 11)).unwrap();
        let second = engine.find(&grid, Cell::new(2, 2), Cell::new(9, 11)).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_search_tree_records_expansions() {
        let grid = open_grid(8, 8);
        let outcome =
            SearchEngine::default().find_with_tree(&grid, Cell::new(0, 0), Cell::new(3, 0));
        let route = outcome.result.unwrap();

        assert_eq!(outcome.tree.expanded_cells()[0], Cell::new(0, 0));
        assert_eq!(outcome.tree.expanded_cells().last(), Some(&Cell::new(3, 0)));
        assert_eq!(outcome.tree.expanded_routes().last(), Some(&route));
        assert_eq!(outcome.tree.edges().len(), outcome.tree.nodes().len() - 1);
    }

    #[test]
    fn test_frontier_ties_pop_in_insertion_order() {
        let mut heap = BinaryHeap::new();
        for seq in 0..4 {
            heap.push(FrontierEntry {
                priority: 1.0,
                seq,
                node: seq as usize,
            });
        }
        heap.push(FrontierEntry {
            priority: 0.5,
            seq: 9,
            node: 9,
        });

        let order: Vec<usize> = std::iter::from_fn(|| heap.pop().map(|e| e.node)).collect();
        assert_eq!(order, vec![9, 0, 1, 2, 3]);
    }

    #[test]
    fn test_priority_by_strategy() {
        assert!((SearchStrategy::AStar.priority(10, 30.0) - 40.0).abs() < 0.001);
        assert!((SearchStrategy::GreedyBestFirst.priority(10, 30.0) - 30.0).abs() < 0.001);
    }

    #[test]
    fn test_every_free_pair_yields_valid_route() {
        let mut grid = open_grid(7, 6);
        for row in 1..5 {
            grid.mark_blocked(Cell::new(3, row));
        }
        grid.mark_blocked(Cell::new(5, 2));

        let free: Vec<Cell> = (0..grid.rows())
            .flat_map(|row| (0..grid.cols()).map(move |col| Cell::new(col, row)))
            .filter(|&c| !grid.is_blocked(c))
            .collect();

        for connectivity in [Connectivity::Four, Connectivity::Eight] {
            let grid = grid.clone().with_connectivity(connectivity);
            for strategy in [SearchStrategy::AStar, SearchStrategy::GreedyBestFirst] {
                let engine = SearchEngine::new(strategy, DistanceMetric::Euclidean, 1000);
                for &start in &free {
                    for &goal in &free {
                        let route = engine.find(&grid, start, goal).unwrap_or_else(|e| {
                            panic!("{strategy:?}/{connectivity:?} {start} -> {goal}: {e}")
                        });
                        assert_eq!(route.start(), start);
                        assert_eq!(route.goal(), goal);
                        assert_valid_route(&grid, &route);
                    }
                }
            }
        }
    }
}
