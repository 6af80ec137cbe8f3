//! Per-agent navigation
//!
//! A [`Navigator`] owns everything one agent needs to plan and follow
//! routes: its own grid, search engine, and follower. Each tick it
//! decides whether to replan, then either follows the current route or,
//! when no route could be found, steers straight at the target.
//!
//! # Example
//!
//! ```ignore
//! let mut nav = Navigator::new(ObjectId(1), NavConfig::default());
//! loop {
//!     let snapshot = host.snapshot();
//!     let command = nav.tick(&snapshot, Target::Position(Vec2::new(990.0, 990.0)));
//!     host.apply(command);
//! }
//! ```

use std::fmt;
use std::time::Instant;

use glam::Vec2;

use crate::core::config::NavConfig;
use crate::core::snapshot::{ObjectId, WorldObject, WorldSnapshot};
use crate::core::stats::PlanStats;

use super::follower::PathFollower;
use super::grid::{Cell, Grid, GridError};
use super::obstacles::ObstacleClassifier;
use super::route::Route;
use super::search::{SearchEngine, SearchError, SearchTree};
use super::steering::{MotionCommand, PdController};

/// Where the agent is headed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target {
    /// A fixed point
    Position(Vec2),
    /// A moving object, intercepted using its velocity
    Object {
        /// Current position
        position: Vec2,
        /// Current velocity
        velocity: Vec2,
    },
}

impl Target {
    /// Track an object from the snapshot
    #[must_use]
    pub fn from_object(object: &WorldObject) -> Self {
        Self::Object {
            position: object.position,
            velocity: object.velocity,
        }
    }

    /// Current target position
    #[must_use]
    pub fn position(&self) -> Vec2 {
        match *self {
            Self::Position(position) | Self::Object { position, .. } => position,
        }
    }

    /// Target velocity (zero for fixed points)
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        match *self {
            Self::Position(_) => Vec2::ZERO,
            Self::Object { velocity, .. } => velocity,
        }
    }
}

/// Why a planning cycle produced no route
#[derive(Debug, Clone, PartialEq)]
pub enum PlanFailure {
    /// The grid could not be built from the snapshot
    Grid(GridError),
    /// The search gave up
    Search(SearchError),
}

impl fmt::Display for PlanFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grid(e) => write!(f, "Grid error: {e}"),
            Self::Search(e) => write!(f, "Search error: {e}"),
        }
    }
}

impl std::error::Error for PlanFailure {}

/// Outcome of the latest planning cycle
#[derive(Debug, Clone, PartialEq)]
pub enum PlanStatus {
    /// No plan has been made yet
    NotPlanned,
    /// A multi-cell route is being followed
    Routed {
        /// Route length in cells
        cells: usize,
        /// Route cost
        cost: u32,
    },
    /// Agent and target share a cell; steering directly
    SameCell,
    /// No route; steering directly
    Failed(PlanFailure),
}

/// Plans and follows routes for one agent
#[derive(Debug)]
pub struct Navigator {
    agent_id: ObjectId,
    config: NavConfig,
    engine: SearchEngine,
    controller: PdController,
    follower: PathFollower,
    grid: Option<Grid>,
    last_route: Option<Route>,
    last_tree: Option<SearchTree>,
    last_expansions: usize,
    planned_goal: Option<Cell>,
    status: PlanStatus,
    ticks_since_plan: u32,
    stats: PlanStats,
}

impl Navigator {
    /// Create a navigator for the given agent
    #[must_use]
    pub fn new(agent_id: ObjectId, config: NavConfig) -> Self {
        let follower_config = config.follower_config();
        Self {
            agent_id,
            engine: config.search_engine(),
            controller: follower_config.controller,
            follower: PathFollower::new(follower_config),
            config,
            grid: None,
            last_route: None,
            last_tree: None,
            last_expansions: 0,
            planned_goal: None,
            status: PlanStatus::NotPlanned,
            ticks_since_plan: 0,
            stats: PlanStats::new(),
        }
    }

    /// Advance one tick and return the agent's motion command
    pub fn tick(&mut self, snapshot: &WorldSnapshot, target: Target) -> MotionCommand {
        let Some(agent) = snapshot.object(self.agent_id).copied() else {
            log::warn!("Agent {} missing from snapshot", self.agent_id);
            self.follower.cancel();
            return MotionCommand::Idle;
        };

        self.ticks_since_plan = self.ticks_since_plan.saturating_add(1);
        if self.should_plan(target) {
            self.replan(snapshot, &agent, target);
        }

        if self.follower.is_active() {
            let command = self.follower.step(agent.position, agent.velocity);
            if !command.is_idle() {
                return command;
            }
        }

        self.controller.command(
            agent.position,
            agent.velocity,
            target.position(),
            target.velocity(),
            snapshot.arena,
        )
    }

    fn should_plan(&self, target: Target) -> bool {
        if self.status == PlanStatus::NotPlanned || self.follower.needs_replan() {
            return true;
        }

        let goal = self.grid.as_ref().map(|g| g.cell_at(target.position()));
        if goal != self.planned_goal {
            return true;
        }

        !self.follower.is_active() && self.ticks_since_plan >= self.config.replan_interval
    }

    fn replan(&mut self, snapshot: &WorldSnapshot, agent: &WorldObject, target: Target) {
        let began = Instant::now();
        let result = self.plan(snapshot, agent, target);
        self.stats
            .record_plan(began.elapsed(), self.last_expansions, result.is_ok());
        self.ticks_since_plan = 0;

        match result {
            Ok(route) => {
                self.last_route = Some(route.clone());
                if route.len() > 1 {
                    log::debug!(
                        "Agent {} routed {} cells, cost {}, {} expansions",
                        self.agent_id,
                        route.len(),
                        route.cost(),
                        self.last_expansions
                    );
                    self.status = PlanStatus::Routed {
                        cells: route.len(),
                        cost: route.cost(),
                    };
                    if let Some(grid) = &self.grid {
                        self.follower.begin(route, grid.geometry());
                        self.follower.set_goal_velocity(target.velocity());
                    }
                } else {
                    self.status = PlanStatus::SameCell;
                    self.follower.cancel();
                }
            }
            Err(failure) => {
                log::warn!(
                    "Agent {} has no route ({failure}), moving directly toward target",
                    self.agent_id
                );
                self.status = PlanStatus::Failed(failure);
                self.last_route = None;
                self.follower.cancel();
            }
        }
    }

    /// Rebuild the grid from the snapshot and search it
    fn plan(
        &mut self,
        snapshot: &WorldSnapshot,
        agent: &WorldObject,
        target: Target,
    ) -> Result<Route, PlanFailure> {
        self.last_expansions = 0;

        let classifier =
            ObstacleClassifier::for_object(agent).with_margin(self.config.obstacle_margin);
        let cell_size = classifier.cell_size_hint(&snapshot.objects, self.config.min_cell_size);

        let mut grid = match self.grid.take() {
            Some(mut grid) if grid.matches(snapshot.arena, cell_size) => {
                grid.reset();
                grid
            }
            _ => match Grid::new(snapshot.arena.x, snapshot.arena.y, cell_size) {
                Ok(grid) => grid.with_connectivity(self.config.connectivity),
                Err(e) => {
                    self.planned_goal = None;
                    return Err(PlanFailure::Grid(e));
                }
            },
        };

        classifier.stamp_obstacles(&mut grid, &snapshot.objects);
        let start = grid.cell_at(agent.position);
        let goal = grid.cell_at(target.position());
        classifier.clear_endpoints(&mut grid, start, goal);

        let outcome = self.engine.find_with_tree(&grid, start, goal);
        self.last_expansions = outcome.tree.expanded_count();
        self.last_tree = self.config.collect_search_tree.then_some(outcome.tree);
        self.planned_goal = Some(goal);
        self.grid = Some(grid);

        outcome.result.map_err(PlanFailure::Search)
    }

    /// Report that the host's controller reached the current waypoint
    pub fn mark_finished(&mut self) {
        self.follower.mark_finished();
    }

    /// Force a fresh plan on the next tick
    pub fn invalidate(&mut self) {
        self.follower.cancel();
        self.status = PlanStatus::NotPlanned;
    }

    /// The agent this navigator steers
    #[must_use]
    pub fn agent_id(&self) -> ObjectId {
        self.agent_id
    }

    /// Configuration in use
    #[must_use]
    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    /// Outcome of the latest planning cycle
    #[must_use]
    pub fn status(&self) -> &PlanStatus {
        &self.status
    }

    /// Route found by the latest successful plan
    #[must_use]
    pub fn last_route(&self) -> Option<&Route> {
        self.last_route.as_ref()
    }

    /// Search tree of the latest plan, when collection is enabled
    #[must_use]
    pub fn last_search_tree(&self) -> Option<&SearchTree> {
        self.last_tree.as_ref()
    }

    /// Grid of the latest plan
    #[must_use]
    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    /// Route follower
    #[must_use]
    pub fn follower(&self) -> &PathFollower {
        &self.follower
    }

    /// Planning statistics
    #[must_use]
    pub fn stats(&self) -> &PlanStats {
        &self.stats
    }
}
