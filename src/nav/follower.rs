//! Route following
//!
//! Turns a route into one motion command per tick, advancing through the
//! cell-center waypoints as each is reached, and asks for a fresh plan
//! once the route has been followed for a fixed number of ticks.

use glam::Vec2;

use super::grid::{GridGeometry, toroidal_distance};
use super::route::Route;
use super::steering::{MotionCommand, PdController};

/// Default ticks between forced replans
pub const DEFAULT_REPLAN_INTERVAL: u32 = 15;

/// Configuration for route following
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowerConfig {
    /// Distance at which a waypoint counts as reached
    pub arrival_radius: f32,
    /// Ticks after which the route is considered stale
    pub replan_interval: u32,
    /// Controller producing the suggested acceleration
    pub controller: PdController,
}

impl Default for FollowerConfig {
    fn default() -> Self {
        Self {
            arrival_radius: 10.0,
            replan_interval: DEFAULT_REPLAN_INTERVAL,
            controller: PdController::default(),
        }
    }
}

/// State of route following
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowState {
    /// No route assigned
    Idle,
    /// Advancing along the route
    Following,
    /// Still following, but the route is stale and should be replaced
    Replanning,
    /// Every waypoint has been reached
    Done,
}

/// Follows one route at a time for one agent
#[derive(Debug, Clone)]
pub struct PathFollower {
    config: FollowerConfig,
    route: Option<Route>,
    waypoints: Vec<Vec2>,
    arena: Vec2,
    /// Index of the waypoint currently being approached
    index: usize,
    /// Whether a command toward `waypoints[index]` has been issued
    active: bool,
    /// Set by the host when its controller reports arrival
    finished: bool,
    goal_velocity: Vec2,
    ticks_since_plan: u32,
    state: FollowState,
}

impl PathFollower {
    /// Create an idle follower
    #[must_use]
    pub fn new(config: FollowerConfig) -> Self {
        Self {
            config,
            route: None,
            waypoints: Vec::new(),
            arena: Vec2::ONE,
            index: 0,
            active: false,
            finished: false,
            goal_velocity: Vec2::ZERO,
            ticks_since_plan: 0,
            state: FollowState::Idle,
        }
    }

    /// Start following a route from its first waypoint
    pub fn begin(&mut self, route: Route, geometry: GridGeometry) {
        log::debug!(
            "Following route of {} cells, cost {}",
            route.len(),
            route.cost()
        );
        self.waypoints = route.waypoints(&geometry);
        self.arena = geometry.arena;
        self.route = Some(route);
        self.index = 0;
        self.active = false;
        self.finished = false;
        self.goal_velocity = Vec2::ZERO;
        self.ticks_since_plan = 0;
        self.state = FollowState::Following;
    }

    /// Drop the current route
    pub fn cancel(&mut self) {
        self.route = None;
        self.waypoints.clear();
        self.index = 0;
        self.active = false;
        self.finished = false;
        self.state = FollowState::Idle;
    }

    /// Velocity of the final waypoint, for intercepting a moving target
    pub fn set_goal_velocity(&mut self, velocity: Vec2) {
        self.goal_velocity = velocity;
    }

    /// Report that the host's controller has reached the current target
    pub fn mark_finished(&mut self) {
        if self.active {
            self.finished = true;
        }
    }

    /// Produce this tick's motion command
    pub fn step(&mut self, position: Vec2, velocity: Vec2) -> MotionCommand {
        if matches!(self.state, FollowState::Idle | FollowState::Done) {
            return MotionCommand::Idle;
        }

        self.ticks_since_plan += 1;
        if self.state == FollowState::Following
            && self.ticks_since_plan >= self.config.replan_interval
        {
            log::debug!("Route stale after {} ticks", self.ticks_since_plan);
            self.state = FollowState::Replanning;
        }

        if self.active && (self.finished || self.within_arrival(position, self.index)) {
            self.index += 1;
            self.active = false;
            self.finished = false;
        }

        // Skip intermediate waypoints the agent is already sitting on
        while self.index + 1 < self.waypoints.len() && self.within_arrival(position, self.index) {
            self.index += 1;
        }

        let Some(&target) = self.waypoints.get(self.index) else {
            log::debug!("Route complete: all {} waypoints reached", self.waypoints.len());
            self.state = FollowState::Done;
            self.active = false;
            return MotionCommand::Idle;
        };

        self.active = true;
        let target_velocity = if self.index + 1 == self.waypoints.len() {
            self.goal_velocity
        } else {
            Vec2::ZERO
        };
        self.config
            .controller
            .command(position, velocity, target, target_velocity, self.arena)
    }

    fn within_arrival(&self, position: Vec2, index: usize) -> bool {
        toroidal_distance(position, self.waypoints[index], self.arena) <= self.config.arrival_radius
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> FollowState {
        self.state
    }

    /// Whether the owner should rebuild the grid and search again
    #[must_use]
    pub fn needs_replan(&self) -> bool {
        self.state == FollowState::Replanning
    }

    /// Whether a route is being followed
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.state, FollowState::Following | FollowState::Replanning)
    }

    /// The route being followed
    #[must_use]
    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    /// Index of the waypoint being approached
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.index
    }

    /// Waypoints of the current route
    #[must_use]
    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    /// Ticks since the route was assigned
    #[must_use]
    pub fn ticks_since_plan(&self) -> u32 {
        self.ticks_since_plan
    }
}

impl Default for PathFollower {
    fn default() -> Self {
        Self::new(FollowerConfig::default())
    }
}
