//! Navigation configuration

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::nav::{
    Connectivity, DistanceMetric, FollowerConfig, PdController, SearchEngine, SearchStrategy,
};

/// Tunable parameters for one navigator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Frontier ordering rule
    pub strategy: SearchStrategy,
    /// Distance used for the search heuristic
    pub metric: DistanceMetric,
    /// Grid neighborhood
    pub connectivity: Connectivity,
    /// Maximum node expansions per search
    pub max_expansions: usize,
    /// Ticks a route is followed before a fresh plan is made
    pub replan_interval: u32,
    /// Smallest cell size, used when no large obstacles are present
    pub min_cell_size: u32,
    /// Clearance added to every obstacle radius
    pub obstacle_margin: f32,
    /// Distance at which a waypoint counts as reached
    pub arrival_radius: f32,
    /// Proportional gain of the waypoint controller
    pub kp: f32,
    /// Derivative gain of the waypoint controller
    pub kd: f32,
    /// Acceleration limit of the waypoint controller
    pub max_acceleration: f32,
    /// Keep the explored search tree of the latest plan
    pub collect_search_tree: bool,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            strategy: SearchStrategy::AStar,
            metric: DistanceMetric::Euclidean,
            connectivity: Connectivity::Four,
            max_expansions: 1000,
            replan_interval: 15,
            min_cell_size: 20,
            obstacle_margin: 0.0,
            arrival_radius: 10.0,
            kp: 1.0,
            kd: 2.0,
            max_acceleration: 200.0,
            collect_search_tree: false,
        }
    }
}

impl NavConfig {
    /// Set the search strategy
    #[must_use]
    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the heuristic distance metric
    #[must_use]
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Set the grid neighborhood
    #[must_use]
    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// Set the expansion budget
    #[must_use]
    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = max_expansions;
        self
    }

    /// Set the replanning interval in ticks
    #[must_use]
    pub fn with_replan_interval(mut self, ticks: u32) -> Self {
        self.replan_interval = ticks;
        self
    }

    /// Set the minimum cell size
    #[must_use]
    pub fn with_min_cell_size(mut self, size: u32) -> Self {
        self.min_cell_size = size;
        self
    }

    /// Set the obstacle clearance
    #[must_use]
    pub fn with_obstacle_margin(mut self, margin: f32) -> Self {
        self.obstacle_margin = margin;
        self
    }

    /// Set the waypoint arrival radius
    #[must_use]
    pub fn with_arrival_radius(mut self, radius: f32) -> Self {
        self.arrival_radius = radius;
        self
    }

    /// Set the controller gains
    #[must_use]
    pub fn with_gains(mut self, kp: f32, kd: f32) -> Self {
        self.kp = kp;
        self.kd = kd;
        self
    }

    /// Set the controller acceleration limit
    #[must_use]
    pub fn with_max_acceleration(mut self, max_acceleration: f32) -> Self {
        self.max_acceleration = max_acceleration;
        self
    }

    /// Keep or discard the search tree of each plan
    #[must_use]
    pub fn with_search_tree(mut self, collect: bool) -> Self {
        self.collect_search_tree = collect;
        self
    }

    /// Search engine described by this config
    #[must_use]
    pub fn search_engine(&self) -> SearchEngine {
        SearchEngine::new(self.strategy, self.metric, self.max_expansions)
    }

    /// Follower settings described by this config
    #[must_use]
    pub fn follower_config(&self) -> FollowerConfig {
        FollowerConfig {
            arrival_radius: self.arrival_radius,
            replan_interval: self.replan_interval,
            controller: PdController::new(self.kp, self.kd, self.max_acceleration),
        }
    }

    /// Check that every parameter is usable
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad parameter
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |what: &str| Err(ConfigError::Invalid(what.to_string()));
        if self.replan_interval == 0 {
            return invalid("replan_interval must be at least 1");
        }
        if self.min_cell_size == 0 {
            return invalid("min_cell_size must be positive");
        }
        if !(self.obstacle_margin.is_finite() && self.obstacle_margin >= 0.0) {
            return invalid("obstacle_margin must be a non-negative number");
        }
        if !(self.arrival_radius.is_finite() && self.arrival_radius > 0.0) {
            return invalid("arrival_radius must be positive");
        }
        if !(self.max_acceleration.is_finite() && self.max_acceleration > 0.0) {
            return invalid("max_acceleration must be positive");
        }
        Ok(())
    }

    /// Parse and validate a config from RON text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid RON or a parameter is out
    /// of range
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            ron::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_ron_str(&content)
    }
}

/// Errors that can occur while loading a config
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// File I/O error
    IoError(String),
    /// Malformed RON
    ParseError(String),
    /// A parameter is out of range
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::ParseError(e) => write!(f, "Parse error: {e}"),
            Self::Invalid(e) => write!(f, "Invalid config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
