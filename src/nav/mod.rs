//! Navigation module
//!
//! Grid construction, obstacle stamping, best-first search, and route
//! following over a wrap-around arena.

mod follower;
mod grid;
mod navigator;
mod obstacles;
mod route;
mod search;
mod steering;

pub use follower::{DEFAULT_REPLAN_INTERVAL, FollowState, FollowerConfig, PathFollower};
pub use grid::{
    Cell, Connectivity, DistanceMetric, Grid, GridError, GridGeometry, toroidal_delta,
    toroidal_distance,
};
pub use navigator::{Navigator, PlanFailure, PlanStatus, Target};
pub use obstacles::{ObstacleClassifier, Passability};
pub use route::Route;
pub use search::{
    DEFAULT_MAX_EXPANSIONS, SearchEngine, SearchError, SearchOutcome, SearchStrategy, SearchTree,
    TreeNode,
};
pub use steering::{MotionCommand, PdController};
