//! Path planning and following on a wrap-around 2D arena
//!
//! This crate provides:
//! - Occupancy grids whose edges wrap in both axes
//! - Obstacle classification relative to the navigating agent
//! - A* and greedy best-first search with an expansion budget
//! - Waypoint following with PD-controlled motion commands
//! - RON/JSON world snapshots and RON configuration

pub mod core;
pub mod nav;

// Re-exports for convenience
pub use glam;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::core::{NavConfig, ObjectId, ObjectKind, PlanStats, WorldObject, WorldSnapshot};
    pub use crate::nav::{
        Cell, Grid, MotionCommand, Navigator, ObstacleClassifier, PathFollower, Route,
        SearchEngine, SearchStrategy, Target,
    };
    pub use glam::Vec2;
}
