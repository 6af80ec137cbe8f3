//! Core module
//!
//! World snapshots, navigation configuration, and planning statistics

pub mod config;
pub mod snapshot;
pub mod stats;

pub use config::{ConfigError, NavConfig};
pub use snapshot::{ObjectId, ObjectKind, SnapshotError, WorldObject, WorldSnapshot};
pub use stats::PlanStats;
