//! World snapshots
//!
//! The read-only view of the arena a navigator receives each tick.
//! Snapshots can be saved and loaded in RON (Rusty Object Notation) or
//! JSON so scenarios can be replayed from fixtures.

use std::fmt;
use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Identifier of an object in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Category of an arena object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    /// A ship, possibly the navigating agent itself
    Ship {
        /// Owning team
        team: u32,
    },
    /// An asteroid
    Asteroid {
        /// Whether ships can mine (and fly into) it
        mineable: bool,
    },
    /// A team base
    Base {
        /// Owning team
        team: u32,
    },
    /// A missile in flight
    Missile,
    /// A beacon
    Beacon,
    /// An energy core
    Core,
}

/// A positioned object in the arena
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldObject {
    /// Unique identifier
    pub id: ObjectId,
    /// Center position in world units
    pub position: Vec2,
    /// Velocity in world units per second
    #[serde(default)]
    pub velocity: Vec2,
    /// Collision radius
    pub radius: f32,
    /// Category
    pub kind: ObjectKind,
}

impl WorldObject {
    /// Create a stationary object
    #[must_use]
    pub fn new(id: u64, kind: ObjectKind, position: Vec2, radius: f32) -> Self {
        Self {
            id: ObjectId(id),
            position,
            velocity: Vec2::ZERO,
            radius,
            kind,
        }
    }

    /// Set the velocity
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }
}

/// The state of the arena at one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Simulation tick the snapshot was taken at
    #[serde(default)]
    pub tick: u64,
    /// Arena width and height
    pub arena: Vec2,
    /// The navigating agent
    pub agent_id: ObjectId,
    /// Every live object, the agent included
    pub objects: Vec<WorldObject>,
}

impl WorldSnapshot {
    /// Create an empty snapshot
    #[must_use]
    pub fn new(arena: Vec2, agent_id: ObjectId) -> Self {
        Self {
            tick: 0,
            arena,
            agent_id,
            objects: Vec::new(),
        }
    }

    /// Add an object to the snapshot
    pub fn add_object(&mut self, object: WorldObject) -> usize {
        let index = self.objects.len();
        self.objects.push(object);
        index
    }

    /// Look up an object by id
    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&WorldObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Look up an object by id (mutable)
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut WorldObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// The navigating agent, if present
    #[must_use]
    pub fn agent(&self) -> Option<&WorldObject> {
        self.object(self.agent_id)
    }

    /// Move every object along its velocity, wrapping at the arena edges
    pub fn advance(&mut self, dt: f32) {
        let arena = self.arena;
        for object in &mut self.objects {
            let moved = object.position + object.velocity * dt;
            object.position = Vec2::new(moved.x.rem_euclid(arena.x), moved.y.rem_euclid(arena.y));
        }
        self.tick += 1;
    }

    /// Save the snapshot to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| SnapshotError::SerializeError(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| SnapshotError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load a snapshot from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let content =
            fs::read_to_string(path).map_err(|e| SnapshotError::IoError(e.to_string()))?;
        ron::from_str(&content).map_err(|e| SnapshotError::DeserializeError(e.to_string()))
    }

    /// Save the snapshot to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let json_string = serde_json::to_string_pretty(self)
            .map_err(|e| SnapshotError::SerializeError(e.to_string()))?;
        fs::write(path, json_string).map_err(|e| SnapshotError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load a snapshot from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let content =
            fs::read_to_string(path).map_err(|e| SnapshotError::IoError(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| SnapshotError::DeserializeError(e.to_string()))
    }

    /// Load a snapshot, choosing the format from the file extension
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::load_json(path),
            _ => Self::load_ron(path),
        }
    }
}

/// Errors that can occur during snapshot serialization
#[derive(Debug, Clone)]
pub enum SnapshotError {
    /// File I/O error
    IoError(String),
    /// Serialization error
    SerializeError(String),
    /// Deserialization error
    DeserializeError(String),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::SerializeError(e) => write!(f, "Serialization error: {e}"),
            Self::DeserializeError(e) => write!(f, "Deserialization error: {e}"),
        }
    }
}

impl std::error::Error for SnapshotError {}
