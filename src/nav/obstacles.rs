//! Obstacle classification and footprint stamping

use crate::core::snapshot::{ObjectId, ObjectKind, WorldObject, WorldSnapshot};

use super::grid::{Cell, Grid, toroidal_distance};

/// Whether an object blocks navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Passability {
    /// The agent may fly through it
    Passable,
    /// The agent must route around it
    Impassable,
}

/// Decides which objects block the navigating agent and stamps them
/// onto a grid.
///
/// Classification depends on who is asking: the agent's own ship and its
/// team's bases never block it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleClassifier {
    self_id: ObjectId,
    self_team: Option<u32>,
    /// Extra clearance added to every obstacle radius
    margin: f32,
}

impl ObstacleClassifier {
    /// Create a classifier for the given agent
    #[must_use]
    pub fn new(self_id: ObjectId, self_team: Option<u32>) -> Self {
        Self {
            self_id,
            self_team,
            margin: 0.0,
        }
    }

    /// Create a classifier for the snapshot's agent, taking its team from
    /// the agent's ship
    #[must_use]
    pub fn for_agent(snapshot: &WorldSnapshot) -> Self {
        match snapshot.agent() {
            Some(agent) => Self::for_object(agent),
            None => Self::new(snapshot.agent_id, None),
        }
    }

    /// Create a classifier for the given object
    #[must_use]
    pub fn for_object(agent: &WorldObject) -> Self {
        let team = match agent.kind {
            ObjectKind::Ship { team } | ObjectKind::Base { team } => Some(team),
            _ => None,
        };
        Self::new(agent.id, team)
    }

    /// Set the clearance added to every obstacle radius.
    ///
    /// Negative or non-finite margins fall back to zero.
    #[must_use]
    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = if margin.is_finite() {
            margin.max(0.0)
        } else {
            log::warn!("Ignoring non-finite obstacle margin {margin}");
            0.0
        };
        self
    }

    /// Classify one object
    #[must_use]
    pub fn classify(&self, object: &WorldObject) -> Passability {
        if object.id == self.self_id {
            return Passability::Passable;
        }
        match object.kind {
            ObjectKind::Ship { .. } | ObjectKind::Missile => Passability::Impassable,
            ObjectKind::Asteroid { mineable: true } => Passability::Passable,
            ObjectKind::Asteroid { mineable: false } => Passability::Impassable,
            ObjectKind::Base { team } if Some(team) == self.self_team => Passability::Passable,
            ObjectKind::Base { .. } => Passability::Impassable,
            ObjectKind::Beacon | ObjectKind::Core => Passability::Passable,
        }
    }

    /// Iterate over the impassable objects
    pub fn impassable<'a>(
        &'a self,
        objects: &'a [WorldObject],
    ) -> impl Iterator<Item = &'a WorldObject> + 'a {
        objects
            .iter()
            .filter(move |o| self.classify(o) == Passability::Impassable)
    }

    /// Cell size that lets one cell cover the largest impassable object:
    /// twice its radius, and never less than `minimum`
    #[must_use]
    pub fn cell_size_hint(&self, objects: &[WorldObject], minimum: u32) -> u32 {
        let largest = self
            .impassable(objects)
            .map(|o| o.radius)
            .filter(|r| r.is_finite())
            .fold(0.0f32, f32::max);
        ((2.0 * largest).ceil() as u32).max(minimum)
    }

    /// Mark the footprint of every impassable object as blocked.
    ///
    /// A footprint is every cell whose center lies within the object's
    /// radius (plus margin) of its center, measured across the wrapped
    /// edges, together with the cell containing the center itself.
    pub fn stamp_obstacles(&self, grid: &mut Grid, objects: &[WorldObject]) {
        let mut stamped = 0usize;
        for object in self.impassable(objects) {
            stamp_footprint(grid, object, self.margin);
            stamped += 1;
        }
        log::debug!(
            "Stamped {} obstacles, {} of {} cells blocked",
            stamped,
            grid.blocked_count(),
            grid.cols() * grid.rows()
        );
    }

    /// Free the start and goal cells if an obstacle footprint covers
    /// them, and record them as the grid's markers
    pub fn clear_endpoints(&self, grid: &mut Grid, start: Cell, goal: Cell) {
        for (label, cell) in [("start", start), ("goal", goal)] {
            if grid.is_blocked(cell) {
                log::debug!("Unblocking {label} cell {cell} covered by an obstacle");
                grid.unblock(cell);
            }
        }
        grid.set_start(start);
        grid.set_goal(goal);
    }
}

fn stamp_footprint(grid: &mut Grid, object: &WorldObject, margin: f32) {
    let geometry = grid.geometry();
    let reach = object.radius.max(0.0) + margin;
    let center = geometry.cell_at(object.position);
    grid.mark_blocked(center);

    // An oversized reach covers the whole grid; cap before casting
    let widest = geometry.cols.max(geometry.rows) as f32;
    let span = (reach / geometry.cell_size as f32).ceil().min(widest) as isize + 1;
    let span_cols = span.min(geometry.cols as isize);
    let span_rows = span.min(geometry.rows as isize);

    for dr in -span_rows..=span_rows {
        for dc in -span_cols..=span_cols {
            let cell = geometry.wrap(center.col as isize + dc, center.row as isize + dr);
            let distance =
                toroidal_distance(geometry.center_of(cell), object.position, geometry.arena);
            if distance <= reach {
                grid.mark_blocked(cell);
            }
        }
    }
}
