//! Motion commands and waypoint steering
//!
//! The follower hands the host one [`MotionCommand`] per tick: where to
//! go, how fast that point is moving, and a suggested acceleration from a
//! proportional-derivative controller.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::grid::toroidal_delta;

/// One tick's instruction for the host's movement controller
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MotionCommand {
    /// Nothing to do
    #[default]
    Idle,
    /// Move toward a point
    MoveTo {
        /// World-space target position
        target: Vec2,
        /// Velocity of the target, used as feed-forward
        target_velocity: Vec2,
        /// Acceleration suggested by the PD controller
        acceleration: Vec2,
    },
}

impl MotionCommand {
    /// Check if this command does nothing
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Target position, if moving
    #[must_use]
    pub fn target(&self) -> Option<Vec2> {
        match self {
            Self::Idle => None,
            Self::MoveTo { target, .. } => Some(*target),
        }
    }

    /// Suggested acceleration (zero when idle)
    #[must_use]
    pub fn acceleration(&self) -> Vec2 {
        match self {
            Self::Idle => Vec2::ZERO,
            Self::MoveTo { acceleration, .. } => *acceleration,
        }
    }
}

/// Proportional-derivative controller toward a moving point.
///
/// `accel = kp * offset + kd * (target_velocity - velocity)`, with the
/// offset measured the short way around the arena and the result clamped
/// to `max_acceleration`. With `kd = 2 * sqrt(kp)` the approach is
/// critically damped and the agent settles on the target without
/// overshooting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PdController {
    /// Gain on position error
    pub kp: f32,
    /// Gain on velocity error
    pub kd: f32,
    /// Acceleration limit
    pub max_acceleration: f32,
}

impl Default for PdController {
    fn default() -> Self {
        Self {
            kp: 1.0,
            kd: 2.0,
            max_acceleration: 200.0,
        }
    }
}

impl PdController {
    /// Create a new controller
    #[must_use]
    pub fn new(kp: f32, kd: f32, max_acceleration: f32) -> Self {
        Self {
            kp,
            kd,
            max_acceleration,
        }
    }

    /// Acceleration that steers `position`/`velocity` onto the target
    #[must_use]
    pub fn acceleration(
        &self,
        position: Vec2,
        velocity: Vec2,
        target: Vec2,
        target_velocity: Vec2,
        arena: Vec2,
    ) -> Vec2 {
        let offset = toroidal_delta(position, target, arena);
        let accel = offset * self.kp + (target_velocity - velocity) * self.kd;
        accel.clamp_length_max(self.max_acceleration)
    }

    /// Build a move command toward the target
    #[must_use]
    pub fn command(
        &self,
        position: Vec2,
        velocity: Vec2,
        target: Vec2,
        target_velocity: Vec2,
        arena: Vec2,
    ) -> MotionCommand {
        MotionCommand::MoveTo {
            target,
            target_velocity,
            acceleration: self.acceleration(position, velocity, target, target_velocity, arena),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARENA: Vec2 = Vec2::new(1000.0, 1000.0);

    #[test]
    fn test_accelerates_toward_target() {
        let pd = PdController::new(1.0, 2.0, 500.0);
        let accel = pd.acceleration(Vec2::ZERO, Vec2::ZERO, Vec2::new(100.0, 0.0), Vec2::ZERO, ARENA);

        assert!((accel - Vec2::new(100.0, 0.0)).length() < 0.001);
    }

    #[test]
    fn test_steers_across_wrapped_edge() {
        let pd = PdController::default();
        let accel = pd.acceleration(
            Vec2::new(990.0, 500.0),
            Vec2::ZERO,
            Vec2::new(10.0, 500.0),
            Vec2::ZERO,
            ARENA,
        );

        assert!(accel.x > 0.0);
        assert!(accel.y.abs() < 0.001);
    }

    #[test]
    fn test_damping_brakes_near_target() {
        let pd = PdController::new(1.0, 2.0, 500.0);
        // Close to the target and still moving fast toward it
        let accel = pd.acceleration(
            Vec2::new(95.0, 0.0),
            Vec2::new(50.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::ZERO,
            ARENA,
        );

        assert!(accel.x < 0.0);
    }

    #[test]
    fn test_feed_forward_matches_target_velocity() {
        let pd = PdController::new(1.0, 2.0, 500.0);
        let target_velocity = Vec2::new(0.0, 30.0);
        let accel = pd.acceleration(
            Vec2::new(100.0, 100.0),
            target_velocity,
            Vec2::new(100.0, 100.0),
            target_velocity,
            ARENA,
        );

        assert!(accel.length() < 0.001);
    }

    #[test]
    fn test_acceleration_is_clamped() {
        let pd = PdController::new(10.0, 0.0, 50.0);
        let accel = pd.acceleration(Vec2::ZERO, Vec2::ZERO, Vec2::new(300.0, 400.0), Vec2::ZERO, ARENA);

        assert!((accel.length() - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_motion_command_accessors() {
        let idle = MotionCommand::default();
        assert!(idle.is_idle());
        assert_eq!(idle.target(), None);
        assert_eq!(idle.acceleration(), Vec2::ZERO);

        let command = PdController::default().command(
            Vec2::ZERO,
            Vec2::ZERO,
            Vec2::new(10.0, 0.0),
            Vec2::ZERO,
            ARENA,
        );
        assert_eq!(command.target(), Some(Vec2::new(10.0, 0.0)));
        assert!(!command.is_idle());
    }
}
