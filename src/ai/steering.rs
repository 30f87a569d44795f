//! Kinematic steering for the hunter
//!
//! Positions and headings live on the XZ plane as `Vec2` (x, z). A yaw of 0
//! faces +Z and positive yaw turns toward +X.

use std::f32::consts::{PI, TAU};

use glam::Vec2;

/// Unit heading for a yaw angle
#[must_use]
pub fn forward(yaw: f32) -> Vec2 {
    Vec2::new(yaw.sin(), yaw.cos())
}

/// Yaw for a direction; zero-length directions keep `fallback`
#[must_use]
pub fn yaw_of(direction: Vec2, fallback: f32) -> f32 {
    if direction.length_squared() <= f32::EPSILON {
        fallback
    } else {
        direction.x.atan2(direction.y)
    }
}

/// Wrap an angle into `(-PI, PI]`
#[must_use]
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Signed smallest rotation from `from` to `to`
#[must_use]
pub fn angle_delta(from: f32, to: f32) -> f32 {
    wrap_angle(to - from)
}

/// Rotate `current` toward `target` by at most `max_step`
#[must_use]
pub fn turn_towards(current: f32, target: f32, max_step: f32) -> f32 {
    let delta = angle_delta(current, target);
    if delta.abs() <= max_step {
        wrap_angle(target)
    } else {
        wrap_angle(current + max_step * delta.signum())
    }
}

/// Output from a steering behavior
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SteeringOutput {
    /// Displacement for this tick on the XZ plane
    pub linear: Vec2,
    /// Yaw change for this tick
    pub angular: f32,
}

impl SteeringOutput {
    /// Zero steering
    pub const ZERO: Self = Self {
        linear: Vec2::ZERO,
        angular: 0.0,
    };

    /// Whether this output moves the agent
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.linear.length_squared() > 1e-10
    }
}

/// Trait for steering behaviors
pub trait SteeringBehavior {
    /// Calculate this tick's motion for an agent at `position` facing `yaw`
    fn calculate(&self, position: Vec2, yaw: f32, dt: f32) -> SteeringOutput;
}

/// Arrive behavior - walk straight to a point, turning to face the direction of travel
#[derive(Debug, Clone)]
pub struct Arrive {
    /// Target position
    pub target: Vec2,
    /// Movement speed
    pub speed: f32,
    /// Turn rate in radians per second
    pub turn_speed: f32,
    /// Stopping distance
    pub target_radius: f32,
}

impl Arrive {
    /// Create a new arrive behavior
    #[must_use]
    pub fn new(target: Vec2, speed: f32, turn_speed: f32) -> Self {
        Self {
            target,
            speed,
            turn_speed,
            target_radius: 0.05,
        }
    }

    #[must_use]
    pub fn with_target_radius(mut self, radius: f32) -> Self {
        self.target_radius = radius;
        self
    }
}

impl SteeringBehavior for Arrive {
    fn calculate(&self, position: Vec2, yaw: f32, dt: f32) -> SteeringOutput {
        let to_target = self.target - position;
        let distance = to_target.length();

        if distance <= self.target_radius {
            return SteeringOutput::ZERO;
        }

        let direction = to_target / distance;
        let step = (self.speed * dt).min(distance);
        let desired_yaw = yaw_of(direction, yaw);
        let new_yaw = turn_towards(yaw, desired_yaw, self.turn_speed * dt);

        SteeringOutput {
            linear: direction * step,
            angular: angle_delta(yaw, new_yaw),
        }
    }
}

/// Face behavior - rotate in place toward a point
#[derive(Debug, Clone)]
pub struct Face {
    /// Point to look at
    pub target: Vec2,
    /// Turn rate in radians per second
    pub turn_speed: f32,
}

impl Face {
    #[must_use]
    pub fn new(target: Vec2, turn_speed: f32) -> Self {
        Self { target, turn_speed }
    }
}

impl SteeringBehavior for Face {
    fn calculate(&self, position: Vec2, yaw: f32, dt: f32) -> SteeringOutput {
        let desired = yaw_of(self.target - position, yaw);
        let new_yaw = turn_towards(yaw, desired, self.turn_speed * dt);
        SteeringOutput {
            linear: Vec2::ZERO,
            angular: angle_delta(yaw, new_yaw),
        }
    }
}
