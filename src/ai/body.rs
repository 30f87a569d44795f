//! Kinematic body of the hunter
//!
//! Position, heading and the active path, plus the movement primitives the
//! behaviour states drive. Every step is pushed back out of the static
//! geometry before it is committed.

use glam::{Vec2, Vec3};

use super::pathfinding::PathResult;
use super::steering::{Arrive, Face, SteeringBehavior, angle_delta, wrap_angle, yaw_of};
use crate::maze::{Cell, CollisionOptions, MazeWorld};
use crate::physics::Capsule;

/// Fraction of the expected step below which the body counts as blocked
const STUCK_PROGRESS_RATIO: f32 = 0.25;

/// Mutable per-agent data shared by every behaviour state
#[derive(Debug, Clone)]
pub struct HunterBody {
    /// Feet position; y stays on the floor
    pub position: Vec3,
    pub yaw: f32,
    /// Cell under `position`, refreshed after each move
    pub cell: Cell,
    pub health: f32,
    pub path: PathResult,
    /// Index of the next waypoint in `path`
    pub path_index: usize,
    /// Current exploration goal while hunting
    pub hunt_target: Option<Cell>,
    /// Where the player was last seen
    pub last_known_player: Option<Vec3>,
    /// Seconds until the next exploration pick
    pub repath_timer: f32,
    /// Seconds until another attack may start
    pub attack_cooldown: f32,
    /// Seconds spent making no headway
    pub stuck_timer: f32,
    pub line_of_sight: bool,
    pub moving: bool,
    pub sprinting: bool,
    collision: CollisionOptions,
}

impl HunterBody {
    /// Body standing at the center of `cell`
    #[must_use]
    pub fn new(world: &dyn MazeWorld, cell: Cell, yaw: f32, health: f32, collision: CollisionOptions) -> Self {
        Self {
            position: world.cell_to_world(cell),
            yaw: wrap_angle(yaw),
            cell,
            health,
            path: PathResult::stay(cell),
            path_index: 1,
            hunt_target: None,
            last_known_player: None,
            repath_timer: 0.0,
            attack_cooldown: 0.0,
            stuck_timer: 0.0,
            line_of_sight: false,
            moving: false,
            sprinting: false,
            collision,
        }
    }

    /// Capsule parameters used for every collision query
    #[must_use]
    pub fn collision(&self) -> &CollisionOptions {
        &self.collision
    }

    /// The body's capsule at its current position
    #[must_use]
    pub fn capsule(&self) -> Capsule {
        self.collision.capsule_at(self.position.x, self.position.z)
    }

    /// Position on the XZ plane
    #[must_use]
    pub fn position_xz(&self) -> Vec2 {
        Vec2::new(self.position.x, self.position.z)
    }

    pub fn set_position_xz(&mut self, xz: Vec2) {
        self.position.x = xz.x;
        self.position.z = xz.y;
    }

    /// Replace the active path; the first waypoint is the current cell
    pub fn set_path(&mut self, path: PathResult) {
        self.path = path;
        self.path_index = 1;
        self.stuck_timer = 0.0;
    }

    /// Drop the active path
    pub fn clear_path(&mut self) {
        self.set_path(PathResult::stay(self.cell));
    }

    #[must_use]
    pub fn path_finished(&self) -> bool {
        self.path_index >= self.path.len()
    }

    #[must_use]
    pub fn is_stuck(&self, timeout: f32) -> bool {
        self.stuck_timer >= timeout
    }

    /// Stop moving this tick
    pub fn halt(&mut self) {
        self.moving = false;
        self.sprinting = false;
    }

    /// Turn in place toward `target`; returns the remaining yaw error
    pub fn face(&mut self, target: Vec2, turn_speed: f32, dt: f32) -> f32 {
        let position = self.position_xz();
        let output = Face::new(target, turn_speed).calculate(position, self.yaw, dt);
        self.yaw = wrap_angle(self.yaw + output.angular);
        angle_delta(self.yaw, yaw_of(target - position, self.yaw)).abs()
    }

    /// Walk straight toward `target`, stopping `stop_radius` short of it
    ///
    /// The step is resolved against the static geometry. Returns the distance
    /// actually covered.
    pub fn step_towards(
        &mut self,
        world: &dyn MazeWorld,
        target: Vec2,
        speed: f32,
        turn_speed: f32,
        stop_radius: f32,
        dt: f32,
    ) -> f32 {
        let start = self.position_xz();
        let output = Arrive::new(target, speed, turn_speed)
            .with_target_radius(stop_radius)
            .calculate(start, self.yaw, dt);
        self.yaw = wrap_angle(self.yaw + output.angular);

        if !output.is_moving() {
            self.moving = false;
            self.stuck_timer = 0.0;
            return 0.0;
        }

        let desired = start + output.linear;
        let resolved = world.resolve_world_collision(desired.x, desired.y, &self.collision);
        self.set_position_xz(resolved);

        let progress = resolved.distance(start);
        let expected = output.linear.length();
        if progress < expected * STUCK_PROGRESS_RATIO {
            self.stuck_timer += dt;
        } else {
            self.stuck_timer = 0.0;
        }
        self.moving = progress > 1e-4;
        progress
    }

    /// Advance along the active path; returns true once it is exhausted
    pub fn follow_path(
        &mut self,
        world: &dyn MazeWorld,
        speed: f32,
        turn_speed: f32,
        tolerance: f32,
        dt: f32,
    ) -> bool {
        self.skip_reached_waypoints(world, tolerance);
        let Some(&next) = self.path.cells.get(self.path_index) else {
            self.moving = false;
            return true;
        };

        let waypoint = world.cell_to_world(next);
        let target = Vec2::new(waypoint.x, waypoint.z);
        self.step_towards(world, target, speed, turn_speed, 0.0, dt);
        self.skip_reached_waypoints(world, tolerance);
        self.path_finished()
    }

    fn skip_reached_waypoints(&mut self, world: &dyn MazeWorld, tolerance: f32) {
        let position = self.position_xz();
        while let Some(&cell) = self.path.cells.get(self.path_index) {
            let waypoint = world.cell_to_world(cell);
            if Vec2::new(waypoint.x, waypoint.z).distance(position) > tolerance {
                break;
            }
            self.path_index += 1;
        }
    }

    /// Recompute the occupied cell; returns it when it changed
    pub fn refresh_cell(&mut self, world: &dyn MazeWorld) -> Option<Cell> {
        let cell = world.world_to_cell(self.position.x, self.position.z);
        if cell == self.cell {
            return None;
        }
        self.cell = cell;
        Some(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::{Grid, MazeLevel};
    use std::f32::consts::FRAC_PI_2;

    fn l_shape() -> MazeLevel {
        let grid = Grid::from_rows(
            &[
                "######", //
                "#....#", //
                "####.#", //
                "####.#", //
                "######",
            ],
            2.0,
        );
        MazeLevel::from_grid(grid, Cell::new(1, 1), Cell::new(4, 3), 3.0)
    }

    fn body(level: &MazeLevel, cell: Cell) -> HunterBody {
        HunterBody::new(level, cell, 0.0, 100.0, CollisionOptions::new(0.35, 1.9))
    }

    #[test]
    fn test_follow_path_reaches_goal() {
        let level = l_shape();
        let mut body = body(&level, Cell::new(1, 1));
        let path = crate::ai::find_path(level.maze(), Cell::new(1, 1), Cell::new(4, 3), None, 2);
        assert_eq!(path.len(), 6);
        body.set_path(path);

        let mut finished = false;
        for _ in 0..400 {
            finished = body.follow_path(&level, 2.4, 5.0, 0.2, 1.0 / 30.0);
            body.refresh_cell(&level);
            if finished {
                break;
            }
        }
        assert!(finished);
        assert_eq!(body.cell, Cell::new(4, 3));
        assert!(!body.is_stuck(0.5));
    }

    #[test]
    fn test_step_into_wall_is_blocked() {
        let level = l_shape();
        let mut body = body(&level, Cell::new(1, 1));
        // Row 0 is solid: walking north stalls against it
        for _ in 0..90 {
            body.step_towards(&level, Vec2::new(3.0, -10.0), 2.4, 5.0, 0.0, 1.0 / 30.0);
        }
        assert!(body.position.z > 2.0 + 0.3);
        assert!(body.is_stuck(1.0));
    }

    #[test]
    fn test_face_reports_remaining_error() {
        let level = l_shape();
        let mut body = body(&level, Cell::new(1, 1));
        let target = body.position_xz() + Vec2::X;
        let error = body.face(target, 1.0, 0.5);
        assert!((error - (FRAC_PI_2 - 0.5)).abs() < 1e-4);
        let error = body.face(target, 10.0, 1.0);
        assert!(error < 1e-5);
    }
}
