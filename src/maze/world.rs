//! The world collaborator seen by the hunter
//!
//! Anything that can answer these queries can host the agent: the headless
//! [`MazeLevel`](super::MazeLevel) used by tests and the demo, or a
//! renderer-backed level in a game.

use glam::{Vec2, Vec3};

use super::grid::{Cell, Grid};
use super::visibility::VisibilityMap;
use crate::physics::{Capsule, StaticCollider, WorldResolution, resolve_capsule_against_world};

/// Capsule description for a world collision query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionOptions {
    pub radius: f32,
    /// Full capsule height
    pub height: f32,
    /// Height of the capsule's lowest point
    pub base_y: f32,
    /// Resolution passes
    pub max_iterations: usize,
}

impl CollisionOptions {
    #[must_use]
    pub fn new(radius: f32, height: f32) -> Self {
        Self {
            radius,
            height,
            base_y: 0.05,
            max_iterations: crate::physics::DEFAULT_MAX_ITERATIONS,
        }
    }

    #[must_use]
    pub fn with_base_y(mut self, base_y: f32) -> Self {
        self.base_y = base_y;
        self
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Capsule standing at `x, z`
    #[must_use]
    pub fn capsule_at(&self, x: f32, z: f32) -> Capsule {
        Capsule::upright(x, z, self.base_y, self.height, self.radius)
    }
}

/// Queries the hunter needs from the level
pub trait MazeWorld {
    /// Occupancy grid of the current maze
    fn maze(&self) -> &Grid;

    /// Precomputed line-of-sight relation
    fn visibility_map(&self) -> &VisibilityMap;

    /// Read-only static geometry (walls, props)
    fn static_colliders(&self) -> &[StaticCollider];

    fn start_cell(&self) -> Cell;

    fn exit_cell(&self) -> Cell;

    fn is_walkable(&self, cell: Cell) -> bool {
        self.maze().is_walkable(cell)
    }

    fn cell_to_world(&self, cell: Cell) -> Vec3 {
        self.maze().cell_to_world(cell)
    }

    fn world_to_cell(&self, x: f32, z: f32) -> Cell {
        self.maze().world_to_cell(x, z)
    }

    fn cell_size(&self) -> f32 {
        self.maze().cell_size
    }

    fn visible_cells_for(&self, cell: Cell) -> &[Cell] {
        self.visibility_map().visible_from(cell)
    }

    fn are_cells_visible(&self, from: Cell, to: Cell) -> bool {
        self.visibility_map().are_visible(from, to)
    }

    /// Resolve a capsule in place against the static geometry
    fn resolve_capsule(&self, capsule: &mut Capsule, max_iterations: usize) -> WorldResolution {
        resolve_capsule_against_world(capsule, self.static_colliders(), max_iterations)
    }

    /// Push a capsule standing at `x, z` out of the static geometry
    fn resolve_world_collision(&self, x: f32, z: f32, options: &CollisionOptions) -> Vec2 {
        let mut capsule = options.capsule_at(x, z);
        self.resolve_capsule(&mut capsule, options.max_iterations);
        capsule.center_xz()
    }
}
