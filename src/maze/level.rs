//! Headless maze level
//!
//! Owns everything the hunter reads from the world: the grid, the visibility
//! map, and triangle colliders for walls and props. Only wall faces that
//! border an open cell are triangulated.

use glam::{Vec2, Vec3};
use rand::Rng;

use super::generator::{Maze, generate_maze};
use super::grid::{Cell, Grid};
use super::visibility::VisibilityMap;
use super::world::MazeWorld;
use crate::core::MazeConfig;
use crate::physics::{StaticCollider, Triangle};

/// A generated maze with its precomputed visibility and collision data
#[derive(Debug, Clone)]
pub struct MazeLevel {
    config: MazeConfig,
    maze: Maze,
    visibility: VisibilityMap,
    colliders: Vec<StaticCollider>,
    /// Cells holding a prop crate
    props: Vec<Cell>,
    /// Incremented on every regeneration
    generation: u32,
}

impl MazeLevel {
    /// Carve a new maze and precompute its visibility and colliders
    pub fn generate<R: Rng + ?Sized>(config: MazeConfig, rng: &mut R) -> Self {
        let maze = generate_maze(&config, rng);
        let mut level = Self::from_maze(maze, config.wall_height);
        level.config = config;
        level.scatter_props(rng);
        level
    }

    /// Wrap an existing grid (used for hand-drawn test layouts)
    #[must_use]
    pub fn from_grid(grid: Grid, start: Cell, exit: Cell, wall_height: f32) -> Self {
        Self::from_maze(Maze { grid, start, exit }, wall_height)
    }

    fn from_maze(maze: Maze, wall_height: f32) -> Self {
        let visibility = VisibilityMap::build(&maze.grid);
        let colliders = vec![build_wall_collider(&maze.grid, wall_height)];
        let config = MazeConfig {
            cols: maze.grid.width,
            rows: maze.grid.height,
            cell_size: maze.grid.cell_size,
            wall_height,
            loop_chance: 0.0,
            prop_count: 0,
        };
        Self {
            config,
            maze,
            visibility,
            colliders,
            props: Vec::new(),
            generation: 0,
        }
    }

    /// Replace the maze with a freshly carved one
    pub fn regenerate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let generation = self.generation + 1;
        *self = Self::generate(self.config.clone(), rng);
        self.generation = generation;
    }

    /// Place up to `prop_count` crates in dead ends, pushed against the back wall
    fn scatter_props<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let grid = &self.maze.grid;
        let mut dead_ends: Vec<(Cell, Cell)> = grid
            .walkable_cells()
            .filter(|&c| c != self.maze.start && c != self.maze.exit)
            .filter_map(|c| {
                let open = grid.neighbors(c);
                (open.len() == 1).then(|| (c, open[0]))
            })
            .collect();

        let cs = grid.cell_size;
        for _ in 0..self.config.prop_count.min(dead_ends.len()) {
            let (cell, opening) = dead_ends.swap_remove(rng.random_range(0..dead_ends.len()));
            let back = Vec2::new(
                (cell.col - opening.col) as f32,
                (cell.row - opening.row) as f32,
            );
            let center = grid.cell_to_world(cell) + Vec3::new(back.x, 0.0, back.y) * (0.3 * cs);
            let half = Vec3::new(0.15 * cs, 0.2 * cs, 0.15 * cs);
            self.colliders.push(StaticCollider::from_box(
                format!("crate {cell}"),
                center + Vec3::Y * half.y,
                half,
            ));
            self.props.push(cell);
        }
    }

    /// The carved maze and its endpoints
    #[must_use]
    pub fn maze_data(&self) -> &Maze {
        &self.maze
    }

    #[must_use]
    pub fn config(&self) -> &MazeConfig {
        &self.config
    }

    /// Cells holding props
    #[must_use]
    pub fn props(&self) -> &[Cell] {
        &self.props
    }

    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl MazeWorld for MazeLevel {
    fn maze(&self) -> &Grid {
        &self.maze.grid
    }

    fn visibility_map(&self) -> &VisibilityMap {
        &self.visibility
    }

    fn static_colliders(&self) -> &[StaticCollider] {
        &self.colliders
    }

    fn start_cell(&self) -> Cell {
        self.maze.start
    }

    fn exit_cell(&self) -> Cell {
        self.maze.exit
    }
}

/// Triangulate every blocked-cell face that borders an open cell
fn build_wall_collider(grid: &Grid, wall_height: f32) -> StaticCollider {
    let mut triangles = Vec::new();
    let cs = grid.cell_size;

    for row in 0..grid.height as i32 {
        for col in 0..grid.width as i32 {
            let cell = Cell::new(col, row);
            if grid.is_walkable(cell) {
                continue;
            }
            let min = grid.origin + Vec2::new(col as f32, row as f32) * cs;
            let max = min + Vec2::splat(cs);

            for (dc, dr) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                if !grid.is_walkable(Cell::new(col + dc, row + dr)) {
                    continue;
                }
                let (p, q) = match (dc, dr) {
                    (1, 0) => (Vec2::new(max.x, min.y), Vec2::new(max.x, max.y)),
                    (-1, 0) => (Vec2::new(min.x, min.y), Vec2::new(min.x, max.y)),
                    (0, 1) => (Vec2::new(min.x, max.y), Vec2::new(max.x, max.y)),
                    _ => (Vec2::new(min.x, min.y), Vec2::new(max.x, min.y)),
                };
                let facing = Vec3::new(dc as f32, 0.0, dr as f32);
                push_wall_quad(&mut triangles, p, q, wall_height, facing);
            }
        }
    }

    log::debug!("Wall collider: {} triangles", triangles.len());
    StaticCollider::from_triangles("walls", triangles)
}

/// Vertical quad between floor points `p` and `q`, wound to face `facing`
fn push_wall_quad(out: &mut Vec<Triangle>, p: Vec2, q: Vec2, height: f32, facing: Vec3) {
    let a = Vec3::new(p.x, 0.0, p.y);
    let b = Vec3::new(q.x, 0.0, q.y);
    let c = Vec3::new(q.x, height, q.y);
    let d = Vec3::new(p.x, height, p.y);

    let first = Triangle::new(a, b, c);
    if first.normal.dot(facing) >= 0.0 {
        out.push(first);
        out.push(Triangle::new(a, c, d));
    } else {
        out.push(Triangle::new(a, c, b));
        out.push(Triangle::new(a, d, c));
    }
}
