//! Maze model
//!
//! Grid, generator, visibility precomputation, and the world trait the
//! hunter talks to.

mod generator;
mod grid;
mod level;
mod visibility;
mod world;

pub use generator::{Maze, bfs_distances, generate_maze};
pub use grid::{Cell, Grid};
pub use level::MazeLevel;
pub use visibility::{SAMPLES_PER_UNIT, VisibilityMap, segment_clear};
pub use world::{CollisionOptions, MazeWorld};
