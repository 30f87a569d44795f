//! Pursuit AI and character collision for a first-person maze game
//!
//! This crate provides:
//! - Maze generation with precomputed cell-to-cell visibility
//! - An exploration heat map and A* navigation on the maze grid
//! - A hunt/chase/search/attack state machine driving a hunter agent
//! - Capsule collision against BVH-indexed static geometry

pub mod ai;
pub mod core;
pub mod maze;
pub mod physics;

// Re-exports for convenience
pub use glam;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::ai::{
        AgentSnapshot, AnimationRole, DamageOutcome, HunterAgent, HunterMode, PlayerCollisionQuery,
        PlayerCollisionResult, RayQuery, TickInput, TickOutcome,
    };
    pub use crate::core::{DebugInfo, HunterEvent, SimConfig};
    pub use crate::maze::{Cell, Grid, MazeLevel, MazeWorld};
    pub use crate::physics::{Capsule, RayHit};
    pub use glam::{Vec2, Vec3};
}
