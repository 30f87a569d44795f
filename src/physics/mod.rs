//! Collision module
//!
//! Capsule-vs-triangle and capsule-vs-capsule penetration resolution over
//! BVH-indexed static colliders.

mod bvh;
mod capsule;
mod collider;
mod resolver;

pub use bvh::{Aabb, Bvh, Triangle};
pub use capsule::{
    Capsule, closest_point_on_segment, closest_points_segment_triangle, closest_points_segments,
    ray_capsule_distance,
};
pub use collider::{StaticCollider, push_box};
pub use resolver::{
    DEFAULT_MAX_ITERATIONS, PairResolution, RayHit, SEPARATION_EPSILON, WorldResolution,
    raycast_capsule, resolve_capsule_against_world, resolve_capsule_pair,
};
