//! Iterative capsule penetration resolution
//!
//! Stateless: every function takes the capsules and the static colliders it
//! works on. Pushes are applied in the horizontal plane only, since characters
//! are kept on the floor by the caller.

use glam::{Vec2, Vec3};

use super::capsule::{Capsule, closest_points_segment_triangle, ray_capsule_distance};
use super::collider::StaticCollider;

/// Default number of resolution passes against static geometry
pub const DEFAULT_MAX_ITERATIONS: usize = 2;

/// Extra distance added when separating two capsules so they end up strictly apart
pub const SEPARATION_EPSILON: f32 = 1e-3;

const MIN_DISTANCE: f32 = 1e-5;

/// Outcome of resolving one capsule against the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldResolution {
    /// Total horizontal correction applied
    pub correction: Vec2,
    /// Whether any penetration was found
    pub colliding: bool,
    /// Passes actually run
    pub iterations: usize,
}

/// Push `capsule` out of every collider, running at most `max_iterations` passes
///
/// Stops early once a full pass finds no penetration. Whatever residual
/// remains after the last pass is left for the next tick.
pub fn resolve_capsule_against_world(
    capsule: &mut Capsule,
    colliders: &[StaticCollider],
    max_iterations: usize,
) -> WorldResolution {
    let start = capsule.center_xz();
    let mut colliding = false;
    let mut iterations = 0;
    let mut candidates = Vec::new();
    let mut contacts: Vec<(f32, usize)> = Vec::new();

    for _ in 0..max_iterations.max(1) {
        iterations += 1;
        let mut pushed = false;

        for collider in colliders {
            // Bounds are re-accumulated per collider since earlier pushes moved the capsule
            collider.shapecast(&capsule.aabb(), &mut candidates);

            // Nearest contacts first: once a face pushes the capsule out along its
            // normal, neighbouring triangles sharing a seam or diagonal no longer touch it
            let current = *capsule;
            contacts.clear();
            contacts.extend(
                candidates
                    .iter()
                    .map(|&index| (segment_distance(&current, collider, index), index))
                    .filter(|&(distance, _)| distance < current.radius),
            );
            contacts.sort_by(|l, r| l.0.total_cmp(&r.0));

            for &(_, index) in &contacts {
                if push_out_of_triangle(capsule, collider, index) {
                    pushed = true;
                }
            }
        }

        if !pushed {
            break;
        }
        colliding = true;
    }

    WorldResolution {
        correction: capsule.center_xz() - start,
        colliding,
        iterations,
    }
}

fn segment_distance(capsule: &Capsule, collider: &StaticCollider, index: usize) -> f32 {
    let (on_segment, on_triangle) =
        closest_points_segment_triangle(capsule.bottom, capsule.top, collider.triangle(index));
    on_segment.distance(on_triangle)
}

fn push_out_of_triangle(capsule: &mut Capsule, collider: &StaticCollider, index: usize) -> bool {
    let tri = collider.triangle(index);
    let (on_segment, on_triangle) = closest_points_segment_triangle(capsule.bottom, capsule.top, tri);
    let delta = on_segment - on_triangle;
    let distance = delta.length();
    if distance >= capsule.radius {
        return false;
    }

    let flat = Vec2::new(delta.x, delta.z);
    let direction = if distance > MIN_DISTANCE && flat.length_squared() > MIN_DISTANCE * MIN_DISTANCE {
        flat.normalize()
    } else {
        // Segment touches the surface; fall back to the face normal
        let normal = Vec2::new(tri.normal.x, tri.normal.z);
        if normal.length_squared() <= MIN_DISTANCE {
            return false;
        }
        normal.normalize()
    };

    let depth = capsule.radius - distance;
    capsule.translate(Vec3::new(direction.x, 0.0, direction.y) * depth);
    true
}

/// Outcome of a capsule/capsule separation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairResolution {
    /// Whether the capsules overlapped before separation
    pub colliding: bool,
    /// Horizontal correction applied to the first capsule
    pub correction_a: Vec2,
    /// Horizontal correction applied to the second capsule
    pub correction_b: Vec2,
}

impl PairResolution {
    const NONE: Self = Self {
        colliding: false,
        correction_a: Vec2::ZERO,
        correction_b: Vec2::ZERO,
    };
}

/// Separate two upright capsules horizontally
///
/// `share_a` is the fraction of the correction applied to `a` (the rest goes
/// to `b`). When both axes coincide the capsules are split along
/// `fallback_direction` (from `b` toward `a`).
pub fn resolve_capsule_pair(
    a: &mut Capsule,
    b: &mut Capsule,
    share_a: f32,
    fallback_direction: Vec2,
) -> PairResolution {
    let combined = a.radius + b.radius;
    if a.vertical_gap(b) >= combined {
        return PairResolution::NONE;
    }

    let offset = a.center_xz() - b.center_xz();
    let distance = offset.length();
    if distance >= combined {
        return PairResolution::NONE;
    }

    let direction = if distance > MIN_DISTANCE {
        offset / distance
    } else {
        fallback_direction.try_normalize().unwrap_or(Vec2::X)
    };

    let correction = combined - distance + SEPARATION_EPSILON;
    let share_a = share_a.clamp(0.0, 1.0);
    let correction_a = direction * correction * share_a;
    let correction_b = -direction * correction * (1.0 - share_a);
    a.translate(Vec3::new(correction_a.x, 0.0, correction_a.y));
    b.translate(Vec3::new(correction_b.x, 0.0, correction_b.y));

    PairResolution {
        colliding: true,
        correction_a,
        correction_b,
    }
}

/// A ray hit against a capsule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin
    pub distance: f32,
    /// World-space hit point
    pub point: Vec3,
}

/// Cast a ray against a capsule, ignoring hits beyond `max_distance`
#[must_use]
pub fn raycast_capsule(capsule: &Capsule, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
    let direction = direction.try_normalize()?;
    let distance = ray_capsule_distance(origin, direction, capsule)?;
    (distance <= max_distance).then(|| RayHit {
        distance,
        point: origin + direction * distance,
    })
}
