//! Capsule primitive and closest-point queries
//!
//! The geometric routines follow the classic formulations from
//! "Real-Time Collision Detection" (Ericson).

use glam::{Vec2, Vec3};

use super::bvh::{Aabb, Triangle};

const EPSILON: f32 = 1e-6;

/// A vertical line segment swept by a sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    /// Upper segment endpoint
    pub top: Vec3,
    /// Lower segment endpoint
    pub bottom: Vec3,
    /// Sphere radius
    pub radius: f32,
}

impl Capsule {
    /// Build an upright capsule standing on `base_y` at the given XZ position
    ///
    /// `height` is the full height including both caps. A height smaller than
    /// the diameter collapses the segment to a point (a sphere).
    #[must_use]
    pub fn upright(x: f32, z: f32, base_y: f32, height: f32, radius: f32) -> Self {
        let bottom_y = base_y + radius;
        let top_y = (base_y + height - radius).max(bottom_y);
        Self {
            top: Vec3::new(x, top_y, z),
            bottom: Vec3::new(x, bottom_y, z),
            radius,
        }
    }

    /// Horizontal position of the capsule axis
    #[must_use]
    pub fn center_xz(&self) -> Vec2 {
        Vec2::new(self.bottom.x, self.bottom.z)
    }

    /// Move the capsule so its axis sits at `xz`
    pub fn set_center_xz(&mut self, xz: Vec2) {
        let delta = xz - self.center_xz();
        self.translate(Vec3::new(delta.x, 0.0, delta.y));
    }

    /// Translate both endpoints
    pub fn translate(&mut self, delta: Vec3) {
        self.top += delta;
        self.bottom += delta;
    }

    /// Bounding box of the swept sphere
    #[must_use]
    pub fn aabb(&self) -> Aabb {
        let r = Vec3::splat(self.radius);
        Aabb::new(self.bottom.min(self.top) - r, self.bottom.max(self.top) + r)
    }

    /// Gap between the vertical extents of two capsule segments (0 when they overlap)
    #[must_use]
    pub fn vertical_gap(&self, other: &Capsule) -> f32 {
        let lo = self.bottom.y.max(other.bottom.y);
        let hi = self.top.y.min(other.top.y);
        (lo - hi).max(0.0)
    }
}

/// Closest point to `p` on segment `ab`
#[must_use]
pub fn closest_point_on_segment(p: Vec3, a: Vec3, b: Vec3) -> Vec3 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Closest points between segments `p1q1` and `p2q2`
#[must_use]
pub fn closest_points_segments(p1: Vec3, q1: Vec3, p2: Vec3, q2: Vec3) -> (Vec3, Vec3) {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.length_squared();
    let e = d2.length_squared();
    let f = d2.dot(r);

    if a <= EPSILON && e <= EPSILON {
        return (p1, p2);
    }

    let (s, t) = if a <= EPSILON {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(r);
        if e <= EPSILON {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(d2);
            let denom = a * e - b * b;
            let mut s = if denom > EPSILON {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let mut t = (b * s + f) / e;
            if t < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            }
            (s, t)
        }
    };

    (p1 + d1 * s, p2 + d2 * t)
}

/// Closest point to `p` on triangle `tri`
#[must_use]
pub fn closest_point_on_triangle(p: Vec3, tri: &Triangle) -> Vec3 {
    let (a, b, c) = (tri.a, tri.b, tri.c);
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }

    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    a + ab * v + ac * w
}

/// Segment/triangle intersection point, if the segment pierces the triangle
fn segment_triangle_intersection(p: Vec3, q: Vec3, tri: &Triangle) -> Option<Vec3> {
    let dir = q - p;
    let e1 = tri.b - tri.a;
    let e2 = tri.c - tri.a;
    let h = dir.cross(e2);
    let det = e1.dot(h);
    if det.abs() <= EPSILON {
        return None;
    }
    let inv = 1.0 / det;
    let s = p - tri.a;
    let u = inv * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let qv = s.cross(e1);
    let v = inv * dir.dot(qv);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = inv * e2.dot(qv);
    (0.0..=1.0).contains(&t).then(|| p + dir * t)
}

/// Closest points between segment `pq` and a triangle: (on segment, on triangle)
#[must_use]
pub fn closest_points_segment_triangle(p: Vec3, q: Vec3, tri: &Triangle) -> (Vec3, Vec3) {
    if let Some(hit) = segment_triangle_intersection(p, q, tri) {
        return (hit, hit);
    }

    let mut best = (p, closest_point_on_triangle(p, tri));
    let mut best_dist = best.0.distance_squared(best.1);

    let mut consider = |pair: (Vec3, Vec3)| {
        let d = pair.0.distance_squared(pair.1);
        if d < best_dist {
            best_dist = d;
            best = pair;
        }
    };

    consider((q, closest_point_on_triangle(q, tri)));
    for (e0, e1) in [(tri.a, tri.b), (tri.b, tri.c), (tri.c, tri.a)] {
        consider(closest_points_segments(p, q, e0, e1));
    }

    best
}

/// Distance along a ray to the first intersection with a capsule
///
/// `direction` must be normalized. Returns `Some(0.0)` when the origin is
/// already inside.
#[must_use]
pub fn ray_capsule_distance(origin: Vec3, direction: Vec3, capsule: &Capsule) -> Option<f32> {
    let (a, b, r) = (capsule.bottom, capsule.top, capsule.radius);
    if closest_point_on_segment(origin, a, b).distance_squared(origin) <= r * r {
        return Some(0.0);
    }

    let mut best: Option<f32> = None;
    let mut keep = |t: f32| {
        if t >= 0.0 && best.is_none_or(|b| t < b) {
            best = Some(t);
        }
    };

    // Cylinder body
    let axis = b - a;
    let axis_len_sq = axis.length_squared();
    if axis_len_sq > EPSILON {
        let oa = origin - a;
        let bard = axis.dot(direction);
        let baoa = axis.dot(oa);
        let qa = axis_len_sq - bard * bard;
        let qb = axis_len_sq * direction.dot(oa) - baoa * bard;
        let qc = axis_len_sq * oa.length_squared() - baoa * baoa - r * r * axis_len_sq;
        let h = qb * qb - qa * qc;
        if qa.abs() > EPSILON && h >= 0.0 {
            let t = (-qb - h.sqrt()) / qa;
            let y = baoa + t * bard;
            if y > 0.0 && y < axis_len_sq {
                keep(t);
            }
        }
    }

    // End caps
    for center in [a, b] {
        let oc = origin - center;
        let hb = direction.dot(oc);
        let hc = oc.length_squared() - r * r;
        let h = hb * hb - hc;
        if h >= 0.0 {
            keep(-hb - h.sqrt());
        }
    }

    best
}
