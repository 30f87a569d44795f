//! Static triangle colliders owned by the level

use glam::Vec3;

use super::bvh::{Aabb, Bvh, Triangle};

/// A read-only triangulated surface with its BVH
#[derive(Debug, Clone)]
pub struct StaticCollider {
    /// Debug label ("walls", "crate", ...)
    pub label: String,
    triangles: Vec<Triangle>,
    bvh: Bvh,
}

impl StaticCollider {
    /// Index a triangle soup
    #[must_use]
    pub fn from_triangles(label: impl Into<String>, triangles: Vec<Triangle>) -> Self {
        let bvh = Bvh::build(&triangles);
        Self {
            label: label.into(),
            triangles,
            bvh,
        }
    }

    /// Axis-aligned box with outward-facing triangles (12 total)
    #[must_use]
    pub fn from_box(label: impl Into<String>, center: Vec3, half_extents: Vec3) -> Self {
        let mut triangles = Vec::with_capacity(12);
        push_box(&mut triangles, center, half_extents);
        Self::from_triangles(label, triangles)
    }

    /// Overall bounds
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        self.bvh.bounds()
    }

    /// Triangle by index
    #[must_use]
    pub fn triangle(&self, index: usize) -> &Triangle {
        &self.triangles[index]
    }

    /// Number of triangles
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Indices of triangles whose bounds overlap `query`
    pub fn shapecast(&self, query: &Aabb, out: &mut Vec<usize>) {
        out.clear();
        if self.bounds().intersects(query) {
            self.bvh.query(query, out);
        }
    }
}

/// Append the 12 outward-wound triangles of an axis-aligned box
pub fn push_box(out: &mut Vec<Triangle>, center: Vec3, half: Vec3) {
    let min = center - half;
    let max = center + half;
    let corner = |x: bool, y: bool, z: bool| {
        Vec3::new(
            if x { max.x } else { min.x },
            if y { max.y } else { min.y },
            if z { max.z } else { min.z },
        )
    };

    // Each face as a quad (counter-clockwise seen from outside)
    let faces = [
        // +X
        [corner(true, false, false), corner(true, true, false), corner(true, true, true), corner(true, false, true)],
        // -X
        [corner(false, false, true), corner(false, true, true), corner(false, true, false), corner(false, false, false)],
        // +Y
        [corner(false, true, false), corner(false, true, true), corner(true, true, true), corner(true, true, false)],
        // -Y
        [corner(false, false, true), corner(false, false, false), corner(true, false, false), corner(true, false, true)],
        // +Z
        [corner(true, false, true), corner(true, true, true), corner(false, true, true), corner(false, false, true)],
        // -Z
        [corner(false, false, false), corner(false, true, false), corner(true, true, false), corner(true, false, false)],
    ];

    for [a, b, c, d] in faces {
        out.push(Triangle::new(a, b, c));
        out.push(Triangle::new(a, c, d));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_normals_point_outward() {
        let collider = StaticCollider::from_box("box", Vec3::new(1.0, 2.0, 3.0), Vec3::splat(0.5));
        assert_eq!(collider.triangle_count(), 12);
        let center = Vec3::new(1.0, 2.0, 3.0);
        for i in 0..collider.triangle_count() {
            let tri = collider.triangle(i);
            assert!((tri.centroid() - center).dot(tri.normal) > 0.0, "triangle {i}");
        }
    }

    #[test]
    fn test_shapecast_outside_bounds_is_empty() {
        let collider = StaticCollider::from_box("box", Vec3::ZERO, Vec3::splat(1.0));
        let mut hits = vec![99];
        collider.shapecast(&Aabb::new(Vec3::splat(5.0), Vec3::splat(6.0)), &mut hits);
        assert!(hits.is_empty());
    }
}
