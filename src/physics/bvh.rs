//! Bounding volume hierarchy over static triangles
//!
//! Built once per collider. Queries walk the tree with a small explicit
//! stack and report the indices of triangles whose bounds overlap the query
//! box. This is the "shapecast" prefilter used by the capsule resolver.

use glam::Vec3;
use smallvec::SmallVec;

/// Triangles per leaf before splitting stops
const MAX_LEAF_TRIANGLES: usize = 4;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// An inverted box that any union will replace
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::MAX),
        max: Vec3::splat(f32::MIN),
    };

    /// Create from corners
    #[must_use]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing both
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Grow to include a point
    #[must_use]
    pub fn include(self, p: Vec3) -> Self {
        Self::new(self.min.min(p), self.max.max(p))
    }

    /// Overlap test (touching counts)
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }

    /// Box center
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

/// A static triangle with a precomputed unit normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
    /// Unit normal following the `a, b, c` winding (zero for degenerate triangles)
    pub normal: Vec3,
}

impl Triangle {
    #[must_use]
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        let normal = (b - a).cross(c - a).normalize_or_zero();
        Self { a, b, c, normal }
    }

    #[must_use]
    pub fn aabb(&self) -> Aabb {
        Aabb::EMPTY.include(self.a).include(self.b).include(self.c)
    }

    #[must_use]
    pub fn centroid(&self) -> Vec3 {
        (self.a + self.b + self.c) / 3.0
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    Leaf { start: usize, count: usize },
    Internal { left: usize, right: usize },
}

#[derive(Debug, Clone)]
struct Node {
    bounds: Aabb,
    kind: NodeKind,
}

/// Median-split BVH over a triangle list
#[derive(Debug, Clone, Default)]
pub struct Bvh {
    nodes: Vec<Node>,
    /// Triangle indices ordered so every leaf owns a contiguous run
    order: Vec<usize>,
    /// Per-triangle bounds, indexed like the input slice
    tri_bounds: Vec<Aabb>,
}

impl Bvh {
    /// Build over `triangles`
    #[must_use]
    pub fn build(triangles: &[Triangle]) -> Self {
        let mut bvh = Self {
            nodes: Vec::with_capacity(triangles.len().max(1) * 2),
            order: (0..triangles.len()).collect(),
            tri_bounds: triangles.iter().map(Triangle::aabb).collect(),
        };
        if !triangles.is_empty() {
            let centroids: Vec<Vec3> = triangles.iter().map(Triangle::centroid).collect();
            bvh.build_range(&centroids, 0, triangles.len());
        }
        bvh
    }

    fn build_range(&mut self, centroids: &[Vec3], start: usize, end: usize) -> usize {
        let node_bounds = self.order[start..end]
            .iter()
            .fold(Aabb::EMPTY, |acc, &i| acc.union(self.tri_bounds[i]));
        let index = self.nodes.len();
        self.nodes.push(Node {
            bounds: node_bounds,
            kind: NodeKind::Leaf {
                start,
                count: end - start,
            },
        });

        let count = end - start;
        if count <= MAX_LEAF_TRIANGLES {
            return index;
        }

        let centroid_bounds = self.order[start..end]
            .iter()
            .fold(Aabb::EMPTY, |acc, &i| acc.include(centroids[i]));
        let extent = centroid_bounds.max - centroid_bounds.min;
        let axis = if extent.x >= extent.y && extent.x >= extent.z {
            0
        } else if extent.y >= extent.z {
            1
        } else {
            2
        };

        self.order[start..end].sort_by(|&l, &r| centroids[l][axis].total_cmp(&centroids[r][axis]));
        let mid = start + count / 2;

        let left = self.build_range(centroids, start, mid);
        let right = self.build_range(centroids, mid, end);
        self.nodes[index].kind = NodeKind::Internal { left, right };
        index
    }

    /// Bounds of the whole tree
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        self.nodes.first().map_or(Aabb::EMPTY, |n| n.bounds)
    }

    /// Collect triangle indices whose bounds overlap `query`
    pub fn query(&self, query: &Aabb, out: &mut Vec<usize>) {
        if self.nodes.is_empty() {
            return;
        }
        let mut stack: SmallVec<[usize; 32]> = SmallVec::new();
        stack.push(0);
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if !node.bounds.intersects(query) {
                continue;
            }
            match node.kind {
                NodeKind::Leaf { start, count } => {
                    out.extend(
                        self.order[start..start + count]
                            .iter()
                            .copied()
                            .filter(|&i| self.tri_bounds[i].intersects(query)),
                    );
                }
                NodeKind::Internal { left, right } => {
                    stack.push(left);
                    stack.push(right);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(n: usize) -> Vec<Triangle> {
        (0..n)
            .map(|i| {
                let x = i as f32 * 2.0;
                Triangle::new(
                    Vec3::new(x, 0.0, 0.0),
                    Vec3::new(x + 1.0, 0.0, 0.0),
                    Vec3::new(x, 1.0, 0.0),
                )
            })
            .collect()
    }

    #[test]
    fn test_query_finds_only_overlapping() {
        let tris = strip(32);
        let bvh = Bvh::build(&tris);
        let mut hits = Vec::new();
        bvh.query(
            &Aabb::new(Vec3::new(10.2, 0.0, -1.0), Vec3::new(10.8, 1.0, 1.0)),
            &mut hits,
        );
        assert_eq!(hits, vec![5]);
    }

    #[test]
    fn test_query_matches_brute_force() {
        let tris = strip(50);
        let bvh = Bvh::build(&tris);
        let query = Aabb::new(Vec3::new(13.0, -1.0, -1.0), Vec3::new(41.0, 2.0, 1.0));
        let mut hits = Vec::new();
        bvh.query(&query, &mut hits);
        hits.sort_unstable();
        let expected: Vec<usize> = (0..tris.len())
            .filter(|&i| tris[i].aabb().intersects(&query))
            .collect();
        assert_eq!(hits, expected);
    }

    #[test]
    fn test_empty_bvh() {
        let bvh = Bvh::build(&[]);
        let mut hits = Vec::new();
        bvh.query(&Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0)), &mut hits);
        assert!(hits.is_empty());
    }
}
