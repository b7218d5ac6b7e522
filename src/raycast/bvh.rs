//! Bounding volume hierarchy over a triangle mesh.

use std::marker::PhantomData;

use nalgebra::{Point3, Vector3};
use tracing::debug;

use super::{RayCaster, RayHit};
use crate::geometry::ray_triangle_intersect;
use crate::mesh::{FaceId, MeshIndex, MeshProvider};

/// Axis-aligned box of a BVH node.
#[derive(Debug, Clone, Copy)]
struct Aabb {
    min: Point3<f64>,
    max: Point3<f64>,
}

impl Aabb {
    fn from_triangle([v0, v1, v2]: &[Point3<f64>; 3]) -> Self {
        Self {
            min: v0.inf(v1).inf(v2),
            max: v0.sup(v1).sup(v2),
        }
    }

    fn merge(&self, other: &Self) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    fn expand(&self, epsilon: f64) -> Self {
        let pad = Vector3::repeat(epsilon);
        Self {
            min: self.min - pad,
            max: self.max + pad,
        }
    }

    fn longest_axis(&self) -> usize {
        let extent = self.max - self.min;
        if extent.x >= extent.y && extent.x >= extent.z {
            0
        } else if extent.y >= extent.z {
            1
        } else {
            2
        }
    }

    /// Slab test. Returns the entry distance, clipped to zero.
    fn ray_entry(&self, origin: &Point3<f64>, dir_inv: &Vector3<f64>) -> Option<f64> {
        let mut t_min = 0.0_f64;
        let mut t_max = f64::INFINITY;
        for axis in 0..3 {
            let t1 = (self.min[axis] - origin[axis]) * dir_inv[axis];
            let t2 = (self.max[axis] - origin[axis]) * dir_inv[axis];
            if t1.is_nan() || t2.is_nan() {
                // Parallel ray starting on the slab boundary.
                if origin[axis] < self.min[axis] || origin[axis] > self.max[axis] {
                    return None;
                }
                continue;
            }
            t_min = t_min.max(t1.min(t2));
            t_max = t_max.min(t1.max(t2));
        }
        (t_max >= t_min).then_some(t_min)
    }
}

#[derive(Debug)]
enum BvhNode {
    Leaf {
        aabb: Aabb,
        face: usize,
    },
    Internal {
        aabb: Aabb,
        left: Box<BvhNode>,
        right: Box<BvhNode>,
    },
}

impl BvhNode {
    fn build(triangles: &[[Point3<f64>; 3]], indices: &mut [usize], epsilon: f64) -> Option<Self> {
        match indices {
            [] => return None,
            [face] => {
                return Some(Self::Leaf {
                    aabb: Aabb::from_triangle(&triangles[*face]).expand(epsilon),
                    face: *face,
                })
            }
            _ => {}
        }

        let aabb = indices
            .iter()
            .map(|&i| Aabb::from_triangle(&triangles[i]))
            .reduce(|a, b| a.merge(&b))?
            .expand(epsilon);
        let axis = aabb.longest_axis();

        let centroid = |i: usize| {
            let [a, b, c] = &triangles[i];
            a[axis] + b[axis] + c[axis]
        };
        indices.sort_by(|&a, &b| centroid(a).total_cmp(&centroid(b)).then(a.cmp(&b)));

        let mid = indices.len() / 2;
        let (left, right) = indices.split_at_mut(mid);
        match (
            Self::build(triangles, left, epsilon),
            Self::build(triangles, right, epsilon),
        ) {
            (Some(l), Some(r)) => Some(Self::Internal {
                aabb,
                left: Box::new(l),
                right: Box::new(r),
            }),
            (Some(n), None) | (None, Some(n)) => Some(n),
            (None, None) => None,
        }
    }

    fn aabb(&self) -> &Aabb {
        match self {
            Self::Leaf { aabb, .. } | Self::Internal { aabb, .. } => aabb,
        }
    }
}

/// Bounding volume hierarchy for nearest-hit ray casts.
///
/// Built once over a snapshot of the mesh positions; later edits to the
/// mesh are not seen.
///
/// # Example
///
/// ```
/// use meshcast::mesh::{build_from_triangles, HalfEdgeMesh};
/// use meshcast::raycast::{Bvh, RayCaster};
/// use nalgebra::{Point3, Vector3};
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
/// let bvh = Bvh::build(&mesh, 1e-5);
///
/// let hit = bvh
///     .ray_cast(&Point3::new(0.2, 0.2, 3.0), &-Vector3::z(), 100.0)
///     .unwrap();
/// assert!((hit.distance - 3.0).abs() < 1e-12);
/// ```
#[derive(Debug)]
pub struct Bvh<I: MeshIndex = u32> {
    root: Option<BvhNode>,
    triangles: Vec<[Point3<f64>; 3]>,
    epsilon: f64,
    _marker: PhantomData<I>,
}

impl<I: MeshIndex> Bvh<I> {
    /// Build a BVH over every face of `mesh`.
    ///
    /// `epsilon` pads node boxes and widens triangles so rays through shared
    /// edges still hit.
    pub fn build<M: MeshProvider<Index = I>>(mesh: &M, epsilon: f64) -> Self {
        let triangles = mesh.face_ids().map(|f| mesh.face_positions(f)).collect();
        Self::from_triangles(triangles, epsilon)
    }

    /// Build a BVH over explicit triangles; face ids follow their order.
    pub fn from_triangles(triangles: Vec<[Point3<f64>; 3]>, epsilon: f64) -> Self {
        let mut indices: Vec<usize> = (0..triangles.len()).collect();
        let root = BvhNode::build(&triangles, &mut indices, epsilon);
        debug!(triangles = triangles.len(), "built ray casting BVH");
        Self {
            root,
            triangles,
            epsilon,
            _marker: PhantomData,
        }
    }

    /// Number of triangles.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Whether the BVH holds no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    fn trace(
        &self,
        node: &BvhNode,
        origin: &Point3<f64>,
        direction: &Vector3<f64>,
        dir_inv: &Vector3<f64>,
        max_distance: f64,
    ) -> Option<(f64, usize)> {
        match node.aabb().ray_entry(origin, dir_inv) {
            Some(t_near) if t_near <= max_distance => {}
            _ => return None,
        }

        match node {
            BvhNode::Leaf { face, .. } => {
                ray_triangle_intersect(origin, direction, &self.triangles[*face], self.epsilon)
                    .filter(|&t| t <= max_distance)
                    .map(|t| (t, *face))
            }
            BvhNode::Internal { left, right, .. } => {
                let hit_left = self.trace(left, origin, direction, dir_inv, max_distance);
                let bound = hit_left.map_or(max_distance, |(t, _)| t);
                let hit_right = self.trace(right, origin, direction, dir_inv, bound);
                match (hit_left, hit_right) {
                    (Some(l), Some(r)) => Some(if r < l { r } else { l }),
                    (Some(h), None) | (None, Some(h)) => Some(h),
                    (None, None) => None,
                }
            }
        }
    }
}

impl<I: MeshIndex> RayCaster<I> for Bvh<I> {
    fn ray_cast(
        &self,
        origin: &Point3<f64>,
        direction: &Vector3<f64>,
        max_distance: f64,
    ) -> Option<RayHit<I>> {
        let root = self.root.as_ref()?;
        let direction = direction.try_normalize(f64::EPSILON)?;
        let dir_inv = direction.map(|d| 1.0 / d);

        let (distance, face) = self.trace(root, origin, &direction, &dir_inv, max_distance)?;
        Some(RayHit {
            face: FaceId::new(face),
            distance,
            location: origin + direction * distance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build_from_triangles, HalfEdgeMesh};

    /// Two stacked unit quads at z = 0 and z = 1.
    fn two_layers() -> HalfEdgeMesh {
        let mut vertices = Vec::new();
        let mut faces = Vec::new();
        for z in [0.0, 1.0] {
            let base = vertices.len();
            vertices.extend([
                Point3::new(0.0, 0.0, z),
                Point3::new(1.0, 0.0, z),
                Point3::new(1.0, 1.0, z),
                Point3::new(0.0, 1.0, z),
            ]);
            faces.push([base, base + 1, base + 2]);
            faces.push([base, base + 2, base + 3]);
        }
        build_from_triangles(&vertices, &faces).unwrap()
    }

    #[test]
    fn test_nearest_hit() {
        let bvh = Bvh::build(&two_layers(), 1e-6);
        assert_eq!(bvh.len(), 4);

        let hit = bvh
            .ray_cast(&Point3::new(0.7, 0.2, 5.0), &Vector3::new(0.0, 0.0, -2.0), 100.0)
            .unwrap();
        assert_eq!(hit.face, FaceId::new(2));
        assert!((hit.distance - 4.0).abs() < 1e-12);
        assert!((hit.location - Point3::new(0.7, 0.2, 1.0)).norm() < 1e-12);

        let hit = bvh
            .ray_cast(&Point3::new(0.2, 0.7, -3.0), &Vector3::z(), 100.0)
            .unwrap();
        assert_eq!(hit.face, FaceId::new(1));
    }

    #[test]
    fn test_misses() {
        let bvh = Bvh::build(&two_layers(), 1e-6);
        let origin = Point3::new(0.5, 0.25, 5.0);
        assert!(bvh.ray_cast(&origin, &Vector3::z(), 100.0).is_none());
        assert!(bvh.ray_cast(&origin, &-Vector3::z(), 3.0).is_none());
        assert!(bvh.ray_cast(&origin, &Vector3::zeros(), 100.0).is_none());
        assert!(bvh
            .ray_cast(&Point3::new(3.0, 3.0, 5.0), &-Vector3::z(), 100.0)
            .is_none());
    }

    #[test]
    fn test_shared_edge_tie_breaks_low() {
        let bvh = Bvh::build(&two_layers(), 1e-6);
        // On the diagonal shared by faces 2 and 3.
        let hit = bvh
            .ray_cast(&Point3::new(0.5, 0.5, 5.0), &-Vector3::z(), 100.0)
            .unwrap();
        assert_eq!(hit.face, FaceId::new(2));
    }

    #[test]
    fn test_ray_along_box_face() {
        let bvh = Bvh::<u32>::from_triangles(
            vec![[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ]],
            0.0,
        );
        // Origin exactly on the x = 0 slab plane, ray parallel to it.
        let hit = bvh.ray_cast(&Point3::new(0.0, 0.5, 1.0), &-Vector3::z(), 10.0);
        assert!(hit.is_some());
        assert!(Bvh::<u32>::from_triangles(Vec::new(), 0.0).is_empty());
    }
}
