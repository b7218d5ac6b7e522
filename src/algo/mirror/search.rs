//! Intersection records between source vertices and mirror faces.

use nalgebra::{Point3, Vector3};

use crate::geometry::{barycentric, triangle_ray_plane_intersect, Barycentric};
use crate::mesh::{FaceId, MeshIndex, MeshProvider, VertexId};

/// Below this magnitude `n · N` counts as perpendicular.
const ALIGNMENT_EPSILON: f64 = 1e-12;

/// A source vertex measured against one mirror face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MirrorHit<I: MeshIndex = u32> {
    /// The mirror face.
    pub face: FaceId<I>,
    /// Signed distance from the face plane, positive in front.
    pub t: f64,
    /// Weights of the vertex in the face's normal field. Zero for
    /// plane-only records.
    pub weights: Barycentric,
    /// Whether the vertex lies inside the face's normal field.
    pub intersected: bool,
}

impl<I: MeshIndex> MirrorHit<I> {
    /// Displacement that reflects the vertex across the face.
    ///
    /// Smooth reflection travels along the interpolated corner normal `N`
    /// by `-2t / (n · N)`; flat reflection travels `-2t` along the face
    /// normal `n`. Smooth falls back to flat when `N` is perpendicular
    /// to `n`.
    pub fn mirror_vector<M: MeshProvider<Index = I>>(&self, mirror: &M, smooth: bool) -> Vector3<f64> {
        let n = mirror.face_normal(self.face);
        if smooth {
            let interpolated = self.weights.interpolate_vector(&mirror.face_normals(self.face));
            let alignment = n.dot(&interpolated);
            if alignment.abs() > ALIGNMENT_EPSILON {
                return interpolated * (-2.0 * self.t / alignment);
            }
        }
        n * (-2.0 * self.t)
    }
}

/// Search state of one source vertex.
///
/// `F` indexes mirror faces and `V` indexes source vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchRecord<F: MeshIndex = u32, V: MeshIndex = u32> {
    /// The face the vertex was mirrored across, once it has been.
    pub hit: Option<MirrorHit<F>>,
    /// Nearest mirrored neighbour seen so far.
    pub close_vertex: Option<VertexId<V>>,
    /// Edge length to `close_vertex`.
    pub close_distance: f64,
}

impl<F: MeshIndex, V: MeshIndex> Default for SearchRecord<F, V> {
    fn default() -> Self {
        Self {
            hit: None,
            close_vertex: None,
            close_distance: f64::INFINITY,
        }
    }
}

impl<F: MeshIndex, V: MeshIndex> SearchRecord<F, V> {
    /// Whether the vertex has been mirrored.
    #[inline]
    pub fn is_mirrored(&self) -> bool {
        self.hit.is_some()
    }

    /// Remember `neighbor` if it is closer than the nearest one so far.
    pub fn offer_neighbor(&mut self, neighbor: VertexId<V>, distance: f64) {
        if distance < self.close_distance {
            self.close_distance = distance;
            self.close_vertex = Some(neighbor);
        }
    }
}

/// Measure `point` against a mirror face.
///
/// The face is swept along its corner normals to the height of `point`;
/// the point intersects the face when its weights in that swept triangle
/// all exceed `-bias`. With `cull_backfaces`, points behind the face give
/// `None`. Corner normals perpendicular to the face also give `None`, and a
/// degenerate swept triangle never intersects.
pub fn tri_intersection<M: MeshProvider>(
    mirror: &M,
    face: FaceId<M::Index>,
    point: &Point3<f64>,
    bias: f64,
    cull_backfaces: bool,
) -> Option<MirrorHit<M::Index>> {
    let n = mirror.face_normal(face);
    let corners = mirror.face_positions(face);
    let t = n.dot(&(point - corners[0]));
    if cull_backfaces && t < 0.0 {
        return None;
    }

    let plane = triangle_ray_plane_intersect(point, &n, &corners, &mirror.face_normals(face))?;
    let [p0, p1, p2] = &plane.points;
    let hit = match barycentric(point, p0, p1, p2) {
        Some(weights) => MirrorHit {
            face,
            t,
            weights,
            intersected: weights.to_array().iter().all(|&x| x > -bias),
        },
        None => MirrorHit {
            face,
            t,
            weights: Barycentric::new(0.0, 0.0, 0.0),
            intersected: false,
        },
    };
    Some(hit)
}

/// Intersecting face with the smallest signed distance over the whole
/// mirror.
///
/// Faces are tested in index order and only a strictly smaller `t`
/// replaces the current best, so ties keep the lowest face index.
pub fn find_closest_tri<M: MeshProvider>(
    mirror: &M,
    point: &Point3<f64>,
    bias: f64,
    cull_backfaces: bool,
) -> Option<MirrorHit<M::Index>> {
    let mut best: Option<MirrorHit<M::Index>> = None;
    for face in mirror.face_ids() {
        let Some(hit) = tri_intersection(mirror, face, point, bias, cull_backfaces) else {
            continue;
        };
        if hit.intersected && best.map_or(true, |current| hit.t < current.t) {
            best = Some(hit);
        }
    }
    best
}

/// Plane-only record of `point` against a face: its signed distance, never
/// intersected.
pub fn plane_distance<M: MeshProvider>(
    mirror: &M,
    face: FaceId<M::Index>,
    point: &Point3<f64>,
) -> MirrorHit<M::Index> {
    let [v0, _, _] = mirror.face_positions(face);
    MirrorHit {
        face,
        t: mirror.face_normal(face).dot(&(point - v0)),
        weights: Barycentric::new(0.0, 0.0, 0.0),
        intersected: false,
    }
}
