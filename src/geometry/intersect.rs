//! Ray and plane intersection against triangles.

use nalgebra::{Point3, Vector3};

/// Below this magnitude a dot product counts as perpendicular.
const PARALLEL_EPSILON: f64 = 1e-12;

/// A triangle offset along its corner normals.
///
/// Produced by [`triangle_ray_plane_intersect`]: the face plane is moved to
/// the height of the query point, but each corner slides along its own
/// normal instead of the face normal. The resulting triangle is the slice of
/// the smooth normal field at that height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualPlane {
    /// Signed distance of the query point from the flat face plane.
    pub t: f64,
    /// Corner positions offset along their normals.
    pub points: [Point3<f64>; 3],
}

/// Distance from `origin` to a triangle's plane and the matching virtual
/// triangle in the triangle's normal field.
///
/// `t = n·(origin − corner₀)` and each virtual corner is
/// `cornerᵢ + t / (n·Nᵢ) · Nᵢ`. Returns `None` if a corner normal is
/// perpendicular to the face normal.
pub fn triangle_ray_plane_intersect(
    origin: &Point3<f64>,
    face_normal: &Vector3<f64>,
    corners: &[Point3<f64>; 3],
    corner_normals: &[Vector3<f64>; 3],
) -> Option<VirtualPlane> {
    let t = face_normal.dot(&(origin - corners[0]));

    let mut points = *corners;
    for (point, normal) in points.iter_mut().zip(corner_normals) {
        let alignment = face_normal.dot(normal);
        if alignment.abs() < PARALLEL_EPSILON {
            return None;
        }
        *point += normal * (t / alignment);
    }

    Some(VirtualPlane { t, points })
}

/// Two-sided Möller–Trumbore ray/triangle intersection.
///
/// Returns the ray parameter `t ≥ 0` of the hit. `epsilon` widens the
/// triangle slightly so rays through shared edges do not slip between
/// neighbours. Rays parallel to the triangle and degenerate triangles miss.
pub fn ray_triangle_intersect(
    origin: &Point3<f64>,
    direction: &Vector3<f64>,
    [v0, v1, v2]: &[Point3<f64>; 3],
    epsilon: f64,
) -> Option<f64> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = direction.cross(&edge2);
    let a = edge1.dot(&h);
    if a.abs() < PARALLEL_EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = origin - v0;
    let u = f * s.dot(&h);
    if u < -epsilon || u > 1.0 + epsilon {
        return None;
    }

    let q = s.cross(&edge1);
    let v = f * direction.dot(&q);
    if v < -epsilon || u + v > 1.0 + epsilon {
        return None;
    }

    let t = f * edge2.dot(&q);
    (t >= 0.0).then_some(t)
}
