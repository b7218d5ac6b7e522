//! Geometry kernels shared by the projection and mirror engines.
//!
//! - [`barycentric`]: barycentric weights, point-in-triangle, closest point
//! - [`intersect`]: ray/triangle and normal-field plane intersection
//! - [`axis`]: orientation bases for camera-aligned projection
//!
//! Every kernel reports "no result" through `Option` instead of producing
//! NaN for degenerate triangles or parallel rays.

pub mod axis;
pub mod barycentric;
pub mod intersect;

pub use axis::{axis_align_rotation_matrix, z_up_find_axis};
pub use barycentric::{
    barycentric, clamp01, closest_point_in_triangle, point_in_triangle, Barycentric, ClosestPoint,
    TriangleFeature,
};
pub use intersect::{ray_triangle_intersect, triangle_ray_plane_intersect, VirtualPlane};

use nalgebra::Point3;

/// Axis-aligned bounding box of a set of points.
///
/// Returns `None` for an empty set.
pub fn bounding_box<'a, P>(points: P) -> Option<(Point3<f64>, Point3<f64>)>
where
    P: IntoIterator<Item = &'a Point3<f64>>,
{
    let mut points = points.into_iter();
    let first = *points.next()?;
    Some(points.fold((first, first), |(min, max), p| (min.inf(p), max.sup(p))))
}
