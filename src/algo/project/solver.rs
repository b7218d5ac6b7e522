//! Orientation and bounds solving for a source mesh.
//!
//! A source mesh is first rotated into a basis facing the camera. The four
//! corners of its bounding box are then traced onto the target surface along
//! the view direction, giving a UV footprint.

use nalgebra::{Matrix3, Point2, Point3};
use tracing::debug;

use super::bounds::Bounds;
use super::options::{ProjectionType, View};
use crate::error::{Corner, SkipReason};
use crate::geometry::{axis_align_rotation_matrix, point_in_triangle, z_up_find_axis, Barycentric};
use crate::mesh::{uv_triangle_area, FaceId, MeshProvider};
use crate::raycast::RayCaster;

/// Number of attempts per corner trace: the corner itself, then four
/// successive halvings toward the centre.
pub const CORNER_RETRIES: u32 = 5;

/// Rotation into the projection basis, and the world axes of that basis.
///
/// `mesh_rotation` is the source object's world rotation.
pub fn orientation(
    projection: ProjectionType,
    mesh_rotation: &Matrix3<f64>,
    view: &View,
) -> (Matrix3<f64>, Matrix3<f64>) {
    match projection {
        ProjectionType::ZIsUp => (
            Matrix3::identity(),
            z_up_find_axis(mesh_rotation, &view.rotation),
        ),
        ProjectionType::Camera => (view.inverse_rotation() * mesh_rotation, view.rotation),
        ProjectionType::AxisAligned => {
            let rotation = axis_align_rotation_matrix(&(view.inverse_rotation() * mesh_rotation));
            (rotation, mesh_rotation * rotation.transpose())
        }
    }
}

/// World positions of the box corners, in [`Corner::ALL`] order.
pub fn box_corners(
    min: &Point3<f64>,
    max: &Point3<f64>,
    axes: &Matrix3<f64>,
    location: &Point3<f64>,
) -> [Point3<f64>; 4] {
    let x = axes.column(0);
    let y = axes.column(1);
    let at = |u: f64, v: f64| location + x * u + y * v;
    [
        at(min.x, max.y),
        at(max.x, max.y),
        at(max.x, min.y),
        at(min.x, min.y),
    ]
}

/// Casts view rays at a target surface and reads UVs at the hits.
pub struct SurfaceTracer<'a, M: MeshProvider> {
    pub(crate) mesh: &'a M,
    pub(crate) ray_caster: &'a dyn RayCaster<M::Index>,
    pub(crate) view: &'a View,
    pub(crate) bias: f64,
    pub(crate) max_distance: f64,
}

impl<'a, M: MeshProvider> SurfaceTracer<'a, M> {
    /// Target triangle and barycentric weights under `point`.
    ///
    /// A hit whose weights fail the bias test counts as a miss.
    pub fn ray_cast_target(&self, point: &Point3<f64>) -> Option<(FaceId<M::Index>, Barycentric)> {
        let direction = self.view.direction(point);
        let hit = self.ray_caster.ray_cast(point, &direction, self.max_distance)?;
        let [a, b, c] = self.mesh.face_positions(hit.face);
        let weights = point_in_triangle(&hit.location, &a, &b, &c, self.bias)?;
        Some((hit.face, weights))
    }

    /// UV under `point`, or `None` on a miss.
    pub fn uv_at(&self, point: &Point3<f64>) -> Option<Point2<f64>> {
        let (face, weights) = self.ray_cast_target(point)?;
        let uvs = self.mesh.face_uvs(face)?;
        Some(weights.interpolate_uv(&uvs))
    }

    /// UV a corner maps to.
    ///
    /// Traces at `corner`, then at points halfway closer to `center` on each
    /// miss. A hit at fraction `m` of the way out has its UV offset from
    /// `center_uv` divided by `m`. Hits on triangles with no UV area are
    /// ignored.
    pub fn trace_uv_target(
        &self,
        corner: &Point3<f64>,
        center: &Point3<f64>,
        center_uv: &Point2<f64>,
    ) -> Option<Point2<f64>> {
        (0..CORNER_RETRIES).find_map(|k| {
            let fraction = 0.5_f64.powi(k as i32);
            let point = center + (corner - center) * fraction;
            let (face, weights) = self.ray_cast_target(&point)?;
            let uvs = self.mesh.face_uvs(face)?;
            if uv_triangle_area(&uvs[0], &uvs[1], &uvs[2]) <= 0.0 {
                return None;
            }
            let uv = weights.interpolate_uv(&uvs);
            Some(center_uv + (uv - center_uv) / fraction)
        })
    }

    /// Trace the footprint of a projection-basis box placed at `location`
    /// with world `axes`.
    pub fn solve_bounds(
        &self,
        mesh_min: &Point3<f64>,
        mesh_max: &Point3<f64>,
        axes: &Matrix3<f64>,
        location: &Point3<f64>,
    ) -> Result<Bounds, SkipReason> {
        let center_uv = self.uv_at(location).ok_or(SkipReason::CenterMissed)?;

        let corners = box_corners(mesh_min, mesh_max, axes, location);
        let mut traced = [Point2::origin(); 4];
        for ((uv, corner), which) in traced.iter_mut().zip(&corners).zip(Corner::ALL) {
            *uv = self
                .trace_uv_target(corner, location, &center_uv)
                .ok_or(SkipReason::CornerMissed { corner: which })?;
        }

        let bounds = Bounds::from_corners(traced, center_uv, *mesh_min, *mesh_max)
            .ok_or(SkipReason::ZeroUvArea)?;
        debug!(
            rotation = bounds.rotation,
            scale_x = bounds.scale.x,
            scale_y = bounds.scale.y,
            "solved projection bounds"
        );
        Ok(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build_from_triangles, HalfEdgeMesh, UvLayer};
    use crate::raycast::Bvh;
    use nalgebra::{Rotation3, Vector3};
    use std::f64::consts::FRAC_PI_2;

    /// Plane over [0, 2]² at z = 0 with uv = xy, split so the left half
    /// has no UV area.
    fn half_mapped_plane() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
        ];
        let faces = vec![[0, 1, 4], [0, 4, 3], [1, 2, 5], [1, 5, 4]];
        let mut uvs: Vec<Point2<f64>> = vertices.iter().map(|p| p.xy()).collect();
        uvs[0] = uvs[1];
        uvs[3] = uvs[4];
        build_from_triangles(&vertices, &faces)
            .unwrap()
            .with_uv_layer(UvLayer::from_vertex_uvs(&uvs, &faces))
    }

    #[test]
    fn test_orientation_identity() {
        let view = View::top_down();
        for projection in [ProjectionType::ZIsUp, ProjectionType::Camera, ProjectionType::AxisAligned] {
            let (rotation, axes) = orientation(projection, &Matrix3::identity(), &view);
            assert!((rotation - Matrix3::identity()).norm() < 1e-12);
            assert!((axes.column(2) - Vector3::z()).norm() < 1e-12);
        }
    }

    #[test]
    fn test_axis_aligned_axes_follow_mesh() {
        let view = View::top_down();
        let mesh_rotation = *Rotation3::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2).matrix();
        let (rotation, axes) = orientation(ProjectionType::AxisAligned, &mesh_rotation, &view);
        // Snapping to the camera axes undoes the quarter turn.
        assert!((mesh_rotation * rotation.transpose() - axes).norm() < 1e-12);
        assert!((axes - Matrix3::identity()).norm() < 1e-12);
    }

    #[test]
    fn test_box_corners() {
        let corners = box_corners(
            &Point3::new(-1.0, -2.0, 0.0),
            &Point3::new(1.0, 2.0, 0.0),
            &Matrix3::identity(),
            &Point3::new(10.0, 0.0, 5.0),
        );
        assert_eq!(corners[0], Point3::new(9.0, 2.0, 5.0));
        assert_eq!(corners[2], Point3::new(11.0, -2.0, 5.0));
    }

    #[test]
    fn test_corner_retry_rescales() {
        let target = half_mapped_plane();
        let bvh = Bvh::build(&target, 1e-6);
        let view = View::top_down();
        let tracer = SurfaceTracer {
            mesh: &target,
            ray_caster: &bvh,
            view: &view,
            bias: 1e-5,
            max_distance: 100.0,
        };

        let center = Point3::new(1.5, 1.0, 1.0);
        let center_uv = tracer.uv_at(&center).unwrap();
        assert!((center_uv - Point2::new(1.5, 1.0)).norm() < 1e-12);

        // Corner lands on the zero-area half; a quarter of the way out does not.
        let uv = tracer
            .trace_uv_target(&Point3::new(0.5, 1.0, 1.0), &center, &center_uv)
            .unwrap();
        assert!((uv - Point2::new(0.5, 1.0)).norm() < 1e-12);

        // Off the surface entirely, even at 1/16 of the way.
        assert!(tracer
            .trace_uv_target(&Point3::new(1.5, 100.0, 1.0), &center, &center_uv)
            .is_none());
    }

    #[test]
    fn test_corner_attempt_limit() {
        let target = half_mapped_plane();
        let bvh = Bvh::build(&target, 1e-6);
        let view = View::top_down();
        let tracer = SurfaceTracer {
            mesh: &target,
            ray_caster: &bvh,
            view: &view,
            bias: 1e-5,
            max_distance: 100.0,
        };
        let center = Point3::new(1.5, 1.0, 1.0);
        let center_uv = tracer.uv_at(&center).unwrap();
        assert_eq!(CORNER_RETRIES, 5);

        // Only the last attempt (1/16 of the way) lands before the edge at x = 2.
        let uv = tracer
            .trace_uv_target(&Point3::new(9.4, 1.0, 1.0), &center, &center_uv)
            .unwrap();
        assert!((uv - Point2::new(9.4, 1.0)).norm() < 1e-9);

        // Would need a sixth attempt at 1/32.
        assert!(tracer
            .trace_uv_target(&Point3::new(9.7, 1.0, 1.0), &center, &center_uv)
            .is_none());
    }

    #[test]
    fn test_solve_bounds_failures() {
        let target = half_mapped_plane();
        let bvh = Bvh::build(&target, 1e-6);
        let view = View::top_down();
        let tracer = SurfaceTracer {
            mesh: &target,
            ray_caster: &bvh,
            view: &view,
            bias: 1e-5,
            max_distance: 100.0,
        };
        let min = Point3::new(-0.25, -0.25, 0.0);
        let max = Point3::new(0.25, 0.25, 0.0);

        let missed = tracer.solve_bounds(&min, &max, &Matrix3::identity(), &Point3::new(5.0, 5.0, 1.0));
        assert_eq!(missed, Err(SkipReason::CenterMissed));

        let far = Point3::new(-100.0, -0.25, 0.0);
        let corner = tracer.solve_bounds(&far, &max, &Matrix3::identity(), &Point3::new(1.5, 1.0, 1.0));
        assert_eq!(
            corner,
            Err(SkipReason::CornerMissed {
                corner: Corner::TopLeft
            })
        );

        let bounds = tracer
            .solve_bounds(&min, &max, &Matrix3::identity(), &Point3::new(1.5, 1.0, 1.0))
            .unwrap();
        assert!((bounds.anchor - Point2::new(1.5, 1.0)).norm() < 1e-12);
        assert!((bounds.scale - nalgebra::Vector2::new(1.0, 1.0)).norm() < 1e-9);
    }
}
