//! Oriented footprint of a source mesh on the target's UV map.

use nalgebra::{Point2, Point3, Rotation2, Vector2};

/// An oriented rectangle in UV space.
///
/// A source vertex at projection-basis position `co` maps to
/// `anchor + R(rotation) · (co.x · scale.x, co.y · scale.y)`. The anchor is
/// the UV under the mesh origin. `scale.y` is negative when the traced UV
/// map is mirrored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// UV coordinate of the mesh origin.
    pub anchor: Point2<f64>,
    /// Rotation of the rectangle's X axis, in radians.
    pub rotation: f64,
    /// UV units per mesh unit along each rectangle axis.
    pub scale: Vector2<f64>,
    /// Projection-basis bounding box minimum.
    pub mesh_min: Point3<f64>,
    /// Projection-basis bounding box maximum.
    pub mesh_max: Point3<f64>,
}

impl Bounds {
    /// Fit a rectangle to four traced corner UVs.
    ///
    /// Corners are in `top-left, top-right, bottom-right, bottom-left` order
    /// and belong to the box `mesh_min..mesh_max`. Returns `None` when the
    /// box or the traced footprint has no area.
    pub fn from_corners(
        [top_left, top_right, bottom_right, bottom_left]: [Point2<f64>; 4],
        center: Point2<f64>,
        mesh_min: Point3<f64>,
        mesh_max: Point3<f64>,
    ) -> Option<Self> {
        let width = mesh_max.x - mesh_min.x;
        let height = mesh_max.y - mesh_min.y;
        if !(width > 0.0 && height > 0.0) {
            return None;
        }

        let ex = ((top_right - top_left) + (bottom_right - bottom_left)) / (2.0 * width);
        let ey = ((top_left - bottom_left) + (top_right - bottom_right)) / (2.0 * height);
        let cross = ex.perp(&ey);
        if !(cross.is_finite() && cross != 0.0) {
            return None;
        }

        Some(Self {
            anchor: center,
            rotation: ex.y.atan2(ex.x),
            scale: Vector2::new(ex.norm(), cross.signum() * ey.norm()),
            mesh_min,
            mesh_max,
        })
    }

    /// UV position of a projection-basis point; `z` passes through as the
    /// height above the surface.
    pub fn uv_point(&self, co: &Point3<f64>) -> Point3<f64> {
        let local = Vector2::new(co.x * self.scale.x, co.y * self.scale.y);
        let uv = self.anchor + Rotation2::new(self.rotation) * local;
        Point3::new(uv.x, uv.y, co.z)
    }

    /// UV corners of the mesh box, in the same order as
    /// [`from_corners`](Self::from_corners).
    pub fn uv_corners(&self) -> [Point2<f64>; 4] {
        let (min, max) = (self.mesh_min, self.mesh_max);
        [
            Point3::new(min.x, max.y, 0.0),
            Point3::new(max.x, max.y, 0.0),
            Point3::new(max.x, min.y, 0.0),
            Point3::new(min.x, min.y, 0.0),
        ]
        .map(|c| self.uv_point(&c).xy())
    }

    /// Give both axes the smaller UV-per-unit magnitude, so the footprint
    /// keeps the mesh's aspect ratio.
    pub fn ensure_mesh_ratio(&mut self) {
        let magnitude = self.scale.x.abs().min(self.scale.y.abs());
        self.scale.x = magnitude.copysign(self.scale.x);
        self.scale.y = magnitude.copysign(self.scale.y);
    }

    /// Shift the anchor by `offset` UV units.
    pub fn translate(&mut self, offset: &Vector2<f64>) {
        self.anchor += offset;
    }

    /// Rotate the footprint about its anchor.
    pub fn rotate(&mut self, angle: f64) {
        self.rotation += angle;
    }

    /// Scale the footprint about its anchor.
    pub fn scale_by(&mut self, factor: &Vector2<f64>) {
        self.scale.component_mul_assign(factor);
    }
}
