//! Projection settings and the camera the projection is seen through.

use nalgebra::{Matrix3, Point3, Vector2, Vector3};

use crate::error::{MeshError, Result};

/// How a source mesh is oriented before its footprint is traced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionType {
    /// Keep the mesh's own Z up from the surface; pick the X/Y stand-ins
    /// from whichever mesh axis faces the camera.
    ZIsUp,
    /// Orient the mesh exactly as the camera sees it.
    Camera,
    /// Snap the mesh axes to the camera axes they are closest to.
    #[default]
    AxisAligned,
}

/// Options for surface projection.
///
/// `bias`, `partitions_per_face`, `max_ray_distance` and `projection` are
/// fixed when a [`ProjectionTarget`](super::ProjectionTarget) is built. The
/// rest may be changed between calls to
/// [`project_prepared`](super::ProjectionTarget::project_prepared).
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectOptions {
    /// Barycentric tolerance for containment tests.
    pub bias: f64,

    /// Offset along the interpolated vertex normals instead of the flat
    /// face normal.
    pub smooth: bool,

    /// Per-axis scale: x/y scale the footprint on the UV map, z multiplies
    /// the depth above the surface.
    pub scalar: Vector3<f64>,

    /// Footprint offset in UV units.
    pub move_xy: Vector2<f64>,

    /// Footprint rotation in radians.
    pub rotation: f64,

    /// Constant added to every vertex depth.
    pub depth: f64,

    /// Orientation strategy.
    pub projection: ProjectionType,

    /// Give both footprint axes the same UV-per-unit scale.
    pub keep_relative: bool,

    /// Grid density: partition cells per target triangle.
    pub partitions_per_face: f64,

    /// Maximum ray length when tracing the footprint.
    pub max_ray_distance: f64,

    /// Whether to use parallel execution (default: true).
    pub parallel: bool,
}

impl Default for ProjectOptions {
    fn default() -> Self {
        Self {
            bias: 1e-5,
            smooth: true,
            scalar: Vector3::repeat(1.0),
            move_xy: Vector2::zeros(),
            rotation: 0.0,
            depth: 0.0,
            projection: ProjectionType::AxisAligned,
            keep_relative: false,
            partitions_per_face: 0.25,
            max_ray_distance: 10_000.0,
            parallel: true,
        }
    }
}

impl ProjectOptions {
    /// Set the containment tolerance.
    pub fn with_bias(mut self, bias: f64) -> Self {
        self.bias = bias;
        self
    }

    /// Choose smooth or flat normal offsets.
    pub fn with_smooth(mut self, smooth: bool) -> Self {
        self.smooth = smooth;
        self
    }

    /// Set the footprint scale and depth multiplier.
    pub fn with_scalar(mut self, scalar: Vector3<f64>) -> Self {
        self.scalar = scalar;
        self
    }

    /// Set the footprint offset.
    pub fn with_move(mut self, move_xy: Vector2<f64>) -> Self {
        self.move_xy = move_xy;
        self
    }

    /// Set the footprint rotation in radians.
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the global depth offset.
    pub fn with_depth(mut self, depth: f64) -> Self {
        self.depth = depth;
        self
    }

    /// Set the orientation strategy.
    pub fn with_projection(mut self, projection: ProjectionType) -> Self {
        self.projection = projection;
        self
    }

    /// Keep the footprint's aspect ratio.
    pub fn with_keep_relative(mut self, keep_relative: bool) -> Self {
        self.keep_relative = keep_relative;
        self
    }

    /// Set the grid density.
    pub fn with_partitions_per_face(mut self, partitions_per_face: f64) -> Self {
        self.partitions_per_face = partitions_per_face;
        self
    }

    /// Set the maximum ray length.
    pub fn with_max_ray_distance(mut self, distance: f64) -> Self {
        self.max_ray_distance = distance;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Partition cells are sized to cover this many triangles.
    pub fn faces_per_cell(&self) -> f64 {
        1.0 / self.partitions_per_face
    }

    /// Check every value.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidParameter`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if !(self.bias.is_finite() && self.bias >= 0.0) {
            return Err(MeshError::invalid_param("bias", self.bias, "must be finite and non-negative"));
        }
        if !(self.partitions_per_face.is_finite() && self.partitions_per_face > 0.0) {
            return Err(MeshError::invalid_param(
                "partitions_per_face",
                self.partitions_per_face,
                "must be finite and positive",
            ));
        }
        if !(self.max_ray_distance > 0.0) {
            return Err(MeshError::invalid_param(
                "max_ray_distance",
                self.max_ray_distance,
                "must be positive",
            ));
        }
        if !self.scalar.iter().all(|s| s.is_finite()) {
            return Err(MeshError::invalid_param("scalar", self.scalar.transpose(), "must be finite"));
        }
        if !self.move_xy.iter().all(|m| m.is_finite()) {
            return Err(MeshError::invalid_param("move_xy", self.move_xy.transpose(), "must be finite"));
        }
        if !self.rotation.is_finite() {
            return Err(MeshError::invalid_param("rotation", self.rotation, "must be finite"));
        }
        if !self.depth.is_finite() {
            return Err(MeshError::invalid_param("depth", self.depth, "must be finite"));
        }
        Ok(())
    }
}

/// The camera a projection is seen through.
///
/// Columns of `rotation` are the camera axes in world space. The camera looks
/// along its negative Z axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    /// Camera axes as columns.
    pub rotation: Matrix3<f64>,
    /// Camera position; only used by perspective views.
    pub position: Point3<f64>,
    /// Parallel rays along the view axis instead of rays from the camera.
    pub orthographic: bool,
}

impl View {
    /// Orthographic view with the given axes.
    pub fn orthographic(rotation: Matrix3<f64>) -> Self {
        Self {
            rotation,
            position: Point3::origin(),
            orthographic: true,
        }
    }

    /// Perspective view from `position` with the given axes.
    pub fn perspective(rotation: Matrix3<f64>, position: Point3<f64>) -> Self {
        Self {
            rotation,
            position,
            orthographic: false,
        }
    }

    /// Orthographic view looking straight down world -Z.
    pub fn top_down() -> Self {
        Self::orthographic(Matrix3::identity())
    }

    /// Ray direction through `point`.
    pub fn direction(&self, point: &Point3<f64>) -> Vector3<f64> {
        if self.orthographic {
            -self.rotation.column(2).into_owned()
        } else {
            (point - self.position)
                .try_normalize(f64::EPSILON)
                .unwrap_or_else(|| -self.rotation.column(2).into_owned())
        }
    }

    /// World-to-camera rotation.
    pub fn inverse_rotation(&self) -> Matrix3<f64> {
        self.rotation.transpose()
    }
}

impl Default for View {
    fn default() -> Self {
        Self::top_down()
    }
}
