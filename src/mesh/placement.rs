//! Object placement: where a mesh sits in the world.

use nalgebra::{Matrix3, Point3, UnitQuaternion, Vector3};

use super::index::MeshId;
use super::provider::MeshProvider;

/// Translation, rotation and per-axis scale of a mesh object.
///
/// A local point `p` maps to `translation + rotation * (scale ∘ p)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// World location of the object origin.
    pub translation: Vector3<f64>,
    /// Orientation of the object.
    pub rotation: UnitQuaternion<f64>,
    /// Per-axis scale applied before rotation.
    pub scale: Vector3<f64>,
}

impl Default for Placement {
    fn default() -> Self {
        Self::identity()
    }
}

impl Placement {
    /// The identity placement.
    pub fn identity() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            scale: Vector3::repeat(1.0),
        }
    }

    /// Placement at a world location, unrotated and unscaled.
    pub fn at(location: Point3<f64>) -> Self {
        Self {
            translation: location.coords,
            ..Self::identity()
        }
    }

    /// Set the rotation.
    pub fn with_rotation(mut self, rotation: UnitQuaternion<f64>) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the per-axis scale.
    pub fn with_scale(mut self, scale: Vector3<f64>) -> Self {
        self.scale = scale;
        self
    }

    /// World location of the object origin.
    #[inline]
    pub fn location(&self) -> Point3<f64> {
        Point3::from(self.translation)
    }

    /// Rotation as a matrix whose columns are the object axes in world space.
    #[inline]
    pub fn rotation_matrix(&self) -> Matrix3<f64> {
        *self.rotation.to_rotation_matrix().matrix()
    }

    /// Local point to world.
    #[inline]
    pub fn transform_point(&self, p: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.translation + self.rotation * p.coords.component_mul(&self.scale))
    }

    /// World point back to local.
    #[inline]
    pub fn inverse_transform_point(&self, p: &Point3<f64>) -> Point3<f64> {
        let unrotated = self.rotation.inverse() * (p.coords - self.translation);
        Point3::from(unrotated.component_div(&self.scale))
    }

    /// Local normal to world (inverse transpose, renormalised).
    pub fn transform_normal(&self, n: &Vector3<f64>) -> Vector3<f64> {
        let scaled = n.component_div(&self.scale);
        (self.rotation * scaled)
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }

    /// World normal back to local.
    pub fn inverse_transform_normal(&self, n: &Vector3<f64>) -> Vector3<f64> {
        let unrotated = self.rotation.inverse() * n;
        unrotated
            .component_mul(&self.scale)
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Move every vertex and normal of `mesh` from local to world space.
    pub fn apply<M: MeshProvider>(&self, mesh: &mut M) {
        let ids: Vec<_> = mesh.vertex_ids().collect();
        for v in ids {
            let p = self.transform_point(&mesh.position(v));
            let n = self.transform_normal(&mesh.normal(v));
            mesh.set_position(v, p);
            mesh.set_normal(v, n);
        }
    }

    /// Move every vertex and normal of `mesh` from world back to local space.
    pub fn unapply<M: MeshProvider>(&self, mesh: &mut M) {
        let ids: Vec<_> = mesh.vertex_ids().collect();
        for v in ids {
            let p = self.inverse_transform_point(&mesh.position(v));
            let n = self.inverse_transform_normal(&mesh.normal(v));
            mesh.set_position(v, p);
            mesh.set_normal(v, n);
        }
    }
}

/// A mesh in local space together with its identity and placement.
///
/// This is how meshes enter an engine call: targets, mirrors and sources
/// alike.
#[derive(Debug, Clone)]
pub struct PlacedMesh<M> {
    /// Identity within the call.
    pub id: MeshId,
    /// Local-space geometry.
    pub mesh: M,
    /// Local-to-world transform.
    pub placement: Placement,
}

impl<M: MeshProvider> PlacedMesh<M> {
    /// Wrap a mesh.
    pub fn new(id: MeshId, mesh: M, placement: Placement) -> Self {
        Self {
            id,
            mesh,
            placement,
        }
    }

    /// A copy of the mesh with positions and normals in world space.
    pub fn world_copy(&self) -> M
    where
        M: Clone,
    {
        let mut mesh = self.mesh.clone();
        self.placement.apply(&mut mesh);
        mesh
    }
}
