//! Ray casting against a target surface.
//!
//! The bounds solver needs "nearest triangle hit along a ray" and nothing
//! more, so it talks to a [`RayCaster`]. [`Bvh`] is the bundled
//! implementation; a host with its own acceleration structure can plug that
//! in instead.

mod bvh;

pub use bvh::Bvh;

use nalgebra::{Point3, Vector3};

use crate::mesh::{FaceId, MeshIndex};

/// Nearest hit of a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit<I: MeshIndex = u32> {
    /// Triangle that was hit.
    pub face: FaceId<I>,
    /// Distance from the ray origin along the normalised direction.
    pub distance: f64,
    /// Hit point.
    pub location: Point3<f64>,
}

/// Finds the nearest triangle along a ray.
pub trait RayCaster<I: MeshIndex = u32>: Send + Sync {
    /// Cast a ray from `origin` along `direction`, up to `max_distance`.
    ///
    /// `direction` need not be normalised. Returns `None` on a miss or for a
    /// zero direction. Equal-distance hits resolve to the lowest face index.
    fn ray_cast(
        &self,
        origin: &Point3<f64>,
        direction: &Vector3<f64>,
        max_distance: f64,
    ) -> Option<RayHit<I>>;
}
