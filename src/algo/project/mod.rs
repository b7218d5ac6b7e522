//! UV-guided surface projection.
//!
//! Source meshes are wrapped onto a target surface through the target's UV
//! map. Each source is handled in two steps:
//!
//! 1. [`ProjectionTarget::prepare`] rotates the source into a basis facing
//!    the camera and traces its bounding box onto the target along the view,
//!    giving an oriented footprint ([`Bounds`]) in UV space.
//! 2. [`ProjectionTarget::project_prepared`] maps every vertex through the
//!    footprint to a UV, finds the target triangle there with the
//!    [`PartitionGrid`](crate::algo::partition::PartitionGrid), and rebuilds
//!    the vertex on that triangle, lifted along the surface normal by its
//!    height.
//!
//! Vertices whose UV falls outside every triangle snap to the closest one
//! and are flagged [`VertexStatus::Partial`].
//!
//! [`project_meshes`] runs both steps over a batch of sources and reports
//! per-mesh problems through a [`Reporter`](crate::algo::report::Reporter);
//! [`project_onto`] also builds the target and reports its failures.

mod bounds;
mod engine;
mod options;
pub mod solver;

pub use bounds::Bounds;
pub use engine::{
    project_meshes, project_onto, PreparedSource, ProjectedMesh, ProjectionCounts,
    ProjectionTarget, VertexStatus,
};
pub use options::{ProjectOptions, ProjectionType, View};
