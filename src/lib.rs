//! # Meshcast
//!
//! Transfer triangle meshes onto other surfaces.
//!
//! Meshcast wraps detail meshes onto a UV-mapped target surface, or
//! reflects them across a mirror surface along its normals. Both engines
//! work on a half-edge mesh with type-safe indices and report per-mesh
//! problems through a leveled [`Reporter`](algo::report::Reporter).
//!
//! ## Features
//!
//! - **Half-edge data structure**: O(1) adjacency queries with type-safe indices
//! - **UV projection**: oriented UV footprints, grid-accelerated UV lookup,
//!   smooth or flat surface offsets
//! - **Normal-based mirroring**: smooth reflection through swept normal
//!   fields, with neighbour propagation for vertices off the mirror
//! - **Parallel execution**: per-vertex work runs on rayon unless disabled
//!
//! ## Projecting onto a surface
//!
//! ```
//! use meshcast::prelude::*;
//! use meshcast::algo::project::{project_meshes, ProjectOptions, ProjectionTarget, View};
//! use nalgebra::{Point2, Point3};
//!
//! // A 2x2 plane whose UVs match its x and y.
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(2.0, 0.0, 0.0),
//!     Point3::new(2.0, 2.0, 0.0),
//!     Point3::new(0.0, 2.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2], [0, 2, 3]];
//! let uvs: Vec<Point2<f64>> = vertices.iter().map(|p| p.xy()).collect();
//! let plane: HalfEdgeMesh = build_from_triangles(&vertices, &faces)
//!     .unwrap()
//!     .with_uv_layer(UvLayer::from_vertex_uvs(&uvs, &faces));
//!
//! let target = PlacedMesh::new(MeshId(0), plane, Placement::identity());
//! let target = ProjectionTarget::new(&target, View::top_down(), ProjectOptions::default()).unwrap();
//!
//! let tile: HalfEdgeMesh = build_from_triangles(
//!     &[
//!         Point3::new(-0.5, -0.5, 0.0),
//!         Point3::new(0.5, -0.5, 0.0),
//!         Point3::new(0.0, 0.5, 0.0),
//!     ],
//!     &[[0, 1, 2]],
//! )
//! .unwrap();
//! let sources = vec![PlacedMesh::new(MeshId(1), tile, Placement::at(Point3::new(1.0, 1.0, 1.0)))];
//!
//! let projected = project_meshes(&target, &sources, &Reporter::none());
//! assert_eq!(projected.len(), 1);
//! assert_eq!(projected[0].counts.failed, 0);
//! ```
//!
//! ## Mesh Traversal
//!
//! ```
//! use meshcast::prelude::*;
//! use nalgebra::Point3;
//!
//! # let vertices = vec![
//! #     Point3::new(0.0, 0.0, 0.0),
//! #     Point3::new(1.0, 0.0, 0.0),
//! #     Point3::new(0.5, 1.0, 0.0),
//! # ];
//! # let faces = vec![[0, 1, 2]];
//! # let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
//! let v = VertexId::new(0);
//! for neighbor in mesh.vertex_neighbors(v) {
//!     println!("Neighbor: {:?}", neighbor);
//! }
//!
//! let f = FaceId::new(0);
//! let [v0, v1, v2] = mesh.face_triangle(f);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod geometry;
pub mod mesh;
pub mod raycast;

/// Prelude module for convenient imports.
///
/// ```
/// use meshcast::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::mirror::{mirror_meshes, MirrorOptions, MirroredMesh};
    pub use crate::algo::project::{
        project_meshes, project_onto, ProjectOptions, ProjectedMesh, ProjectionTarget,
        ProjectionType, View,
    };
    pub use crate::algo::report::{Level, Reporter};
    pub use crate::error::{MeshError, Result, SkipReason};
    pub use crate::mesh::{
        build_from_triangles, Face, FaceId, HalfEdge, HalfEdgeId, HalfEdgeMesh,
        MeshId, MeshIndex, MeshProvider, PlacedMesh, Placement, UvLayer, Vertex, VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;
