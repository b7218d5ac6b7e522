//! Core mesh data structures.
//!
//! The primary type is [`HalfEdgeMesh`], a triangle mesh stored as a
//! half-edge (doubly-connected edge list) structure with per-vertex normals
//! and an optional active [`UvLayer`]. The engines do not depend on it
//! directly: they are written against [`MeshProvider`], which
//! `HalfEdgeMesh` implements.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`HalfEdgeId`] - Identifies a half-edge
//! - [`FaceId`] - Identifies a face
//!
//! These are generic over the underlying integer type ([`MeshIndex`]), so
//! `u16`, `u32` or `u64` can be chosen based on mesh size. [`MeshId`] names a
//! whole mesh within one engine call.
//!
//! # Construction
//!
//! ```
//! use meshcast::mesh::{HalfEdgeMesh, UvLayer, build_from_triangles};
//! use nalgebra::{Point2, Point3};
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2]];
//! let uvs = vec![
//!     Point2::new(0.0, 0.0),
//!     Point2::new(1.0, 0.0),
//!     Point2::new(0.5, 1.0),
//! ];
//!
//! let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces)
//!     .unwrap()
//!     .with_uv_layer(UvLayer::from_vertex_uvs(&uvs, &faces));
//! assert!(mesh.uv_layer().is_some());
//! ```

mod builder;
mod halfedge;
mod index;
mod placement;
mod provider;
mod uv;

pub use builder::build_from_triangles;
pub use halfedge::{Face, HalfEdge, HalfEdgeMesh, Vertex, VertexHalfEdgeIter};
pub use index::{FaceId, HalfEdgeId, MeshId, MeshIndex, VertexId};
pub use placement::{PlacedMesh, Placement};
pub use provider::MeshProvider;
pub use uv::{uv_triangle_area, UvLayer};
