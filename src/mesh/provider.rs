//! The mesh interface the engines are written against.
//!
//! Projection and mirroring only need positions, normals, triangles, UVs and
//! two adjacency queries. [`MeshProvider`] captures exactly that, so a host
//! application can adapt its own mesh type instead of converting into a
//! [`HalfEdgeMesh`].

use nalgebra::{Point2, Point3, Vector3};

use super::halfedge::HalfEdgeMesh;
use super::index::{FaceId, MeshIndex, VertexId};

/// Read/write access to a triangulated mesh.
///
/// Iteration orders (vertex ids, neighbours) must be stable between calls;
/// the engines rely on them for reproducible tie-breaking.
pub trait MeshProvider {
    /// Integer type behind the element ids.
    type Index: MeshIndex;

    /// Number of vertices.
    fn num_vertices(&self) -> usize;

    /// Number of triangles.
    fn num_faces(&self) -> usize;

    /// Vertex position.
    fn position(&self, v: VertexId<Self::Index>) -> Point3<f64>;

    /// Move a vertex.
    fn set_position(&mut self, v: VertexId<Self::Index>, position: Point3<f64>);

    /// Vertex shading normal.
    fn normal(&self, v: VertexId<Self::Index>) -> Vector3<f64>;

    /// Overwrite a vertex shading normal.
    fn set_normal(&mut self, v: VertexId<Self::Index>, normal: Vector3<f64>);

    /// Corner vertices of a triangle.
    fn face_triangle(&self, f: FaceId<Self::Index>) -> [VertexId<Self::Index>; 3];

    /// Flat unit normal of a triangle.
    fn face_normal(&self, f: FaceId<Self::Index>) -> Vector3<f64>;

    /// Corner UVs from the active UV layer, if the mesh has one.
    fn face_uvs(&self, f: FaceId<Self::Index>) -> Option<[Point2<f64>; 3]>;

    /// Number of faces covered by the active UV layer, or `None` without one.
    fn uv_face_count(&self) -> Option<usize>;

    /// Vertices sharing an edge with `v`.
    fn vertex_neighbors(&self, v: VertexId<Self::Index>) -> impl Iterator<Item = VertexId<Self::Index>> + '_;

    /// Triangles sharing an edge with `f`.
    fn face_neighbors(&self, f: FaceId<Self::Index>) -> impl Iterator<Item = FaceId<Self::Index>> + '_;

    /// Reverse every face and negate every normal.
    fn flip_normals(&mut self);

    /// All vertex ids in order.
    fn vertex_ids(&self) -> impl Iterator<Item = VertexId<Self::Index>> {
        (0..self.num_vertices()).map(VertexId::new)
    }

    /// All face ids in order.
    fn face_ids(&self) -> impl Iterator<Item = FaceId<Self::Index>> {
        (0..self.num_faces()).map(FaceId::new)
    }

    /// Corner positions of a triangle.
    fn face_positions(&self, f: FaceId<Self::Index>) -> [Point3<f64>; 3] {
        self.face_triangle(f).map(|v| self.position(v))
    }

    /// Corner normals of a triangle.
    fn face_normals(&self, f: FaceId<Self::Index>) -> [Vector3<f64>; 3] {
        self.face_triangle(f).map(|v| self.normal(v))
    }

    /// Whether an active UV layer is present.
    fn has_uvs(&self) -> bool {
        self.uv_face_count().is_some()
    }

    /// Reset every vertex normal to the area-weighted average of its faces.
    fn recompute_normals(&mut self) {
        let mut sums = vec![Vector3::zeros(); self.num_vertices()];
        for f in self.face_ids() {
            let [p0, p1, p2] = self.face_positions(f);
            let weighted = (p1 - p0).cross(&(p2 - p0));
            for v in self.face_triangle(f) {
                sums[v.index()] += weighted;
            }
        }
        for (i, sum) in sums.into_iter().enumerate() {
            let normal = sum.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros);
            self.set_normal(VertexId::new(i), normal);
        }
    }
}

impl<I: MeshIndex> MeshProvider for HalfEdgeMesh<I> {
    type Index = I;

    fn num_vertices(&self) -> usize {
        HalfEdgeMesh::num_vertices(self)
    }

    fn num_faces(&self) -> usize {
        HalfEdgeMesh::num_faces(self)
    }

    fn position(&self, v: VertexId<I>) -> Point3<f64> {
        *HalfEdgeMesh::position(self, v)
    }

    fn set_position(&mut self, v: VertexId<I>, position: Point3<f64>) {
        HalfEdgeMesh::set_position(self, v, position);
    }

    fn normal(&self, v: VertexId<I>) -> Vector3<f64> {
        *HalfEdgeMesh::normal(self, v)
    }

    fn set_normal(&mut self, v: VertexId<I>, normal: Vector3<f64>) {
        HalfEdgeMesh::set_normal(self, v, normal);
    }

    fn face_triangle(&self, f: FaceId<I>) -> [VertexId<I>; 3] {
        HalfEdgeMesh::face_triangle(self, f)
    }

    fn face_normal(&self, f: FaceId<I>) -> Vector3<f64> {
        HalfEdgeMesh::face_normal(self, f)
    }

    fn face_uvs(&self, f: FaceId<I>) -> Option<[Point2<f64>; 3]> {
        self.uv_layer().map(|layer| layer.face(f))
    }

    fn uv_face_count(&self) -> Option<usize> {
        self.uv_layer().map(|layer| layer.len())
    }

    fn vertex_neighbors(&self, v: VertexId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        HalfEdgeMesh::vertex_neighbors(self, v)
    }

    fn face_neighbors(&self, f: FaceId<I>) -> impl Iterator<Item = FaceId<I>> + '_ {
        HalfEdgeMesh::face_neighbors(self, f)
    }

    fn flip_normals(&mut self) {
        self.flip_orientation();
    }

    fn recompute_normals(&mut self) {
        HalfEdgeMesh::recompute_normals(self);
    }
}
