//! Half-edge triangle mesh.
//!
//! Each undirected edge is stored as two opposite half-edges. A half-edge
//! knows its origin vertex, its twin, the next and previous half-edges around
//! its face, and the face itself. Boundary half-edges carry an invalid face
//! and are linked into boundary loops, so walking `next(twin(he))` around a
//! vertex always closes.
//!
//! On top of connectivity the mesh stores per-vertex normals and an optional
//! active [`UvLayer`], which is what the projection and mirror engines read.

use nalgebra::{Point3, Vector3};

use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
use super::uv::UvLayer;

/// A vertex: position, shading normal and one outgoing half-edge.
#[derive(Debug, Clone)]
pub struct Vertex<I: MeshIndex = u32> {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// Unit shading normal. Zero for isolated vertices.
    pub normal: Vector3<f64>,

    /// One outgoing half-edge. For boundary vertices this is a boundary
    /// half-edge.
    pub halfedge: HalfEdgeId<I>,
}

impl<I: MeshIndex> Vertex<I> {
    /// Create a new, unconnected vertex.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            normal: Vector3::zeros(),
            halfedge: HalfEdgeId::invalid(),
        }
    }
}

/// A half-edge in the mesh.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge<I: MeshIndex = u32> {
    /// The vertex this half-edge originates from.
    pub origin: VertexId<I>,

    /// The opposite half-edge.
    pub twin: HalfEdgeId<I>,

    /// The next half-edge around the face (counter-clockwise).
    pub next: HalfEdgeId<I>,

    /// The previous half-edge around the face.
    pub prev: HalfEdgeId<I>,

    /// The face this half-edge belongs to; invalid on the boundary.
    pub face: FaceId<I>,
}

impl<I: MeshIndex> HalfEdge<I> {
    /// Create a new unlinked half-edge.
    pub fn new() -> Self {
        Self {
            origin: VertexId::invalid(),
            twin: HalfEdgeId::invalid(),
            next: HalfEdgeId::invalid(),
            prev: HalfEdgeId::invalid(),
            face: FaceId::invalid(),
        }
    }

    /// Check if this half-edge is on the boundary.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.face.is_valid()
    }
}

impl<I: MeshIndex> Default for HalfEdge<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// A triangular face, identified by one of its half-edges.
#[derive(Debug, Clone, Copy)]
pub struct Face<I: MeshIndex = u32> {
    /// First half-edge of the face; its origin is corner 0.
    pub halfedge: HalfEdgeId<I>,
}

impl<I: MeshIndex> Face<I> {
    /// Create a new face with the given half-edge.
    pub fn new(halfedge: HalfEdgeId<I>) -> Self {
        Self { halfedge }
    }
}

/// A triangle mesh with half-edge connectivity, vertex normals and an
/// optional UV layer.
#[derive(Debug, Clone)]
pub struct HalfEdgeMesh<I: MeshIndex = u32> {
    pub(crate) vertices: Vec<Vertex<I>>,
    pub(crate) halfedges: Vec<HalfEdge<I>>,
    pub(crate) faces: Vec<Face<I>>,
    pub(crate) uv_layer: Option<UvLayer<I>>,
}

impl<I: MeshIndex> Default for HalfEdgeMesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            halfedges: Vec::new(),
            faces: Vec::new(),
            uv_layer: None,
        }
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_faces: usize) -> Self {
        // Closed meshes need 3F half-edges; leave headroom for boundary ones.
        let num_halfedges = num_faces * 3 + num_faces / 2;

        Self {
            vertices: Vec::with_capacity(num_vertices),
            halfedges: Vec::with_capacity(num_halfedges),
            faces: Vec::with_capacity(num_faces),
            uv_layer: None,
        }
    }

    // ==================== Accessors ====================

    /// Number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of half-edges, boundary ones included.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId<I>) -> &Vertex<I> {
        &self.vertices[id.index()]
    }

    /// Get a mutable vertex by ID.
    #[inline]
    pub fn vertex_mut(&mut self, id: VertexId<I>) -> &mut Vertex<I> {
        &mut self.vertices[id.index()]
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId<I>) -> &HalfEdge<I> {
        &self.halfedges[id.index()]
    }

    /// Get a mutable half-edge by ID.
    #[inline]
    pub fn halfedge_mut(&mut self, id: HalfEdgeId<I>) -> &mut HalfEdge<I> {
        &mut self.halfedges[id.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId<I>) -> &Face<I> {
        &self.faces[id.index()]
    }

    /// Position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.vertex(v).position
    }

    /// Move a vertex.
    #[inline]
    pub fn set_position(&mut self, v: VertexId<I>, pos: Point3<f64>) {
        self.vertex_mut(v).position = pos;
    }

    /// Shading normal of a vertex.
    #[inline]
    pub fn normal(&self, v: VertexId<I>) -> &Vector3<f64> {
        &self.vertex(v).normal
    }

    /// Overwrite the shading normal of a vertex.
    #[inline]
    pub fn set_normal(&mut self, v: VertexId<I>, normal: Vector3<f64>) {
        self.vertex_mut(v).normal = normal;
    }

    /// The active UV layer, if any.
    #[inline]
    pub fn uv_layer(&self) -> Option<&UvLayer<I>> {
        self.uv_layer.as_ref()
    }

    /// Attach (or replace) the active UV layer.
    ///
    /// The layer must hold one entry per face; this is checked by consumers
    /// that need UVs, see [`MeshError::UvLayerMismatch`](crate::error::MeshError::UvLayerMismatch).
    pub fn set_uv_layer(&mut self, layer: UvLayer<I>) {
        self.uv_layer = Some(layer);
    }

    /// Builder-style variant of [`set_uv_layer`](Self::set_uv_layer).
    pub fn with_uv_layer(mut self, layer: UvLayer<I>) -> Self {
        self.set_uv_layer(layer);
        self
    }

    // ==================== Topology Queries ====================

    /// Get the twin (opposite) half-edge.
    #[inline]
    pub fn twin(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).twin
    }

    /// Get the next half-edge around the face.
    #[inline]
    pub fn next(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).next
    }

    /// Get the origin vertex of a half-edge.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.halfedge(he).origin
    }

    /// Get the destination vertex of a half-edge.
    #[inline]
    pub fn dest(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.origin(self.twin(he))
    }

    /// Get the face of a half-edge.
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId<I>) -> FaceId<I> {
        self.halfedge(he).face
    }

    /// Check if a half-edge is on the boundary.
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeId<I>) -> bool {
        self.halfedge(he).is_boundary()
    }

    /// Check if a vertex is on the boundary (isolated vertices count).
    pub fn is_boundary_vertex(&self, v: VertexId<I>) -> bool {
        if !self.vertex(v).halfedge.is_valid() {
            return true;
        }
        self.vertex_halfedges(v)
            .any(|he| self.is_boundary_halfedge(he))
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterate over all half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        (0..self.halfedges.len()).map(HalfEdgeId::new)
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// Iterate over outgoing half-edges of a vertex.
    pub fn vertex_halfedges(&self, v: VertexId<I>) -> VertexHalfEdgeIter<'_, I> {
        VertexHalfEdgeIter::new(self, v)
    }

    /// Iterate over vertices sharing an edge with `v`.
    pub fn vertex_neighbors(&self, v: VertexId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.vertex_halfedges(v).map(|he| self.dest(he))
    }

    /// Iterate over the three half-edges of a face, starting at corner 0.
    pub fn face_halfedges(&self, f: FaceId<I>) -> [HalfEdgeId<I>; 3] {
        let he0 = self.face(f).halfedge;
        let he1 = self.next(he0);
        let he2 = self.next(he1);
        [he0, he1, he2]
    }

    /// Iterate over faces sharing an edge with `f`, in edge order.
    pub fn face_neighbors(&self, f: FaceId<I>) -> impl Iterator<Item = FaceId<I>> + '_ {
        self.face_halfedges(f)
            .into_iter()
            .map(|he| self.face_of(self.twin(he)))
            .filter(|g| g.is_valid())
    }

    /// The three corner vertices of a face.
    pub fn face_triangle(&self, f: FaceId<I>) -> [VertexId<I>; 3] {
        self.face_halfedges(f).map(|he| self.origin(he))
    }

    /// The three corner positions of a face.
    pub fn face_positions(&self, f: FaceId<I>) -> [Point3<f64>; 3] {
        self.face_triangle(f).map(|v| *self.position(v))
    }

    // ==================== Geometry ====================

    /// Unit normal of a face from its winding. Zero for degenerate faces.
    pub fn face_normal(&self, f: FaceId<I>) -> Vector3<f64> {
        let [p0, p1, p2] = self.face_positions(f);
        (p1 - p0)
            .cross(&(p2 - p0))
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Axis-aligned bounding box of all vertex positions.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        crate::geometry::bounding_box(self.vertices.iter().map(|v| &v.position))
    }

    /// Recompute every vertex normal as the area-weighted average of the
    /// incident face normals.
    pub fn recompute_normals(&mut self) {
        let mut sums = vec![Vector3::zeros(); self.vertices.len()];
        for f in self.face_ids() {
            let [p0, p1, p2] = self.face_positions(f);
            let weighted = (p1 - p0).cross(&(p2 - p0));
            for v in self.face_triangle(f) {
                sums[v.index()] += weighted;
            }
        }
        for (vertex, sum) in self.vertices.iter_mut().zip(sums) {
            vertex.normal = sum.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros);
        }
    }

    // ==================== Editing ====================

    /// Add a new unconnected vertex and return its ID.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> VertexId<I> {
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(Vertex::new(position));
        id
    }

    /// Reverse the winding of every face and negate every vertex normal.
    ///
    /// Each half-edge takes the origin of its twin and swaps `next`/`prev`,
    /// which reverses face and boundary loops at once while keeping twin
    /// pairs intact. UV corners are permuted to follow the new corner order.
    pub fn flip_orientation(&mut self) {
        let new_origins: Vec<VertexId<I>> = self
            .halfedges
            .iter()
            .map(|he| self.halfedges[he.twin.index()].origin)
            .collect();

        for (he, origin) in self.halfedges.iter_mut().zip(new_origins) {
            he.origin = origin;
            std::mem::swap(&mut he.next, &mut he.prev);
        }

        for i in 0..self.vertices.len() {
            let he = self.vertices[i].halfedge;
            if he.is_valid() {
                self.vertices[i].halfedge = self.halfedges[he.index()].twin;
            }
            self.vertices[i].normal = -self.vertices[i].normal;
        }
        super::builder::fix_boundary_vertex_halfedges(self);

        if let Some(layer) = self.uv_layer.as_mut() {
            layer.swap_first_corners();
        }
    }

    // ==================== Validation ====================

    /// Check that all connectivity is consistent.
    pub fn is_valid(&self) -> bool {
        let vertices_ok = self.vertices.iter().enumerate().all(|(i, v)| {
            !v.halfedge.is_valid() || self.halfedge(v.halfedge).origin.index() == i
        });

        let halfedges_ok = self.halfedge_ids().all(|id| {
            let he = self.halfedge(id);
            he.twin.is_valid()
                && self.halfedge(he.twin).twin == id
                && (!he.next.is_valid() || self.halfedge(he.next).prev == id)
                && (!he.next.is_valid() || self.origin(he.next) == self.origin(he.twin))
        });

        let faces_ok = self.faces.iter().all(|f| f.halfedge.is_valid());

        vertices_ok && halfedges_ok && faces_ok
    }
}

/// Iterator over outgoing half-edges of a vertex.
pub struct VertexHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> VertexHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, v: VertexId<I>) -> Self {
        let start = mesh.vertex(v).halfedge;
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for VertexHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;

        // twin(he) points back at v; the half-edge after it leaves v again.
        self.current = self.mesh.next(self.mesh.twin(self.current));

        if self.current == self.start || !self.current.is_valid() {
            self.done = true;
        }

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_triangles;

    fn quad() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        build_from_triangles(&vertices, &[[0, 1, 2], [0, 2, 3]]).unwrap()
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = HalfEdgeMesh::<u32>::new();
        assert_eq!(mesh.num_vertices(), 0);
        assert_eq!(mesh.num_faces(), 0);
        assert!(mesh.is_valid());
        assert!(mesh.bounding_box().is_none());
    }

    #[test]
    fn test_normals_point_up() {
        let mesh = quad();
        for v in mesh.vertex_ids() {
            assert!((mesh.normal(v) - Vector3::z()).norm() < 1e-12);
        }
        assert!((mesh.face_normal(FaceId::new(1)) - Vector3::z()).norm() < 1e-12);
    }

    #[test]
    fn test_face_neighbors() {
        let mesh = quad();
        let n0: Vec<_> = mesh.face_neighbors(FaceId::new(0)).collect();
        let n1: Vec<_> = mesh.face_neighbors(FaceId::new(1)).collect();
        assert_eq!(n0, vec![FaceId::new(1)]);
        assert_eq!(n1, vec![FaceId::new(0)]);
    }

    #[test]
    fn test_vertex_neighbors() {
        let mesh = quad();
        let mut n: Vec<usize> = mesh
            .vertex_neighbors(VertexId::new(0))
            .map(|v| v.index())
            .collect();
        n.sort_unstable();
        assert_eq!(n, vec![1, 2, 3]);
    }

    #[test]
    fn test_flip_orientation() {
        let mut mesh = quad();
        mesh.flip_orientation();

        assert!(mesh.is_valid());
        for f in mesh.face_ids() {
            assert!((mesh.face_normal(f) + Vector3::z()).norm() < 1e-12);
        }
        for v in mesh.vertex_ids() {
            assert!((mesh.normal(v) + Vector3::z()).norm() < 1e-12);
            assert!(mesh.is_boundary_vertex(v));
        }
        let mut n: Vec<usize> = mesh
            .vertex_neighbors(VertexId::new(0))
            .map(|v| v.index())
            .collect();
        n.sort_unstable();
        assert_eq!(n, vec![1, 2, 3]);

        // Flipping twice restores the original winding.
        mesh.flip_orientation();
        assert!((mesh.face_normal(FaceId::new(0)) - Vector3::z()).norm() < 1e-12);
    }
}
