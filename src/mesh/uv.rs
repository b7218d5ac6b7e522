//! Per-corner UV storage.
//!
//! A [`UvLayer`] holds one UV coordinate for every corner of every face, so
//! seams (a vertex with different UVs in different faces) are representable.
//! Coordinates are nominally in `[0, 1]²` but may lie outside.

use std::marker::PhantomData;

use nalgebra::Point2;

use crate::mesh::{FaceId, MeshIndex};

/// UV coordinates stored per face corner.
///
/// Corner order follows [`HalfEdgeMesh::face_triangle`](crate::mesh::HalfEdgeMesh::face_triangle).
#[derive(Debug, Clone)]
pub struct UvLayer<I: MeshIndex = u32> {
    corners: Vec<[Point2<f64>; 3]>,
    _marker: PhantomData<I>,
}

impl<I: MeshIndex> UvLayer<I> {
    /// Create a layer from per-face corner coordinates.
    pub fn new(corners: Vec<[Point2<f64>; 3]>) -> Self {
        Self {
            corners,
            _marker: PhantomData,
        }
    }

    /// Build a layer from per-vertex coordinates and the face list.
    ///
    /// Convenient for seamless maps where every vertex has a single UV.
    pub fn from_vertex_uvs(uvs: &[Point2<f64>], faces: &[[usize; 3]]) -> Self {
        let corners = faces
            .iter()
            .map(|f| [uvs[f[0]], uvs[f[1]], uvs[f[2]]])
            .collect();
        Self::new(corners)
    }

    /// UVs of the three corners of a face.
    #[inline]
    pub fn face(&self, f: FaceId<I>) -> [Point2<f64>; 3] {
        self.corners[f.index()]
    }

    /// Mutable UVs of the three corners of a face.
    #[inline]
    pub fn face_mut(&mut self, f: FaceId<I>) -> &mut [Point2<f64>; 3] {
        &mut self.corners[f.index()]
    }

    /// Number of faces covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.corners.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.corners.is_empty()
    }

    /// Iterate over faces with their corner UVs.
    pub fn iter(&self) -> impl Iterator<Item = (FaceId<I>, [Point2<f64>; 3])> + '_ {
        self.corners
            .iter()
            .enumerate()
            .map(|(i, &c)| (FaceId::new(i), c))
    }

    /// Unsigned area of a face in UV space.
    pub fn face_area(&self, f: FaceId<I>) -> f64 {
        let [a, b, c] = self.face(f);
        uv_triangle_area(&a, &b, &c)
    }

    /// Total unsigned area of all faces in UV space.
    pub fn total_area(&self) -> f64 {
        self.corners
            .iter()
            .map(|[a, b, c]| uv_triangle_area(a, b, c))
            .sum()
    }

    /// Swap the UVs of corners 0 and 1 on every face.
    ///
    /// Keeps the layer consistent with a mesh whose faces were flipped.
    pub(crate) fn swap_first_corners(&mut self) {
        for c in &mut self.corners {
            c.swap(0, 1);
        }
    }
}

/// Unsigned area of a UV triangle.
#[inline]
pub fn uv_triangle_area(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    0.5 * ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)).abs()
}
